//! Serial plan execution.
//!
//! At most one plan is active at a time; that rule is the only mutual
//! exclusion over world state. Chained intents are validated lazily, after
//! the plan that scheduled them has committed.
use std::collections::VecDeque;

use tracing::{debug, error, trace};

use crate::error::GameError;

use super::{
    ActionContext, ActionIntent, ActionRegistry, Cue, ExecutionPlan, PlanRecord, Rejection,
    RuleContext, RunState,
};

pub struct ActionQueue {
    registry: ActionRegistry,
    run_list: VecDeque<ExecutionPlan>,
    active: Option<ExecutionPlan>,
}

impl ActionQueue {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            run_list: VecDeque::new(),
            active: None,
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    /// Resolves `intent` through its handler. Rejections are logged and
    /// swallowed; see [`Self::try_create_execution_plan`] to observe them.
    pub fn create_execution_plan(
        &self,
        rules: &RuleContext<'_>,
        intent: &ActionIntent,
    ) -> Option<ExecutionPlan> {
        self.try_create_execution_plan(rules, intent).ok()
    }

    pub fn try_create_execution_plan(
        &self,
        rules: &RuleContext<'_>,
        intent: &ActionIntent,
    ) -> Result<ExecutionPlan, Rejection> {
        let kind = intent.kind();
        let result = match self.registry.get(kind) {
            Some(handler) => {
                let mut plan = ExecutionPlan::new(kind);
                handler
                    .fill_execution_plan(rules, &mut plan, intent)
                    .and_then(|()| {
                        if plan.is_resolved() {
                            Ok(plan)
                        } else {
                            Err(Rejection::Unresolved(kind))
                        }
                    })
            }
            None => Err(Rejection::Unregistered(kind)),
        };

        if let Err(rejection) = &result {
            if rejection.severity().is_internal() {
                error!(
                    target: "action::queue",
                    %kind,
                    code = rejection.error_code(),
                    "intent dropped: {rejection}"
                );
            } else {
                debug!(
                    target: "action::queue",
                    %kind,
                    origin = ?intent.origin,
                    code = rejection.error_code(),
                    "intent rejected: {rejection}"
                );
            }
        }
        result
    }

    /// Appends a resolved plan. Unresolved plans are dropped.
    pub fn enqueue(&mut self, plan: ExecutionPlan) -> bool {
        if !plan.is_resolved() {
            debug!(target: "action::queue", kind = %plan.kind(), "unresolved plan dropped");
            return false;
        }
        self.run_list.push_back(plan);
        true
    }

    /// Resolves `intent` and places it ahead of every pending plan.
    ///
    /// Bypasses turn gating; intended for reactive effects.
    pub fn add_immediate_request(
        &mut self,
        rules: &RuleContext<'_>,
        intent: &ActionIntent,
    ) -> bool {
        match self.create_execution_plan(rules, intent) {
            Some(plan) => {
                self.run_list.push_front(plan);
                true
            }
            None => false,
        }
    }

    /// True while a plan is active or pending.
    pub fn is_running(&self) -> bool {
        self.active.is_some() || !self.run_list.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.run_list.len()
    }

    pub fn active(&self) -> Option<&ExecutionPlan> {
        self.active.as_ref()
    }

    /// Advances the queue by one step.
    ///
    /// Activates the front plan when nothing is active; otherwise updates the
    /// active plan and commits it once its handler reports completion.
    /// Returns the record of a plan committed during this step.
    pub fn tick(&mut self, ctx: &mut ActionContext<'_>, dt_ms: u32) -> Option<PlanRecord> {
        let Some(plan) = self.active.as_ref() else {
            self.activate_next(ctx);
            return None;
        };

        let kind = plan.kind();
        let (Some(handler), Some(data)) = (self.registry.get_mut(kind), plan.data()) else {
            error!(target: "action::queue", %kind, "active plan lost its handler; dropped");
            self.active = None;
            return None;
        };

        let mut view = ctx.view();
        handler.on_update(&mut view, data, dt_ms);
        if !handler.is_finished(&view, data) {
            return None;
        }

        let plan = self.active.take()?;
        self.finish(ctx, plan)
    }

    /// Runs one plan to completion without waiting for its animation.
    ///
    /// If a plan is mid-animation it is committed; otherwise the front plan is
    /// started and committed in the same call.
    pub fn flush_plan(&mut self, ctx: &mut ActionContext<'_>) -> Option<PlanRecord> {
        if self.active.is_none() {
            self.activate_next(ctx);
        }
        let plan = self.active.take()?;
        self.finish(ctx, plan)
    }

    /// Calls [`Self::flush_plan`] until the queue is idle or `max` plans ran.
    pub fn flush(&mut self, ctx: &mut ActionContext<'_>, max: u32) -> Vec<PlanRecord> {
        let mut records = Vec::new();
        for _ in 0..max {
            if !self.is_running() {
                break;
            }
            if let Some(record) = self.flush_plan(ctx) {
                records.push(record);
            }
        }
        records
    }

    /// Drops every pending and active plan without committing them.
    pub fn clear(&mut self) {
        self.run_list.clear();
        self.active = None;
    }

    fn activate_next(&mut self, ctx: &mut ActionContext<'_>) {
        while let Some(mut plan) = self.run_list.pop_front() {
            let kind = plan.kind();
            let (Some(handler), Some(data)) = (self.registry.get_mut(kind), plan.data()) else {
                error!(target: "action::queue", %kind, "pending plan has no handler; dropped");
                continue;
            };

            ctx.cue(Cue::PlanStarted { kind });
            handler.on_start(&mut ctx.view(), data);
            trace!(target: "action::queue", %kind, "plan started");

            plan.set_run_state(RunState::Active);
            self.active = Some(plan);
            return;
        }
    }

    fn finish(
        &mut self,
        ctx: &mut ActionContext<'_>,
        mut plan: ExecutionPlan,
    ) -> Option<PlanRecord> {
        let kind = plan.kind();
        let record = plan.to_record()?;
        let handler = self.registry.get_mut(kind)?;

        handler.on_end(ctx, record.data());
        ctx.cue(Cue::PlanEnded { kind });
        plan.set_run_state(RunState::Done);
        ctx.state.turn.nonce += 1;
        trace!(target: "action::queue", %kind, nonce = ctx.state.turn.nonce, "plan committed");

        let mut immediate = Vec::new();
        for intent in plan.take_chain() {
            let rules = ctx.rules();
            match self.try_create_execution_plan(&rules, &intent) {
                Ok(next) if intent.is_immediate() => immediate.push(next),
                Ok(next) => self.run_list.push_back(next),
                Err(_) => {
                    debug!(
                        target: "action::queue",
                        parent = %kind,
                        chained = %intent.kind(),
                        "stale chained intent dropped"
                    );
                }
            }
        }
        for next in immediate.into_iter().rev() {
            self.run_list.push_front(next);
        }

        Some(record)
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new(ActionRegistry::standard())
    }
}

impl core::fmt::Debug for ActionQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActionQueue")
            .field("registry", &self.registry)
            .field("pending", &self.run_list.len())
            .field("active", &self.active.as_ref().map(|plan| plan.kind()))
            .finish()
    }
}
