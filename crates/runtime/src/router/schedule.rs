use std::collections::BTreeMap;

use game_content::{ScheduleEntry, ScheduleTrigger};
use game_core::{ActionIntent, EventId};

/// System intents injected when a round begins or a world event fires.
///
/// Each entry is consumed the first time its trigger occurs.
#[derive(Clone, Debug, Default)]
pub struct EventSchedule {
    rounds: BTreeMap<u32, Vec<ActionIntent>>,
    events: BTreeMap<EventId, Vec<ActionIntent>>,
}

impl EventSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ScheduleEntry>) -> Self {
        let mut schedule = Self::new();
        for entry in entries {
            let intent = entry.action.to_intent();
            match entry.trigger {
                ScheduleTrigger::Round(round) => schedule.at_round(round, intent),
                ScheduleTrigger::Event(event) => schedule.on_event(event, intent),
            }
        }
        schedule
    }

    pub fn at_round(&mut self, round: u32, intent: ActionIntent) {
        self.rounds.entry(round).or_default().push(intent);
    }

    pub fn on_event(&mut self, event: EventId, intent: ActionIntent) {
        self.events.entry(event).or_default().push(intent);
    }

    pub fn round_started(&mut self, round: u32) -> Vec<ActionIntent> {
        self.rounds.remove(&round).unwrap_or_default()
    }

    pub fn event_fired(&mut self, event: EventId) -> Vec<ActionIntent> {
        self.events.remove(&event).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty() && self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use game_content::ScheduledAction;
    use game_core::{ActorId, Position, UnitTypeId};

    use super::*;

    #[test]
    fn entries_fire_once() {
        let entries = [
            ScheduleEntry {
                trigger: ScheduleTrigger::Round(2),
                action: ScheduledAction::Spawn {
                    owner: ActorId(1),
                    unit_type: UnitTypeId(1),
                    position: Position::new(0, 0),
                },
            },
            ScheduleEntry {
                trigger: ScheduleTrigger::Event(EventId(9)),
                action: ScheduledAction::Surrender { actor: ActorId(2) },
            },
        ];
        let mut schedule = EventSchedule::from_entries(&entries);

        assert!(schedule.round_started(1).is_empty());
        assert_eq!(schedule.round_started(2).len(), 1);
        assert!(schedule.round_started(2).is_empty());

        assert_eq!(schedule.event_fired(EventId(9)).len(), 1);
        assert!(schedule.event_fired(EventId(9)).is_empty());
        assert!(schedule.is_empty());
    }
}
