//! Common error infrastructure for game-core.
//!
//! Domain errors (`Rejection`, `InitializationError`, `MapError`) live next to
//! the code that produces them and share the classification defined here.

/// Severity level of an error, used to pick how loudly a failure is reported.
///
/// - **Recoverable**: the same request may succeed once the board changes
/// - **Validation**: the request is malformed for the current rules
/// - **Internal**: the pipeline itself is misconfigured or inconsistent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: destination occupied, target out of range, not your turn.
    Recoverable,

    /// Examples: unknown entity, friendly target, spawn requested by a player.
    Validation,

    /// Examples: intent kind with no registered handler, missing unit type.
    /// These indicate bugs and should be investigated.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all game-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, for log fields and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
