use crate::state::Phase;

/// Why the controller refused an input. The state is returned untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("No active session; log in first")]
    NoSession,
    #[error("A session is already active; start a new session first")]
    AlreadyLoggedIn,
    #[error("Invalid login: {0}")]
    InvalidLogin(String),
    #[error("'{input}' is not available in phase '{phase}'")]
    NotAvailable { input: &'static str, phase: Phase },
    #[error("Input must not be empty")]
    EmptyInput,
    #[error("Scenario generation failed {attempts} times; start a new simulation to try again")]
    RetryLimitReached { attempts: u32 },
}
