// Element creation workflow: per-attempt lifecycle and the observable state
// shared by callers of one version.

pub mod creation;
pub mod state_machine;

pub use creation::{CreationState, ElementCreationWorkflow};
pub use state_machine::{AttemptEvent, CreationAttempt, CreationPhase};
