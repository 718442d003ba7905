use serde::Serialize;
use statig::prelude::*;

/// Events driving one `create` call through its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Validate,
    ValidationPassed,
    ValidationRejected { message: String },
    Resolved,
    ServiceFailed { message: String },
    /// Creation state has been updated; return to idle
    Settle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Rejected,
    Succeeded,
    Failed,
}

impl CreationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CreationPhase::Rejected | CreationPhase::Succeeded | CreationPhase::Failed
        )
    }
}

/// Lifecycle of a single creation attempt:
/// `Idle -> Validating -> Rejected | Submitting -> Succeeded | Failed -> Idle`.
#[derive(Debug, Default)]
pub struct CreationAttempt {
    correlation_id: String,
    phase: CreationPhase,
    outcome: Option<CreationPhase>,
    failure: Option<String>,
}

impl CreationAttempt {
    pub fn new(correlation_id: String) -> Self {
        Self {
            correlation_id,
            ..Default::default()
        }
    }

    fn enter(&mut self, phase: CreationPhase) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            from = ?self.phase,
            to = ?phase,
            "Creation attempt transition"
        );
        if phase.is_terminal() {
            self.outcome = Some(phase);
        }
        self.phase = phase;
    }
}

#[state_machine(initial = "State::idle()")]
impl CreationAttempt {
    #[state]
    fn idle(&mut self, event: &AttemptEvent) -> Outcome<State> {
        match event {
            AttemptEvent::Validate => {
                self.outcome = None;
                self.failure = None;
                self.enter(CreationPhase::Validating);
                Transition(State::validating())
            }
            _ => Handled,
        }
    }

    #[state]
    fn validating(&mut self, event: &AttemptEvent) -> Outcome<State> {
        match event {
            AttemptEvent::ValidationPassed => {
                self.enter(CreationPhase::Submitting);
                Transition(State::submitting())
            }
            AttemptEvent::ValidationRejected { message } => {
                self.failure = Some(message.clone());
                self.enter(CreationPhase::Rejected);
                Transition(State::rejected())
            }
            _ => Handled,
        }
    }

    #[state]
    fn submitting(&mut self, event: &AttemptEvent) -> Outcome<State> {
        match event {
            AttemptEvent::Resolved => {
                self.enter(CreationPhase::Succeeded);
                Transition(State::succeeded())
            }
            AttemptEvent::ServiceFailed { message } => {
                self.failure = Some(message.clone());
                self.enter(CreationPhase::Failed);
                Transition(State::failed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn rejected(&mut self, event: &AttemptEvent) -> Outcome<State> {
        self.settle(event)
    }

    #[state]
    fn succeeded(&mut self, event: &AttemptEvent) -> Outcome<State> {
        self.settle(event)
    }

    #[state]
    fn failed(&mut self, event: &AttemptEvent) -> Outcome<State> {
        self.settle(event)
    }
}

impl CreationAttempt {
    fn settle(&mut self, event: &AttemptEvent) -> Outcome<State> {
        match event {
            AttemptEvent::Settle => {
                tracing::info!(
                    correlation_id = %self.correlation_id,
                    outcome = ?self.outcome,
                    failure = ?self.failure,
                    "Creation attempt settled"
                );
                self.enter(CreationPhase::Idle);
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn phase(&self) -> CreationPhase {
        self.phase
    }

    /// Terminal phase reached by the most recent attempt, kept after settling
    pub fn outcome(&self) -> Option<CreationPhase> {
        self.outcome
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}
