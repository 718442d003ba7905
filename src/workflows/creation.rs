use serde::Serialize;
use statig::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn, Instrument};

use super::state_machine::{AttemptEvent, CreationAttempt};
use crate::config::{IleConfig, StaleResponsePolicy};
use crate::elements::{
    CatalogDefaults, CatalogValidator, DefaultDataProvider, Element, ElementData, ElementType,
    ElementValidator, ValidationResult,
};
use crate::error::{CreationError, ServiceError, UnknownElementTypeError};
use crate::http::HttpCreationService;
use crate::observability::{CreationMetrics, OperationTimer};
use crate::service::CreationService;
use crate::telemetry::{create_creation_span, generate_correlation_id};

/// Observable outcome of the most recent creation attempt.
///
/// At most one of `last_created_element` and `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationState {
    pub is_creating: bool,
    pub last_created_element: Option<Element>,
    pub error: Option<String>,
}

impl CreationState {
    fn begin(&mut self) {
        self.is_creating = true;
        self.error = None;
    }

    fn succeed(&mut self, element: Element) {
        self.is_creating = false;
        self.last_created_element = Some(element);
        self.error = None;
    }

    fn fail(&mut self, message: String) {
        self.is_creating = false;
        self.last_created_element = None;
        self.error = Some(message);
    }
}

/// Validate-then-create entry point for one version.
///
/// Progress and outcome are published on a watch channel; subscribers see
/// every change without polling. Concurrent `create` calls are not
/// serialized: with [`StaleResponsePolicy::LastWriteWins`] whichever call
/// completes last determines the state, even after a `reset`.
pub struct ElementCreationWorkflow {
    version: String,
    validator: Arc<dyn ElementValidator>,
    defaults: Arc<dyn DefaultDataProvider>,
    service: Arc<dyn CreationService>,
    policy: StaleResponsePolicy,
    state: watch::Sender<CreationState>,
    // last token handed to a create call
    issued: AtomicU64,
    // token allowed to write under LatestRequestOnly
    current: AtomicU64,
    metrics: CreationMetrics,
}

impl ElementCreationWorkflow {
    /// Workflow backed by the standard catalog's validator and defaults
    pub fn new(version: impl Into<String>, service: Arc<dyn CreationService>) -> Self {
        Self {
            version: version.into(),
            validator: Arc::new(CatalogValidator::default()),
            defaults: Arc::new(CatalogDefaults::default()),
            service,
            policy: StaleResponsePolicy::default(),
            state: watch::Sender::new(CreationState::default()),
            issued: AtomicU64::new(0),
            current: AtomicU64::new(0),
            metrics: CreationMetrics::new(),
        }
    }

    /// Workflow talking to the configured backend over HTTP
    pub fn from_config(version: impl Into<String>, config: &IleConfig) -> Result<Self, ServiceError> {
        let service = HttpCreationService::from_config(&config.api)?;
        Ok(Self::new(version, Arc::new(service)).with_policy(config.workflow.stale_responses))
    }

    pub fn with_validator(mut self, validator: Arc<dyn ElementValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_defaults(mut self, defaults: Arc<dyn DefaultDataProvider>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_policy(mut self, policy: StaleResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn policy(&self) -> StaleResponsePolicy {
        self.policy
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CreationState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<CreationState> {
        self.state.subscribe()
    }

    pub fn metrics(&self) -> &CreationMetrics {
        &self.metrics
    }

    /// Check `data` without touching creation state.
    pub fn validate(&self, element_type: &ElementType, data: &ElementData) -> ValidationResult {
        self.validator.validate(element_type, data)
    }

    /// Blank payload for `element_type`. Failures are returned, never recorded.
    pub fn default_data(&self, element_type: &ElementType) -> Result<ElementData, UnknownElementTypeError> {
        self.defaults.defaults_for(element_type)
    }

    /// Restore the initial state. Any call still in flight under
    /// `LatestRequestOnly` loses the right to write its outcome.
    pub fn reset(&self) {
        self.claim_token();
        self.state.send_replace(CreationState::default());
        debug!(version = %self.version, "Creation state reset");
    }

    /// Validate `data`, then create it in this workflow's version.
    ///
    /// Invalid data never reaches the service. Every failure is recorded in
    /// the state's `error` before being returned.
    pub async fn create(
        &self,
        element_type: &ElementType,
        data: &ElementData,
    ) -> Result<Element, CreationError> {
        let correlation_id = generate_correlation_id();
        let span = create_creation_span("create", element_type.as_str(), &self.version, &correlation_id);

        self.run_attempt(element_type, data, correlation_id)
            .instrument(span)
            .await
    }

    async fn run_attempt(
        &self,
        element_type: &ElementType,
        data: &ElementData,
        correlation_id: String,
    ) -> Result<Element, CreationError> {
        let token = self.claim_token();
        self.metrics.record_attempt();

        let mut attempt = CreationAttempt::new(correlation_id).state_machine();
        let in_flight = InFlight::begin(self, token);

        attempt.handle(&AttemptEvent::Validate);
        if let Err(err) = self.validate(element_type, data).into_result() {
            let message = err.to_string();
            debug!(error = %message, "Element data rejected by validator");
            attempt.handle(&AttemptEvent::ValidationRejected {
                message: message.clone(),
            });
            self.metrics.record_rejection();
            in_flight.settle(|state| state.fail(message));
            attempt.handle(&AttemptEvent::Settle);
            return Err(CreationError::Validation(err));
        }
        attempt.handle(&AttemptEvent::ValidationPassed);

        let timer = OperationTimer::new("create_element");
        let outcome = self.service.create(element_type, &self.version, data).await;
        timer.finish();

        match outcome {
            Ok(element) => {
                attempt.handle(&AttemptEvent::Resolved);
                self.metrics.record_success();
                let stored = element.clone();
                in_flight.settle(|state| state.succeed(stored));
                attempt.handle(&AttemptEvent::Settle);
                Ok(element)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "Element creation failed");
                attempt.handle(&AttemptEvent::ServiceFailed {
                    message: message.clone(),
                });
                self.metrics.record_failure();
                in_flight.settle(|state| state.fail(message));
                attempt.handle(&AttemptEvent::Settle);
                Err(CreationError::Service(err))
            }
        }
    }

    /// Issue the next token and make it current. Publishing with `fetch_max`
    /// keeps `current` monotonic when callers race between the two steps.
    fn claim_token(&self) -> u64 {
        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.fetch_max(token, Ordering::SeqCst);
        token
    }

    fn may_write(&self, token: u64) -> bool {
        match self.policy {
            StaleResponsePolicy::LastWriteWins => true,
            StaleResponsePolicy::LatestRequestOnly => self.current.load(Ordering::SeqCst) == token,
        }
    }
}

/// Marks one call as in flight. Clears `is_creating` when dropped without
/// settling, so an abandoned future cannot leave the flag stuck.
struct InFlight<'a> {
    workflow: &'a ElementCreationWorkflow,
    token: u64,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn begin(workflow: &'a ElementCreationWorkflow, token: u64) -> Self {
        workflow.state.send_modify(CreationState::begin);
        Self {
            workflow,
            token,
            settled: false,
        }
    }

    fn settle(mut self, apply: impl FnOnce(&mut CreationState)) {
        self.settled = true;
        if self.workflow.may_write(self.token) {
            self.workflow.state.send_modify(apply);
        } else {
            self.workflow.metrics.record_stale_discard();
            debug!(token = self.token, "Discarding outcome of superseded creation call");
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled && self.workflow.may_write(self.token) {
            self.workflow.state.send_modify(|state| state.is_creating = false);
        }
    }
}
