//! Property tests for creation state invariants

use async_trait::async_trait;
use ile_elements::{
    CreationService, CreationState, Element, ElementCreationWorkflow, ElementData, ElementType,
    ServiceError, ValidationResult,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Echoes the payload back, or fails when the name starts with "fail"
#[derive(Default)]
struct EchoService {
    calls: AtomicUsize,
}

#[async_trait]
impl CreationService for EchoService {
    async fn create(
        &self,
        _element_type: &ElementType,
        _version: &str,
        data: &ElementData,
    ) -> Result<Element, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = data.get("name").and_then(Value::as_str).unwrap_or("");
        if name.starts_with("fail") {
            Err(ServiceError::transport(format!("backend refused {name}")))
        } else {
            Ok(Element::new(json!({"id": "generated", "name": name})))
        }
    }
}

fn name_and_ref_required(_: &ElementType, data: &ElementData) -> ValidationResult {
    let mut result = ValidationResult::valid();
    for key in ["name", "ref"] {
        let value = data.get(key).and_then(Value::as_str).unwrap_or("");
        if value.trim().is_empty() {
            result.push(format!("{key} is required"));
        }
    }
    result
}

fn workflow() -> (Arc<EchoService>, ElementCreationWorkflow) {
    let service = Arc::new(EchoService::default());
    let workflow = ElementCreationWorkflow::new("v1", service.clone())
        .with_validator(Arc::new(name_and_ref_required));
    (service, workflow)
}

fn payload(name: &str, reference: &str) -> ElementData {
    json!({"name": name, "ref": reference}).as_object().cloned().unwrap()
}

fn field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-z]{1,8}",
        "fail[a-z]{0,4}",
    ]
}

proptest! {
    #[test]
    fn invalid_data_never_reaches_service(name in field(), reference in field()) {
        let (service, workflow) = workflow();
        let data = payload(&name, &reference);
        let validation = workflow.validate(&ElementType::from("usecase"), &data);

        let outcome = tokio_test::block_on(workflow.create(&ElementType::from("usecase"), &data));
        let state = workflow.state();

        prop_assert!(!state.is_creating);
        if validation.is_valid() {
            prop_assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        } else {
            prop_assert!(outcome.is_err());
            prop_assert_eq!(service.calls.load(Ordering::SeqCst), 0);
            let error = state.error.clone().unwrap_or_default();
            prop_assert!(error.starts_with("Validation errors: "));
            for message in validation.errors() {
                prop_assert!(error.contains(message.as_str()));
            }
        }
    }

    #[test]
    fn outcome_matches_state(name in field(), reference in "[A-Z]{1,4}-[0-9]{1,3}") {
        let (_, workflow) = workflow();
        let outcome = tokio_test::block_on(
            workflow.create(&ElementType::from("threat"), &payload(&name, &reference)),
        );
        let state = workflow.state();

        prop_assert!(!state.is_creating);
        match outcome {
            Ok(element) => {
                prop_assert_eq!(state.last_created_element, Some(element));
                prop_assert_eq!(state.error, None);
            }
            Err(err) => {
                prop_assert_eq!(state.error, Some(err.to_string()));
                prop_assert_eq!(state.last_created_element, None);
            }
        }
    }

    #[test]
    fn reset_always_restores_initial_state(names in prop::collection::vec(field(), 0..6), twice in any::<bool>()) {
        let (_, workflow) = workflow();
        for name in &names {
            let _ = tokio_test::block_on(
                workflow.create(&ElementType::from("control"), &payload(name, "C-1")),
            );
        }

        workflow.reset();
        let once = workflow.state();
        if twice {
            workflow.reset();
        }

        prop_assert_eq!(&once, &CreationState::default());
        prop_assert_eq!(workflow.state(), once);
    }
}
