// ILE Elements Library - element creation for threat-model library versions
// This exposes the core components for testing and integration

pub mod config;
pub mod elements;
pub mod error;
pub mod http;
pub mod observability;
pub mod service;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, ApiConfig, IleConfig, ObservabilityConfig, StaleResponsePolicy, WorkflowConfig};
pub use elements::{
    CatalogDefaults, CatalogValidator, DefaultDataProvider, Element, ElementCatalog, ElementData,
    ElementKind, ElementType, ElementValidator, FieldGroup, ValidationResult,
};
pub use error::{CreationError, ServiceError, UnknownElementTypeError, ValidationError};
pub use http::HttpCreationService;
pub use observability::{CreationMetrics, CreationStats, OperationTimer};
pub use service::CreationService;
pub use telemetry::{create_creation_span, generate_correlation_id, init_telemetry};
pub use workflows::{CreationPhase, CreationState, ElementCreationWorkflow};
