//! Creation service abstraction
//!
//! The workflow reaches the backend only through this trait, so tests can swap
//! in a mock and the HTTP implementation stays an implementation detail.

use async_trait::async_trait;

use crate::elements::{Element, ElementData, ElementType};
use crate::error::ServiceError;

#[cfg(test)]
use mockall::automock;

/// Persists a new element inside a version.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CreationService: Send + Sync {
    /// Create the element and return it as stored, including any
    /// server-assigned identifier.
    async fn create(
        &self,
        element_type: &ElementType,
        version: &str,
        data: &ElementData,
    ) -> Result<Element, ServiceError>;
}
