use serde::Serialize;

use super::catalog::{ElementCatalog, FieldGroup};
use super::{is_filled, object_field, ElementData, ElementType};
use crate::error::ValidationError;

/// Outcome of validating element data. Validity is derived from the error list,
/// so an empty list and `is_valid()` can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError { errors: self.errors })
        }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        state.serialize_field("isValid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors)?;
        state.end()
    }
}

/// Pure check of element data before it is submitted.
///
/// Implementations must not panic on unexpected shapes; unknown types and
/// unrecognized fields produce an invalid result instead.
pub trait ElementValidator: Send + Sync {
    fn validate(&self, element_type: &ElementType, data: &ElementData) -> ValidationResult;
}

impl<F> ElementValidator for F
where
    F: Fn(&ElementType, &ElementData) -> ValidationResult + Send + Sync,
{
    fn validate(&self, element_type: &ElementType, data: &ElementData) -> ValidationResult {
        self(element_type, data)
    }
}

/// Validator enforcing the editor's required-field rules for each catalog kind.
#[derive(Debug, Clone)]
pub struct CatalogValidator {
    catalog: ElementCatalog,
}

impl CatalogValidator {
    pub fn new(catalog: ElementCatalog) -> Self {
        Self { catalog }
    }
}

impl Default for CatalogValidator {
    fn default() -> Self {
        Self::new(ElementCatalog::standard())
    }
}

impl ElementValidator for CatalogValidator {
    fn validate(&self, element_type: &ElementType, data: &ElementData) -> ValidationResult {
        let mut result = ValidationResult::valid();

        if !is_filled(data, "ref") {
            result.push("Reference is required");
        }
        if !is_filled(data, "name") {
            result.push("Name is required");
        }
        if !is_filled(data, "desc") {
            result.push("Description is required");
        }

        let Some(kind) = self.catalog.get(element_type) else {
            result.push(format!("Unknown element type: {element_type}"));
            return result;
        };

        if kind.has(FieldGroup::RiskRating) {
            let complete = object_field(data, "riskRating").is_some_and(|rating| {
                ["confidentiality", "integrity", "availability", "ease_of_exploitation"]
                    .iter()
                    .all(|key| is_filled(rating, key))
            });
            if !complete {
                result.push("All risk rating fields are required for threats");
            }
        }
        if kind.has(FieldGroup::Impact) && !is_filled(data, "impact") {
            result.push("Impact is required for weaknesses");
        }
        if kind.has(FieldGroup::State) && !is_filled(data, "state") {
            result.push("State is required for controls");
        }
        if kind.has(FieldGroup::Cost) && !is_filled(data, "cost") {
            result.push("Cost is required for controls");
        }

        result
    }
}
