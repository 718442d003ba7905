use serde_json::json;

use super::catalog::ElementCatalog;
use super::{ElementData, ElementType};
use crate::error::UnknownElementTypeError;

/// Source of the blank payload a form starts from.
pub trait DefaultDataProvider: Send + Sync {
    fn defaults_for(&self, element_type: &ElementType) -> Result<ElementData, UnknownElementTypeError>;
}

/// Defaults for every kind in the catalog. All kinds share the editor's blank
/// form layout; unregistered types are an error.
#[derive(Debug, Clone)]
pub struct CatalogDefaults {
    catalog: ElementCatalog,
}

impl CatalogDefaults {
    pub fn new(catalog: ElementCatalog) -> Self {
        Self { catalog }
    }
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self::new(ElementCatalog::standard())
    }
}

fn blank_form() -> ElementData {
    let form = json!({
        "ref": "",
        "name": "",
        "desc": "",
        "state": "",
        "cost": "",
        "impact": "",
        "riskRating": {
            "confidentiality": "",
            "integrity": "",
            "availability": "",
            "ease_of_exploitation": "",
        },
        "references": [],
        "standards": [],
        "test": {
            "steps": "",
            "result": "",
            "timestamp": "",
            "references": [],
        },
    });

    match form {
        serde_json::Value::Object(map) => map,
        _ => ElementData::new(),
    }
}

impl DefaultDataProvider for CatalogDefaults {
    fn defaults_for(&self, element_type: &ElementType) -> Result<ElementData, UnknownElementTypeError> {
        if self.catalog.get(element_type).is_none() {
            return Err(UnknownElementTypeError {
                element_type: element_type.clone(),
            });
        }
        Ok(blank_form())
    }
}
