use serde::Serialize;
use serde_json::{json, Value};

use super::{object_field, value_or_blank, ElementData, ElementType};

/// Groups of form fields an element kind carries. Drives validation rules and
/// the shape of the create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Basic,
    RiskRating,
    Scope,
    Stride,
    References,
    Impact,
    Test,
    State,
    Cost,
    Standards,
}

/// One element kind known to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct ElementKind {
    pub element_type: ElementType,
    pub label: String,
    /// Path segment under `/version/{version}/`
    pub endpoint: String,
    pub fields: Vec<FieldGroup>,
}

impl ElementKind {
    pub fn new(tag: &str, label: &str, fields: &[FieldGroup]) -> Self {
        Self {
            element_type: ElementType::from(tag),
            label: label.to_string(),
            endpoint: tag.to_string(),
            fields: fields.to_vec(),
        }
    }

    pub fn has(&self, group: FieldGroup) -> bool {
        self.fields.contains(&group)
    }

    pub fn path(&self, version: &str) -> String {
        format!("/version/{}/{}", version, self.endpoint)
    }

    /// Body of the initial `POST` for this kind.
    pub fn create_request(&self, data: &ElementData) -> Value {
        let mut body = json!({
            "ref": value_or_blank(data, "ref"),
            "name": value_or_blank(data, "name"),
            "desc": value_or_blank(data, "desc"),
        });

        if self.has(FieldGroup::RiskRating) {
            let empty = ElementData::new();
            let rating = object_field(data, "riskRating").unwrap_or(&empty);
            body["risk_rating"] = json!({
                "confidentiality": value_or_blank(rating, "confidentiality"),
                "integrity": value_or_blank(rating, "integrity"),
                "availability": value_or_blank(rating, "availability"),
                "ease_of_exploitation": value_or_blank(rating, "ease_of_exploitation"),
            });
        }
        if self.has(FieldGroup::Scope) {
            body["scope"] = list_or_empty(data, "scope");
        }
        if self.has(FieldGroup::Stride) {
            body["stride"] = list_or_empty(data, "stride");
        }
        if self.has(FieldGroup::Impact) {
            body["impact"] = value_or_blank(data, "impact");
        }
        if self.has(FieldGroup::State) {
            body["state"] = value_or_blank(data, "state");
        }
        if self.has(FieldGroup::Cost) {
            body["cost"] = value_or_blank(data, "cost");
        }
        if self.has(FieldGroup::Test) {
            body["steps"] = object_field(data, "test")
                .map(|test| value_or_blank(test, "steps"))
                .unwrap_or_else(|| json!(""));
        }

        body
    }
}

fn list_or_empty(data: &ElementData, key: &str) -> Value {
    match data.get(key) {
        Some(Value::Array(items)) => Value::Array(items.clone()),
        _ => Value::Array(Vec::new()),
    }
}

/// Registry of element kinds, looked up by type tag.
#[derive(Debug, Clone, Default)]
pub struct ElementCatalog {
    kinds: Vec<ElementKind>,
}

impl ElementCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The four kinds a library version holds.
    pub fn standard() -> Self {
        use FieldGroup::*;

        Self {
            kinds: vec![
                ElementKind::new("usecase", "Use case", &[Basic]),
                ElementKind::new(
                    "threat",
                    "Threat",
                    &[Basic, RiskRating, Scope, Stride, References],
                ),
                ElementKind::new("weakness", "Weakness", &[Basic, Impact, Test]),
                ElementKind::new(
                    "control",
                    "Control",
                    &[Basic, State, Cost, Standards, References, Test],
                ),
            ],
        }
    }

    /// Add a kind, replacing any existing entry with the same tag.
    pub fn register(&mut self, kind: ElementKind) {
        self.kinds.retain(|k| k.element_type != kind.element_type);
        self.kinds.push(kind);
    }

    pub fn get(&self, element_type: &ElementType) -> Option<&ElementKind> {
        self.kinds.iter().find(|k| &k.element_type == element_type)
    }

    pub fn kinds(&self) -> &[ElementKind] {
        &self.kinds
    }
}
