use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::elements::{has_items, object_field, Element, ElementCatalog, ElementData, ElementType};
use crate::error::ServiceError;
use crate::service::CreationService;

/// REST creation service for the library editor backend.
///
/// Creation is two requests: a `POST` with the kind's basic fields, then a
/// `PUT` of the created element with references, standards and test
/// references attached, sent only when any of those lists is non-empty.
#[derive(Debug, Clone)]
pub struct HttpCreationService {
    client: Client,
    base_url: String,
    catalog: ElementCatalog,
}

impl HttpCreationService {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            catalog: ElementCatalog::standard(),
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, ServiceError> {
        Self::new(api.base_url.clone(), Duration::from_secs(api.timeout_seconds))
    }

    /// Replace the catalog used to resolve endpoints and request bodies
    pub fn with_catalog(mut self, catalog: ElementCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<reqwest::Response, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Sending request to element backend");

        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(url = %url, error = %e, "Failed to read error response body");
                    String::new()
                }
            };
            return Err(ServiceError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

fn needs_update(data: &ElementData) -> bool {
    has_items(data, "references")
        || has_items(data, "standards")
        || object_field(data, "test").is_some_and(|test| has_items(test, "references"))
}

fn list_or_empty(data: Option<&ElementData>, key: &str) -> Value {
    data.and_then(|d| d.get(key))
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

/// Merge the attachable lists from `data` into the created element.
fn update_body(created: &Value, data: &ElementData, endpoint: &str) -> Result<Value, ServiceError> {
    let Value::Object(mut body) = created.clone() else {
        return Err(ServiceError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: "created element is not a JSON object".to_string(),
        });
    };

    body.insert("references".to_string(), list_or_empty(Some(data), "references"));
    body.insert("standards".to_string(), list_or_empty(Some(data), "standards"));

    let mut test = body
        .get("test")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    test.insert(
        "references".to_string(),
        list_or_empty(object_field(data, "test"), "references"),
    );
    body.insert("test".to_string(), Value::Object(test));

    Ok(Value::Object(body))
}

#[async_trait]
impl CreationService for HttpCreationService {
    async fn create(
        &self,
        element_type: &ElementType,
        version: &str,
        data: &ElementData,
    ) -> Result<Element, ServiceError> {
        let kind = self
            .catalog
            .get(element_type)
            .ok_or_else(|| ServiceError::UnsupportedElementType(element_type.clone()))?;
        let path = kind.path(version);

        let response = self
            .send_json(Method::POST, &path, &kind.create_request(data))
            .await?;
        let created: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse {
                endpoint: path.clone(),
                message: e.to_string(),
            })?;

        if needs_update(data) {
            let update = update_body(&created, data, &path)?;
            self.send_json(Method::PUT, &path, &update).await?;
            debug!(endpoint = %path, "Attached references and standards to created element");
        }

        let element = Element::new(created);
        info!(
            element_type = %element_type,
            version = %version,
            uuid = ?element.uuid(),
            "Element created"
        );
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> ElementData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_needs_update_only_with_attachments() {
        assert!(!needs_update(&data(json!({"references": [], "standards": [], "test": {"references": []}}))));
        assert!(!needs_update(&data(json!({"name": "Login"}))));
        assert!(needs_update(&data(json!({"references": [{"name": "OWASP"}]}))));
        assert!(needs_update(&data(json!({"standards": [{"standard_ref": "A1"}]}))));
        assert!(needs_update(&data(json!({"test": {"references": [{"name": "CWE"}]}}))));
    }

    #[test]
    fn test_update_body_keeps_created_test_fields() {
        let created = json!({"uuid": "c1", "ref": "C-1", "test": {"uuid": "t1", "steps": "Check"}});
        let body = update_body(
            &created,
            &data(json!({
                "references": [{"name": "OWASP", "url": "https://owasp.org"}],
                "test": {"references": [{"name": "CWE", "url": "https://cwe.mitre.org"}]}
            })),
            "/version/v1/control",
        )
        .unwrap();

        assert_eq!(body["uuid"], json!("c1"));
        assert_eq!(body["standards"], json!([]));
        assert_eq!(body["references"][0]["name"], json!("OWASP"));
        assert_eq!(body["test"]["uuid"], json!("t1"));
        assert_eq!(body["test"]["steps"], json!("Check"));
        assert_eq!(body["test"]["references"][0]["name"], json!("CWE"));
    }

    #[test]
    fn test_update_body_rejects_non_object_element() {
        let err = update_body(&json!("oops"), &ElementData::new(), "/version/v1/threat").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse { .. }));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let service = HttpCreationService::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(service.base_url(), "http://localhost:8000");
    }
}
