use thiserror::Error;

use crate::elements::ElementType;

/// Element data failed the validator's checks. Never reaches the creation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation errors: {}", .errors.join(", "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// No default data (or catalog entry) is registered for the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown element type: {element_type}")]
pub struct UnknownElementTypeError {
    pub element_type: ElementType,
}

/// Failures reported by a creation service once a request has been attempted.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Transport { message: String },
    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },
    #[error("Request to {endpoint} failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },
    #[error("Invalid element type: {0}")]
    UnsupportedElementType(ElementType),
}

impl ServiceError {
    pub fn transport(message: impl Into<String>) -> Self {
        ServiceError::Transport {
            message: message.into(),
        }
    }

    /// Map a reqwest failure for `endpoint` onto the service taxonomy.
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_decode() {
            ServiceError::MalformedResponse {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else {
            ServiceError::Transport {
                message: err.to_string(),
            }
        }
    }
}

/// Everything `ElementCreationWorkflow::create` can fail with.
#[derive(Debug, Error)]
pub enum CreationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl CreationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CreationError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_joins_messages() {
        let err = ValidationError {
            errors: vec!["Name is required".to_string(), "Cost is required for controls".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Validation errors: Name is required, Cost is required for controls"
        );
    }

    #[test]
    fn test_transport_error_displays_bare_message() {
        let err = CreationError::from(ServiceError::transport("network timeout"));
        assert_eq!(err.to_string(), "network timeout");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_status_error_mentions_endpoint_and_code() {
        let err = ServiceError::Status {
            endpoint: "/version/v1/threat".to_string(),
            status: 422,
            body: "bad ref".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request to /version/v1/threat failed with status 422: bad ref"
        );
    }
}
