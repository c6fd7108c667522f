use std::fmt;

use async_trait::async_trait;

/// Errors that can occur during provider operations.
/// Variants carry enough info for the controller to classify the failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// The provider's response envelope could not be read. Not retryable.
    Parse(String),
}

/// Coarse failure classes the UI reacts to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The credential was rejected or is unusable.
    Authentication,
    /// The service is throttling us.
    RateLimited,
    /// Anything else; worth a retry.
    Other,
}

/// Markers providers put in 400 bodies when the key itself is bad.
const INVALID_KEY_MARKERS: &[&str] = &["API_KEY_INVALID", "API key not valid", "invalid api key"];

impl ProviderError {
    pub fn class(&self) -> FailureClass {
        match self {
            ProviderError::Api { status: 401 | 403, .. } => FailureClass::Authentication,
            ProviderError::Api { status: 429, .. } => FailureClass::RateLimited,
            ProviderError::Api {
                status: 400,
                message,
            } if INVALID_KEY_MARKERS
                .iter()
                .any(|m| message.to_lowercase().contains(&m.to_lowercase())) =>
            {
                FailureClass::Authentication
            }
            _ => FailureClass::Other,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Sends a single prompt and returns the model's text reply.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> ProviderError {
        ProviderError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_auth_statuses_classified_as_authentication() {
        assert_eq!(api(401, "Unauthorized").class(), FailureClass::Authentication);
        assert_eq!(api(403, "Forbidden").class(), FailureClass::Authentication);
    }

    #[test]
    fn test_invalid_key_400_classified_as_authentication() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api(400, body).class(), FailureClass::Authentication);
    }

    #[test]
    fn test_plain_400_is_other() {
        assert_eq!(api(400, "bad request").class(), FailureClass::Other);
    }

    #[test]
    fn test_429_is_rate_limited() {
        assert_eq!(api(429, "RESOURCE_EXHAUSTED").class(), FailureClass::RateLimited);
    }

    #[test]
    fn test_network_and_server_errors_are_other() {
        assert_eq!(
            ProviderError::Network("connection refused".into()).class(),
            FailureClass::Other
        );
        assert_eq!(api(503, "unavailable").class(), FailureClass::Other);
        assert_eq!(ProviderError::Parse("eof".into()).class(), FailureClass::Other);
    }

    #[test]
    fn test_only_rejected_credentials_are_authentication() {
        let errors = [
            ProviderError::Network("dns".into()),
            ProviderError::Parse("missing candidates".into()),
            api(500, "internal"),
            api(400, "model not found"),
        ];
        for error in errors {
            assert_ne!(error.class(), FailureClass::Authentication, "{error}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(api(429, "slow down").to_string(), "API error (HTTP 429): slow down");
        assert_eq!(
            ProviderError::Network("timeout".into()).to_string(),
            "network error: timeout"
        );
    }
}
