use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Resolution error: {0}")]
    Resolve(#[from] core_resolve::ResolveError),

    #[error("Proxy error: {0}")]
    Proxy(#[from] core_proxy::ProxyError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

impl ServiceError {
    /// Stable machine-readable tag for structured error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::MalformedRequest(_) => "malformed_request",
            ServiceError::Resolve(e) => e.kind(),
            ServiceError::Proxy(e) => e.kind(),
            ServiceError::Runtime(_) => "internal",
        }
    }

    /// Serializable payload for the routing layer. Never exposes a raw
    /// backtrace; the detail is the error's display form.
    pub fn to_body(&self, id: Option<&str>) -> ErrorBody {
        ErrorBody {
            error: self.kind().to_string(),
            detail: self.to_string(),
            id: id.map(|s| s.to_string()),
        }
    }
}

/// User-visible error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error tag.
    pub error: String,
    /// Human-readable detail.
    pub detail: String,
    /// Media identifier the request was about, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_delegates_to_inner_error() {
        let err = ServiceError::Resolve(core_resolve::ResolveError::Exhausted {
            video_id: "vid1".to_string(),
        });
        assert_eq!(err.kind(), "resolution_exhausted");

        let err = ServiceError::MalformedRequest("missing id".to_string());
        assert_eq!(err.kind(), "malformed_request");
    }

    #[test]
    fn test_error_body_serialization() {
        let err = ServiceError::Resolve(core_resolve::ResolveError::Exhausted {
            video_id: "vid1".to_string(),
        });
        let body = serde_json::to_value(err.to_body(Some("vid1"))).unwrap();

        assert_eq!(body["error"], "resolution_exhausted");
        assert_eq!(body["id"], "vid1");
        assert!(body["detail"].as_str().unwrap().contains("vid1"));
    }

    #[test]
    fn test_error_body_omits_missing_id() {
        let err = ServiceError::MalformedRequest("missing id".to_string());
        let body = serde_json::to_value(err.to_body(None)).unwrap();
        assert!(body.get("id").is_none());
    }
}
