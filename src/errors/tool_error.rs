use crate::errors::GscError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    Denied,
    NotFound,
    Upstream,
    Timeout,
    Retryable,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: matches!(kind, ToolErrorKind::Timeout | ToolErrorKind::Retryable),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Prefixes the message with the operation that failed, e.g.
    /// `"listing sitemaps: ..."`.
    pub fn with_context(mut self, context: &str) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Denied, "DENIED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, "NOT_FOUND", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Upstream, "UPSTREAM", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, "TIMEOUT", message)
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Retryable, "RETRYABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, "INTERNAL", message)
    }

    /// Flat key/value form handed back to the assistant as the tool result.
    pub fn to_payload(&self) -> Value {
        let mut out = Map::new();
        out.insert("error".to_string(), Value::String(self.message.clone()));
        out.insert("code".to_string(), Value::String(self.code.clone()));
        out.insert("retryable".to_string(), Value::Bool(self.retryable));
        if let Some(hint) = &self.hint {
            out.insert("hint".to_string(), Value::String(hint.clone()));
        }
        if let Some(Value::Object(details)) = &self.details {
            for (key, value) in details {
                out.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        Value::Object(out)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}

impl From<GscError> for ToolError {
    fn from(err: GscError) -> Self {
        let message = err.to_string();
        match err {
            GscError::PermissionDenied { .. } => ToolError::denied(message)
                .with_hint("The service account has no access to this property. Call list_sites to see what it can query.")
                .with_details(serde_json::json!({ "status": 403 })),
            GscError::NotFound { accessible, .. } => ToolError::not_found(message)
                .with_hint("Use one of the accessible properties as site_url, or grant the service account access in Search Console.")
                .with_details(serde_json::json!({ "accessible_properties": accessible })),
            GscError::Upstream { status, .. } => {
                let base = if status == 408 || status == 429 || status >= 500 {
                    ToolError::retryable(message)
                } else {
                    ToolError::upstream(message)
                };
                base.with_details(serde_json::json!({ "status": status }))
            }
            GscError::Timeout => ToolError::timeout(message),
            GscError::Transport(_) => ToolError::retryable(message),
            GscError::Malformed(_) | GscError::Credentials(_) => ToolError::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_maps_to_denied() {
        let err: ToolError = GscError::from_status(403, "nope".to_string()).into();
        assert_eq!(err.kind, ToolErrorKind::Denied);
        assert!(!err.retryable);
    }

    #[test]
    fn not_found_payload_carries_accessible_properties_flat() {
        let err: ToolError = GscError::NotFound {
            input: "x.com".to_string(),
            accessible: vec!["sc-domain:other.com".to_string()],
        }
        .into();
        let payload = err.with_context("listing sitemaps").to_payload();
        assert_eq!(payload["code"], "NOT_FOUND");
        assert_eq!(
            payload["accessible_properties"],
            serde_json::json!(["sc-domain:other.com"])
        );
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .starts_with("listing sitemaps: "));
    }

    #[test]
    fn server_errors_are_retryable() {
        let err: ToolError = GscError::from_status(503, "unavailable".to_string()).into();
        assert_eq!(err.kind, ToolErrorKind::Retryable);
        assert!(err.retryable);

        let err: ToolError = GscError::from_status(400, "bad".to_string()).into();
        assert_eq!(err.kind, ToolErrorKind::Upstream);
        assert!(!err.retryable);
    }
}
