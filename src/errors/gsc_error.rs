use thiserror::Error;

/// Failures raised while talking to the Search Console API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GscError {
    /// HTTP 403: the principal may not access the exact property requested.
    #[error("Search Console API returned HTTP 403: {body}")]
    PermissionDenied { body: String },

    /// Any other non-success status.
    #[error("Search Console API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// No accessible property shares the caller's apex domain.
    #[error(
        "no matching Search Console property found for {input:?} -- accessible properties: [{}]",
        .accessible.join(", ")
    )]
    NotFound {
        input: String,
        accessible: Vec<String>,
    },

    #[error("malformed Search Console response: {0}")]
    Malformed(String),

    #[error("Search Console request failed: {0}")]
    Transport(String),

    #[error("Search Console request timed out")]
    Timeout,

    #[error("service account credentials rejected: {0}")]
    Credentials(String),
}

impl GscError {
    /// Classifies a non-success HTTP response. 403 is kept apart because it is
    /// the only status that triggers property resolution.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 403 {
            GscError::PermissionDenied { body }
        } else {
            GscError::Upstream { status, body }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GscError::PermissionDenied { .. } => Some(403),
            GscError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, GscError::PermissionDenied { .. })
    }
}
