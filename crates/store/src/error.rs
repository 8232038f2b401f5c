/// Failure of a single remote store call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("{}", api_message(*status, message.as_deref()))]
    Api {
        /// HTTP status code.
        status: u16,
        /// `detail` / `error` from the body, or the raw body.
        message: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: Some(message.into()),
        }
    }

    /// Status code for diagnostics, when the backend produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

fn api_message(status: u16, message: Option<&str>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!("Backend error ({status}): {m}"),
        _ => format!("Backend error ({status})"),
    }
}
