use thiserror::Error;

/// Uniform failure value for every remote gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Non-2xx response; `message` is the upstream text or a status-derived default.
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}

/// Client-side validation failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All instance names are required")]
    BlankInstanceName,
    #[error("Duplicate instance name: {0}")]
    DuplicateInstanceName(String),
    #[error("Invalid URL. It must start with http:// or https://")]
    InvalidWebhookUrl,
    #[error("Please type exactly: \"{expected}\"")]
    ConfirmationMismatch { expected: String },
    #[error("No instances selected")]
    EmptySelection,
    #[error("A bulk action is already in progress...")]
    BulkActionInProgress,
}
