use thiserror::Error;

/// Failure reported by the remote access adapters (auth and table store).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u32),

    #[error("Server error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Not signed in")]
    Unauthenticated,
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

/// Input problems caught before any remote call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter domain")]
    EmptyDomain,

    #[error("Select a child first")]
    NoChildSelected,

    #[error("Email is required")]
    EmptyEmail,

    #[error("Password is required")]
    EmptyPassword,

    #[error("Name is required")]
    EmptyName,

    #[error("Time limit must be between {min} and {max} minutes, got {value}")]
    InvalidTimeLimit { value: i64, min: u32, max: u32 },
}

/// Errors as seen by the page controllers.
///
/// Each variant maps to one way of surfacing the problem: auth failures are
/// shown inline on the login page, fetch failures become an error marker in
/// place of the data, write failures become a blocking notice and validation
/// failures are reported before anything is sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to load {what}: {source}")]
    Fetch {
        what: &'static str,
        source: RemoteError,
    },

    #[error("Failed to save {what}: {source}")]
    Write {
        what: &'static str,
        source: RemoteError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DashboardError {
    pub fn fetch(what: &'static str) -> impl FnOnce(RemoteError) -> Self {
        move |source| DashboardError::Fetch { what, source }
    }

    pub fn write(what: &'static str) -> impl FnOnce(RemoteError) -> Self {
        move |source| DashboardError::Write { what, source }
    }

    /// Short text for the inline error marker shown in place of data
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Auth(message) => message.clone(),
            DashboardError::Fetch { what, .. } => format!("Error loading {}", what),
            DashboardError::Write { what, source } => format!("Failed to update {}: {}", what, source),
            DashboardError::Validation(err) => err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
