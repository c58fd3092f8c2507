use thiserror::Error;

/// Result type alias for shell operations
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors that can occur during shell operations
#[derive(Error, Debug)]
pub enum ShellError {
    /// No server could be resolved for login
    #[error("No server specified")]
    NoServer,

    /// Operation requires an authenticated session
    #[error("Not logged in. Run 'spacesh login' first.")]
    NotLoggedIn,

    /// Server unreachable or URL invalid
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: RemoteError,
    },

    /// Server API older than the supported minimum
    #[error("API ({have}) is too old (>= {minimum} required)")]
    ApiTooOld { have: String, minimum: String },

    /// Supplied credentials were rejected
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] RemoteError),

    /// A remote call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Interactive input failed
    #[error("Failed to read input: {0}")]
    Prompt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse data: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

impl ShellError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Toml(_) | Self::NoServer | Self::InvalidArgument(_) | Self::Env(_) => 2,
            _ => 1,
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

/// Errors raised by the remote API collaborator
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Session or credentials rejected by the server
    #[error("Authentication fault: {0}")]
    Auth(String),

    /// The server refused the call (typically no access to the resource)
    #[error("Server fault: {message}")]
    Fault { code: Option<i64>, message: String },

    /// Non-success HTTP status
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Server address could not be turned into a URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Create a fault error without a fault code
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            code: None,
            message: message.into(),
        }
    }

    /// Whether the server rejected the session or credentials
    pub fn is_auth_fault(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
