use thiserror::Error;

/// The main error type for Proxmox CLI operations.
///
/// This enum represents all possible errors that can occur while resolving
/// configuration, authenticating, and talking to the cluster API. Each
/// variant maps to a distinct process exit code, see [`ProxmoxError::exit_code`].
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// The persisted configuration or a connection parameter is unusable
    ///
    /// # Fields
    /// * `0` - A description of what is wrong with the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable authentication method could be resolved
    ///
    /// Raised before any network call is attempted.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The remote endpoint rejected the supplied credentials
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A single resource call failed
    ///
    /// `status_code` is the HTTP status of the response, or `0` when the
    /// request never produced one (connect failure, timeout, TLS error).
    #[error("Remote API error ({status_code}): {message}")]
    RemoteApi { status_code: u16, message: String },

    /// Caller-supplied parameters are structurally invalid
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Writing command output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxmoxError {
    /// Builds a `RemoteApi` error for a transport-level failure.
    pub fn transport(message: impl Into<String>) -> Self {
        ProxmoxError::RemoteApi {
            status_code: 0,
            message: message.into(),
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProxmoxError::Io(_) => 1,
            ProxmoxError::Validation(_) => 2,
            ProxmoxError::Config(_) => 3,
            ProxmoxError::MissingCredentials(_) => 4,
            ProxmoxError::Authentication(_) => 5,
            ProxmoxError::RemoteApi { .. } => 6,
        }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;
