//! Custom error types for the registration engine
//!
//! Provides structured error handling with context for the different
//! failure scenarios of a registration run.

use std::fmt;

/// Result alias used by the portal-facing components
pub type Result<T> = std::result::Result<T, RegistrarError>;

/// Main error type for the registration engine
#[derive(Debug)]
pub enum RegistrarError {
    /// Network or HTTP-level failures talking to the portal
    Transport(TransportError),

    /// Malformed JSON/HTML or unparseable values
    Parse(ParseError),

    /// SAML handshake could not be completed
    Authentication(AuthenticationError),

    /// Registration window is not open
    Eligibility(EligibilityError),

    /// Batch submission could not be performed
    Submission(SubmissionError),

    /// Shutdown was requested while the task was waiting
    Cancelled,

    /// Other errors with context
    Other(String),
}

/// Transport error variants
#[derive(Debug)]
pub enum TransportError {
    /// Request could not be sent or the response body could not be read
    RequestFailed { operation: String, reason: String },

    /// Portal answered with a non-success HTTP status
    Status { operation: String, status: u16 },
}

/// Parse error variants
#[derive(Debug)]
pub enum ParseError {
    /// Response body was not the expected JSON document
    Json { operation: String, reason: String },

    /// Timestamp did not match `MM/DD/YYYY HH:MM AM|PM`
    Timestamp { value: String },
}

/// Authentication error variants
#[derive(Debug)]
pub enum AuthenticationError {
    /// A handshake step did not yield its expected form token
    MissingToken { step: String, field: String },

    /// Identity provider asked for credentials but none are configured
    MissingCredentials,
}

/// Eligibility error variants
#[derive(Debug)]
pub enum EligibilityError {
    /// Portal refuses registration without an earliest-eligible time
    Blocked { reason: String },

    /// Window stayed closed for the maximum number of eligibility checks
    WindowNeverOpened { checks: u32 },
}

/// Submission error variants
#[derive(Debug)]
pub enum SubmissionError {
    /// No add or drop could be staged
    NothingToSubmit,
}

impl RegistrarError {
    pub fn request_failed(operation: &str, err: impl fmt::Display) -> Self {
        RegistrarError::Transport(TransportError::RequestFailed {
            operation: operation.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn json(operation: &str, err: impl fmt::Display) -> Self {
        RegistrarError::Parse(ParseError::Json {
            operation: operation.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn missing_token(step: &str, field: &str) -> Self {
        RegistrarError::Authentication(AuthenticationError::MissingToken {
            step: step.to_string(),
            field: field.to_string(),
        })
    }
}

impl fmt::Display for RegistrarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrarError::Transport(e) => write!(f, "Transport error: {}", e),
            RegistrarError::Parse(e) => write!(f, "Parse error: {}", e),
            RegistrarError::Authentication(e) => write!(f, "Authentication failed: {}", e),
            RegistrarError::Eligibility(e) => write!(f, "Registration not permitted: {}", e),
            RegistrarError::Submission(e) => write!(f, "Submission failed: {}", e),
            RegistrarError::Cancelled => write!(f, "Cancelled"),
            RegistrarError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::RequestFailed { operation, reason } => {
                write!(f, "{} failed: {}", operation, reason)
            }
            TransportError::Status { operation, status } => {
                write!(f, "{} returned HTTP {}", operation, status)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Json { operation, reason } => {
                write!(f, "invalid JSON from {}: {}", operation, reason)
            }
            ParseError::Timestamp { value } => {
                write!(f, "'{}' is not a MM/DD/YYYY HH:MM AM|PM timestamp", value)
            }
        }
    }
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthenticationError::MissingToken { step, field } => {
                write!(f, "{} did not return a '{}' field", step, field)
            }
            AuthenticationError::MissingCredentials => {
                write!(f, "identity provider requested credentials but none are configured")
            }
        }
    }
}

impl fmt::Display for EligibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityError::Blocked { reason } => write!(f, "{}", reason),
            EligibilityError::WindowNeverOpened { checks } => {
                write!(f, "registration window still closed after {} checks", checks)
            }
        }
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::NothingToSubmit => write!(f, "No courses to add or drop"),
        }
    }
}

impl std::error::Error for RegistrarError {}
impl std::error::Error for TransportError {}
impl std::error::Error for ParseError {}
impl std::error::Error for AuthenticationError {}
impl std::error::Error for EligibilityError {}
impl std::error::Error for SubmissionError {}

impl From<anyhow::Error> for RegistrarError {
    fn from(err: anyhow::Error) -> Self {
        RegistrarError::Other(err.to_string())
    }
}

impl From<TransportError> for RegistrarError {
    fn from(err: TransportError) -> Self {
        RegistrarError::Transport(err)
    }
}

impl From<ParseError> for RegistrarError {
    fn from(err: ParseError) -> Self {
        RegistrarError::Parse(err)
    }
}

impl From<AuthenticationError> for RegistrarError {
    fn from(err: AuthenticationError) -> Self {
        RegistrarError::Authentication(err)
    }
}

impl From<EligibilityError> for RegistrarError {
    fn from(err: EligibilityError) -> Self {
        RegistrarError::Eligibility(err)
    }
}

impl From<SubmissionError> for RegistrarError {
    fn from(err: SubmissionError) -> Self {
        RegistrarError::Submission(err)
    }
}
