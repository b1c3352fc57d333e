use crate::constants::{
    NETWORK_UNAVAILABLE_MESSAGE, UNEXPECTED_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};

/// Errors raised while turning form input into a typed value.
///
/// These abort a submission before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field} is required")]
    MissingRequiredField { field: &'static str },
    #[error("invalid entry type: {0:?}")]
    InvalidVariant(String),
    #[error("invalid gender: {0:?}")]
    InvalidGender(String),
    #[error("invalid health check rating: {0:?}")]
    InvalidRating(String),
}

impl FormError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self::MissingRequiredField { field }
    }
}

/// Errors raised when a candidate entry value does not match the shape its
/// `type` tag declares.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryShapeError {
    #[error("entry must be a JSON object")]
    NotAnObject,
    #[error("entry has no string \"type\" tag")]
    MissingTag,
    #[error("unknown entry type: {0:?}")]
    UnknownVariant(String),
    #[error("field {field:?} is not allowed on a {kind} entry")]
    DisallowedField { kind: &'static str, field: String },
    #[error("entry schema mismatch at {path}: {message}")]
    Malformed { path: String, message: String },
}

/// Failures of calls to the backend API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response was received at all.
    #[error("server unavailable: {0}")]
    NetworkUnavailable(String),
    /// A response arrived with an error status.
    #[error("server responded with status {status}")]
    Server {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::NetworkUnavailable(_) => NETWORK_UNAVAILABLE_MESSAGE,
            ApiError::Server {
                message: Some(message),
                ..
            } => message,
            ApiError::Server { message: None, .. } => UNKNOWN_ERROR_MESSAGE,
            ApiError::Unexpected(_) => UNEXPECTED_ERROR_MESSAGE,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum PatientorError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    EntryShape(#[from] EntryShapeError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown patient: {0}")]
    UnknownPatient(String),
    #[error("no patient is selected")]
    NoPatientSelected,
}

pub type PatientorResult<T> = std::result::Result<T, PatientorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_prefers_structured_message() {
        let err = ApiError::Server {
            status: 400,
            message: Some("Incorrect date".into()),
        };
        assert_eq!(err.user_message(), "Incorrect date");

        let err = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn network_and_unexpected_use_generic_messages() {
        let err = ApiError::NetworkUnavailable("connection refused".into());
        assert_eq!(err.user_message(), NETWORK_UNAVAILABLE_MESSAGE);

        let err = ApiError::Unexpected("bad json".into());
        assert_eq!(err.user_message(), UNEXPECTED_ERROR_MESSAGE);
    }
}
