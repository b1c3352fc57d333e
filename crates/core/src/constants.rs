//! Constants shared across the Patientor core crate.

/// Backend base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default lifetime of an error notice, in seconds.
pub const DEFAULT_NOTICE_SECS: i64 = 5;

/// Shown when the backend could not be reached.
pub const NETWORK_UNAVAILABLE_MESSAGE: &str =
    "Server is currently unavailable. Please try again later.";

/// Shown when the backend returned an error without a usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Shown for failures that are neither transport nor server errors.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Prefix some backends put in front of plain-text patient creation errors.
pub const PLAIN_TEXT_ERROR_PREFIX: &str = "Something went wrong. Error: ";
