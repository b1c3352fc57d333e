//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! session and API client. Library code never reads environment variables;
//! binaries read them and hand the raw values to
//! [`ClientConfig::from_env_values`].

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_NOTICE_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::{PatientorError, PatientorResult};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
    request_timeout: Duration,
    notice_ttl: chrono::Duration,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// The base URL must be an absolute `http` or `https` URL; a trailing `/`
    /// is removed so paths can be appended directly.
    pub fn new(
        api_base_url: &str,
        request_timeout: Duration,
        notice_ttl: chrono::Duration,
    ) -> PatientorResult<Self> {
        let api_base_url = api_base_url.trim().trim_end_matches('/');
        if api_base_url.is_empty() {
            return Err(PatientorError::InvalidConfig(
                "api base url cannot be empty".into(),
            ));
        }
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(PatientorError::InvalidConfig(format!(
                "api base url must start with http:// or https://: {api_base_url}"
            )));
        }
        if request_timeout.is_zero() {
            return Err(PatientorError::InvalidConfig(
                "request timeout must be positive".into(),
            ));
        }
        if notice_ttl <= chrono::Duration::zero() {
            return Err(PatientorError::InvalidConfig(
                "notice duration must be positive".into(),
            ));
        }

        Ok(Self {
            api_base_url: api_base_url.to_string(),
            request_timeout,
            notice_ttl,
        })
    }

    /// Build a config from optional raw values, falling back to defaults for
    /// values that are absent or blank.
    pub fn from_env_values(
        api_base_url: Option<String>,
        request_timeout_secs: Option<String>,
        notice_secs: Option<String>,
    ) -> PatientorResult<Self> {
        let api_base_url = non_blank(api_base_url).unwrap_or_else(|| DEFAULT_API_BASE_URL.into());

        let timeout_secs = non_blank(request_timeout_secs)
            .map(|v| parse_secs::<u64>(&v, "request timeout"))
            .transpose()?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let notice_secs = non_blank(notice_secs)
            .map(|v| parse_secs::<i64>(&v, "notice duration"))
            .transpose()?
            .unwrap_or(DEFAULT_NOTICE_SECS);

        Self::new(
            &api_base_url,
            Duration::from_secs(timeout_secs),
            chrono::Duration::seconds(notice_secs),
        )
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn notice_ttl(&self) -> chrono::Duration {
        self.notice_ttl
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            notice_ttl: chrono::Duration::seconds(DEFAULT_NOTICE_SECS),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs<T: std::str::FromStr>(value: &str, what: &str) -> PatientorResult<T> {
    value.parse().map_err(|_| {
        PatientorError::InvalidConfig(format!(
            "{what} is not a whole number of seconds: {value}"
        ))
    })
}
