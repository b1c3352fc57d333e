//! Backend API contract.
//!
//! The backend owns patient storage, the diagnosis catalog and entry
//! persistence. [`PatientApi`] is the seam the session talks through; the
//! HTTP implementation lives in the `patientor-api-client` crate.

use crate::constants::PLAIN_TEXT_ERROR_PREFIX;
use crate::diagnosis::Diagnosis;
use crate::entry::EntryWithoutId;
use crate::error::ApiResult;
use crate::patient::{Patient, PatientFormValues};
use serde::Deserialize;
use std::future::Future;

pub trait PatientApi {
    /// Wakes the backend up; the response body is ignored.
    fn ping(&self) -> impl Future<Output = ApiResult<()>> + Send;

    /// All patients, usually without entries.
    fn fetch_patients(&self) -> impl Future<Output = ApiResult<Vec<Patient>>> + Send;

    /// One patient with entries populated.
    fn fetch_patient(&self, id: &str) -> impl Future<Output = ApiResult<Patient>> + Send;

    fn fetch_diagnoses(&self) -> impl Future<Output = ApiResult<Vec<Diagnosis>>> + Send;

    fn create_patient(
        &self,
        values: &PatientFormValues,
    ) -> impl Future<Output = ApiResult<Patient>> + Send;

    /// Persists `entry` for the patient and returns the updated patient.
    fn create_entry(
        &self,
        patient_id: &str,
        entry: &EntryWithoutId,
    ) -> impl Future<Output = ApiResult<Patient>> + Send;
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// First message of a `{ "error": [{ "message": ... }] }` body.
pub fn first_error_message(body: &str) -> Option<String> {
    let payload: ErrorPayload = serde_json::from_str(body).ok()?;
    payload
        .error
        .into_iter()
        .next()
        .and_then(|detail| detail.message)
        .filter(|message| !message.trim().is_empty())
}

/// Message carried by a plain-text (or JSON string) error body.
///
/// The generic `"Something went wrong. Error: "` prefix is removed.
pub fn plain_text_error_message(body: &str) -> Option<String> {
    let text = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(_) => return None,
        Err(_) => body.to_string(),
    };
    let text = text.replace(PLAIN_TEXT_ERROR_PREFIX, "");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
