//! # Patientor API client
//!
//! HTTP implementation of [`PatientApi`] for the Patientor backend.
//!
//! Handles:
//! - URL construction under the configured base URL
//! - JSON encoding of requests and decoding of responses
//! - classification of failures into [`ApiError`] variants, including
//!   extraction of the backend's `{ "error": [{ "message": .. }] }` payload

#![warn(rust_2018_idioms)]

use patientor_core::api::{first_error_message, plain_text_error_message};
use patientor_core::{
    ApiError, ApiResult, ClientConfig, Diagnosis, EntryWithoutId, Patient, PatientApi,
    PatientFormValues,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// How to read the body of a failed response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorBody {
    /// Only the structured error payload is understood.
    Structured,
    /// Fall back to a plain-text body when there is no structured payload.
    StructuredOrText,
}

#[derive(Clone, Debug)]
pub struct HttpPatientApi {
    client: Client,
    base_url: Url,
}

impl HttpPatientApi {
    /// Builds a client for the backend described by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unexpected`] if the base URL cannot be parsed or the
    /// underlying HTTP client cannot be constructed.
    pub fn new(cfg: &ClientConfig) -> ApiResult<Self> {
        let base_url = Url::parse(cfg.api_base_url())
            .map_err(|e| ApiError::Unexpected(format!("invalid api base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Unexpected(format!(
                "api base url cannot be a base: {base_url}"
            )));
        }
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| ApiError::Unexpected(format!("failed to build http client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Unexpected(format!("invalid api base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.url(segments)?;
        tracing::debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        read_json(response, ErrorBody::Structured).await
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B, errors: ErrorBody) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        tracing::debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response, errors).await
    }
}

impl PatientApi for HttpPatientApi {
    async fn ping(&self) -> ApiResult<()> {
        let url = self.url(&["ping"])?;
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Server {
                status: status.as_u16(),
                message: None,
            })
        }
    }

    async fn fetch_patients(&self) -> ApiResult<Vec<Patient>> {
        self.get_json(&["patients"]).await
    }

    async fn fetch_patient(&self, id: &str) -> ApiResult<Patient> {
        self.get_json(&["patients", id]).await
    }

    async fn fetch_diagnoses(&self) -> ApiResult<Vec<Diagnosis>> {
        self.get_json(&["diagnoses"]).await
    }

    async fn create_patient(&self, values: &PatientFormValues) -> ApiResult<Patient> {
        self.post_json(&["patients"], values, ErrorBody::StructuredOrText)
            .await
    }

    async fn create_entry(&self, patient_id: &str, entry: &EntryWithoutId) -> ApiResult<Patient> {
        self.post_json(
            &["patients", patient_id, "entries"],
            entry,
            ErrorBody::Structured,
        )
        .await
    }
}

/// Failures before any response arrived.
fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::Unexpected(err.to_string())
    } else {
        ApiError::NetworkUnavailable(err.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, errors: ErrorBody) -> ApiResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Unexpected(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        let message = first_error_message(&body).or_else(|| match errors {
            ErrorBody::StructuredOrText => plain_text_error_message(&body),
            ErrorBody::Structured => None,
        });
        tracing::debug!("backend returned {status}: {message:?}");
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ApiError::Unexpected(format!("failed to decode response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response as AxumResponse};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use patientor_core::constants::UNKNOWN_ERROR_MESSAGE;
    use patientor_core::{
        assemble, DischargeInput, EntryFormInput, EntryKind, Gender, HealthCheckRating,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Store = Arc<Mutex<Vec<Patient>>>;

    fn error_payload(status: StatusCode, message: &str) -> AxumResponse {
        (status, Json(json!({ "error": [{ "message": message }] }))).into_response()
    }

    async fn list_patients(State(store): State<Store>) -> Json<Vec<Patient>> {
        let mut patients = store.lock().expect("lock").clone();
        for p in &mut patients {
            p.entries.clear();
        }
        Json(patients)
    }

    async fn get_patient(State(store): State<Store>, Path(id): Path<String>) -> AxumResponse {
        let patients = store.lock().expect("lock");
        match patients.iter().find(|p| p.id == id) {
            Some(p) => Json(p.clone()).into_response(),
            None => error_payload(StatusCode::NOT_FOUND, "Patient not found"),
        }
    }

    async fn create_patient(Json(values): Json<Value>) -> AxumResponse {
        if values["ssn"] == "bad" {
            return (
                StatusCode::BAD_REQUEST,
                "Something went wrong. Error: Incorrect ssn: bad",
            )
                .into_response();
        }
        Json(json!({
            "id": uuid::Uuid::new_v4().to_string(),
            "name": values["name"],
            "occupation": values["occupation"],
            "gender": values["gender"],
            "ssn": values["ssn"],
        }))
        .into_response()
    }

    async fn create_entry(
        State(store): State<Store>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> AxumResponse {
        let entry = match EntryWithoutId::from_value(body) {
            Ok(entry) => entry,
            Err(err) => return error_payload(StatusCode::BAD_REQUEST, &err.to_string()),
        };
        let mut patients = store.lock().expect("lock");
        match patients.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.entries
                    .push(entry.into_entry(uuid::Uuid::new_v4().to_string()));
                Json(p.clone()).into_response()
            }
            None => error_payload(StatusCode::NOT_FOUND, "Patient not found"),
        }
    }

    async fn diagnoses() -> Json<Value> {
        Json(json!([
            { "code": "M24.2", "name": "Disorder of ligament", "latin": "Morbositas ligamenti" },
            { "code": "J10.1", "name": "Influenza with other respiratory manifestations" }
        ]))
    }

    fn seeded_store() -> Store {
        Arc::new(Mutex::new(vec![Patient {
            id: "d2773336-f723-11e9-8f0b-362b9e155667".into(),
            name: "John McClane".into(),
            occupation: "New york city cop".into(),
            gender: Gender::Male,
            ssn: Some("090786-122X".into()),
            date_of_birth: Some("1986-07-09".into()),
            entries: vec![],
        }]))
    }

    async fn spawn(app: Router) -> ClientConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        ClientConfig::from_env_values(Some(format!("http://{addr}/api/")), None, None)
            .expect("config")
    }

    async fn spawn_backend(store: Store) -> HttpPatientApi {
        let app = Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .route("/api/patients", get(list_patients).post(create_patient))
            .route("/api/patients/:id", get(get_patient))
            .route("/api/patients/:id/entries", post(create_entry))
            .route("/api/diagnoses", get(diagnoses))
            .with_state(store);
        let cfg = spawn(app).await;
        HttpPatientApi::new(&cfg).expect("client")
    }

    fn hospital_input() -> EntryFormInput {
        EntryFormInput {
            entry_type: "Hospital".into(),
            description: "Healing time appr. 2 weeks.".into(),
            date: "2015-01-02".into(),
            specialist: "MD House".into(),
            diagnosis_codes: Some(vec!["S62.5".into()]),
            discharge: DischargeInput {
                date: "2015-01-16".into(),
                criteria: "Thumb has healed.".into(),
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetches_patients_and_diagnoses() {
        let api = spawn_backend(seeded_store()).await;

        api.ping().await.expect("ping");
        let patients = api.fetch_patients().await.expect("patients");
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, "John McClane");

        let diagnoses = api.fetch_diagnoses().await.expect("diagnoses");
        assert_eq!(diagnoses.len(), 2);
        assert_eq!(diagnoses[0].latin.as_deref(), Some("Morbositas ligamenti"));
        assert!(diagnoses[1].latin.is_none());
    }

    #[tokio::test]
    async fn create_entry_returns_patient_with_assigned_id() {
        let store = seeded_store();
        let api = spawn_backend(store.clone()).await;
        let id = "d2773336-f723-11e9-8f0b-362b9e155667";

        let entry = assemble(&hospital_input()).expect("assembles");
        let updated = api.create_entry(id, &entry).await.expect("created");

        assert_eq!(updated.entries.len(), 1);
        let created = &updated.entries[0];
        assert_eq!(created.kind(), EntryKind::Hospital);
        assert_eq!(created.without_id(), &entry);
        assert!(uuid::Uuid::parse_str(created.id()).is_ok());

        let fetched = api.fetch_patient(id).await.expect("fetched");
        assert_eq!(fetched.entries, updated.entries);
    }

    #[tokio::test]
    async fn error_payload_message_is_surfaced() {
        let api = spawn_backend(seeded_store()).await;
        let entry = assemble(&EntryFormInput {
            entry_type: "HealthCheck".into(),
            health_check_rating: Some(HealthCheckRating::Healthy),
            ..hospital_input()
        })
        .expect("assembles");

        let err = api
            .create_entry("no-such-patient", &entry)
            .await
            .expect_err("unknown patient");

        assert_eq!(
            err,
            ApiError::Server {
                status: 404,
                message: Some("Patient not found".into())
            }
        );
        assert_eq!(err.user_message(), "Patient not found");
    }

    #[tokio::test]
    async fn server_error_without_payload_uses_fallback() {
        let app = Router::new().route(
            "/api/patients",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let api = HttpPatientApi::new(&spawn(app).await).expect("client");

        let err = api.fetch_patients().await.expect_err("500");
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                message: None
            }
        );
        assert_eq!(err.user_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn create_patient_reads_plain_text_errors() {
        let api = spawn_backend(seeded_store()).await;

        let values = PatientFormValues::new("Hans", "Technician", "other", Some("bad"), None)
            .expect("valid");
        let err = api.create_patient(&values).await.expect_err("rejected");
        assert_eq!(err.user_message(), "Incorrect ssn: bad");

        let values = PatientFormValues::new("Hans", "Technician", "other", None, None)
            .expect("valid");
        let created = api.create_patient(&values).await.expect("created");
        assert_eq!(created.gender, Gender::Other);
        assert!(created.entries.is_empty());
    }

    #[tokio::test]
    async fn undecodable_success_body_is_unexpected() {
        let app = Router::new().route("/api/diagnoses", get(|| async { "not json" }));
        let api = HttpPatientApi::new(&spawn(app).await).expect("client");

        let err = api.fetch_diagnoses().await.expect_err("bad body");
        assert!(matches!(err, ApiError::Unexpected(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_network_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let cfg = ClientConfig::from_env_values(Some(format!("http://{addr}/api")), None, None)
            .expect("config");
        let api = HttpPatientApi::new(&cfg).expect("client");

        let err = api.fetch_patients().await.expect_err("nothing listening");
        assert!(matches!(err, ApiError::NetworkUnavailable(_)), "got {err:?}");
    }

    #[test]
    fn url_segments_are_encoded_under_base_path() {
        let cfg = ClientConfig::from_env_values(
            Some("http://localhost:3001/api/".into()),
            None,
            None,
        )
        .expect("config");
        let api = HttpPatientApi::new(&cfg).expect("client");

        let url = api.url(&["patients", "a b/c", "entries"]).expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:3001/api/patients/a%20b%2Fc/entries"
        );
    }
}
