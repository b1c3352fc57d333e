//! # Patientor Core
//!
//! Core domain logic for the Patientor patient-record client.
//!
//! This crate contains the typed model and the pure operations on it:
//! - the medical entry union and its field contract ([`entry`])
//! - assembly of entries from flat form input ([`form`])
//! - the in-session patient and diagnosis aggregate ([`directory`])
//! - the session controller and time-limited notices ([`session`], [`notice`])
//!
//! **No transport concerns**: the backend is reached through the [`PatientApi`]
//! trait. The HTTP implementation belongs in `patientor-api-client`.

pub mod api;
pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod directory;
pub mod entry;
pub mod error;
pub mod form;
pub mod notice;
pub mod patient;
pub mod session;

pub use api::PatientApi;
pub use config::ClientConfig;
pub use diagnosis::{Diagnosis, DiagnosisCatalog};
pub use directory::{most_recent_health_check_rating, PatientDirectory};
pub use entry::{
    Discharge, Entry, EntryBase, EntryKind, EntryWithoutId, HealthCheckEntry, HealthCheckRating,
    HospitalEntry, OccupationalHealthcareEntry, SickLeave,
};
pub use error::{
    ApiError, ApiResult, EntryShapeError, FormError, PatientorError, PatientorResult,
};
pub use form::{assemble, DischargeInput, EntryFormInput, SickLeaveInput};
pub use notice::{Notice, NoticeBoard};
pub use patient::{Gender, Patient, PatientFormValues};
pub use session::Session;

pub use patientor_types::NonEmptyText;
