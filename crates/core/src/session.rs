//! Session controller.
//!
//! A [`Session`] drives one browsing session against a [`PatientApi`]: it
//! loads the patient list and diagnosis catalog, opens patients, creates
//! patients and submits entries, keeping the [`PatientDirectory`] in step with
//! what the backend returns. Backend failures are logged and posted to the
//! session's [`NoticeBoard`]; they never end the session.

use crate::api::PatientApi;
use crate::config::ClientConfig;
use crate::directory::PatientDirectory;
use crate::entry::EntryWithoutId;
use crate::error::{ApiError, ApiResult, PatientorError, PatientorResult};
use crate::form::{assemble, EntryFormInput};
use crate::notice::NoticeBoard;
use crate::patient::{Patient, PatientFormValues};

pub struct Session<A> {
    api: A,
    directory: PatientDirectory,
    notices: NoticeBoard,
}

impl<A: PatientApi> Session<A> {
    pub fn new(api: A, cfg: &ClientConfig) -> Self {
        Self {
            api,
            directory: PatientDirectory::new(),
            notices: NoticeBoard::new(cfg.notice_ttl()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn directory(&self) -> &PatientDirectory {
        &self.directory
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    /// Pings the backend, then loads the patient list and diagnosis catalog.
    ///
    /// Failures are posted as notices; whatever loaded successfully is kept.
    pub async fn start(&mut self) {
        if let Err(err) = self.api.ping().await {
            tracing::debug!("ping failed: {err}");
        }
        // Failures are already on the notice board.
        let _ = self.load_patients().await;
        let _ = self.load_diagnoses().await;
    }

    pub async fn load_patients(&mut self) -> ApiResult<()> {
        match self.api.fetch_patients().await {
            Ok(patients) => {
                tracing::debug!("loaded {} patients", patients.len());
                self.directory.set_patients(patients);
                Ok(())
            }
            Err(err) => Err(self.report("fetch patients", err)),
        }
    }

    pub async fn load_diagnoses(&mut self) -> ApiResult<()> {
        match self.api.fetch_diagnoses().await {
            Ok(diagnoses) => {
                tracing::debug!("loaded {} diagnoses", diagnoses.len());
                self.directory.set_diagnoses(diagnoses);
                Ok(())
            }
            Err(err) => Err(self.report("fetch diagnoses", err)),
        }
    }

    /// Fetches a patient with entries and makes it the selected patient.
    ///
    /// A failure is logged but leaves the notice board untouched.
    pub async fn open_patient(&mut self, id: &str) -> ApiResult<&Patient> {
        match self.api.fetch_patient(id).await {
            Ok(patient) => {
                self.directory.select(patient);
                self.directory
                    .selected()
                    .ok_or_else(|| ApiError::Unexpected("selection was not stored".into()))
            }
            Err(err) => {
                tracing::error!("failed to fetch patient {id}: {err}");
                Err(err)
            }
        }
    }

    /// Creates a patient and appends it to the list.
    ///
    /// Errors are returned to the caller, which shows them next to the form.
    pub async fn add_patient(&mut self, values: &PatientFormValues) -> ApiResult<&Patient> {
        let patient = self.api.create_patient(values).await.map_err(|err| {
            tracing::error!("failed to create patient: {err}");
            err
        })?;
        tracing::info!("created patient {}", patient.id);
        self.directory.add_patient(patient);
        self.directory
            .patients()
            .last()
            .ok_or_else(|| ApiError::Unexpected("created patient was not stored".into()))
    }

    /// Assembles `input` and submits it for the selected patient.
    ///
    /// # Errors
    ///
    /// - [`PatientorError::Form`] if assembly fails; nothing is sent.
    /// - [`PatientorError::NoPatientSelected`] if no patient is open.
    /// - [`PatientorError::Api`] if the backend call fails; a notice is posted.
    pub async fn submit_entry(&mut self, input: &EntryFormInput) -> PatientorResult<&Patient> {
        let entry = assemble(input)?;
        self.submit_assembled(entry).await
    }

    /// Submits an already validated entry for the selected patient.
    pub async fn submit_assembled(&mut self, entry: EntryWithoutId) -> PatientorResult<&Patient> {
        let patient_id = self
            .directory
            .selected()
            .map(|p| p.id.clone())
            .ok_or(PatientorError::NoPatientSelected)?;

        tracing::debug!("submitting {} entry for {patient_id}", entry.kind());
        match self.api.create_entry(&patient_id, &entry).await {
            Ok(updated) => {
                tracing::info!(
                    "created {} entry for {patient_id}, now {} entries",
                    entry.kind(),
                    updated.entries.len()
                );
                self.directory.apply_patient_update(updated);
                self.directory
                    .selected()
                    .ok_or(PatientorError::NoPatientSelected)
            }
            Err(err) => Err(self.report("create entry", err).into()),
        }
    }

    fn report(&mut self, action: &str, err: ApiError) -> ApiError {
        tracing::debug!("{action} failed: {err}");
        self.notices.notify(err.user_message());
        err
    }
}
