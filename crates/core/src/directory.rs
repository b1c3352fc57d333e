//! In-session patient and diagnosis aggregate.
//!
//! Holds the snapshots fetched when a session starts: the patient list, the
//! diagnosis catalog and the patient currently being viewed. Apart from
//! appending newly created patients and entries, the snapshots are read-only.

use crate::diagnosis::{Diagnosis, DiagnosisCatalog};
use crate::entry::{Entry, HealthCheckRating};
use crate::error::{PatientorError, PatientorResult};
use crate::patient::Patient;

/// Rating of the last health check in `entries`, in stored order.
///
/// Returns `None` when there are no health check entries.
pub fn most_recent_health_check_rating(entries: &[Entry]) -> Option<HealthCheckRating> {
    entries
        .iter()
        .rev()
        .find_map(|entry| entry.health_check_rating())
}

#[derive(Clone, Debug, Default)]
pub struct PatientDirectory {
    patients: Vec<Patient>,
    diagnoses: DiagnosisCatalog,
    selected: Option<Patient>,
}

impl PatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_patients(&mut self, patients: Vec<Patient>) {
        self.patients = patients;
    }

    pub fn set_diagnoses(&mut self, diagnoses: Vec<Diagnosis>) {
        self.diagnoses = DiagnosisCatalog::new(diagnoses);
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn diagnoses(&self) -> &DiagnosisCatalog {
        &self.diagnoses
    }

    pub fn diagnosis(&self, code: &str) -> Option<&Diagnosis> {
        self.diagnoses.get(code)
    }

    pub fn selected(&self) -> Option<&Patient> {
        self.selected.as_ref()
    }

    /// Makes `patient` the patient being viewed.
    pub fn select(&mut self, patient: Patient) {
        self.selected = Some(patient);
    }

    /// Appends a newly created patient to the list.
    pub fn add_patient(&mut self, patient: Patient) {
        self.patients.push(patient);
    }

    /// Appends a persisted entry to a patient's entries.
    ///
    /// Both the list copy and the selected copy (if it is the same patient)
    /// are updated. Existing entries keep their order.
    ///
    /// # Errors
    ///
    /// Returns [`PatientorError::UnknownPatient`] if neither the list nor the
    /// selection holds a patient with `patient_id`.
    pub fn append_entry(&mut self, patient_id: &str, entry: Entry) -> PatientorResult<()> {
        let mut found = false;

        if let Some(selected) = self.selected.as_mut().filter(|p| p.id == patient_id) {
            selected.entries.push(entry.clone());
            found = true;
        }
        if let Some(listed) = self.patients.iter_mut().find(|p| p.id == patient_id) {
            listed.entries.push(entry);
            found = true;
        }

        if found {
            Ok(())
        } else {
            Err(PatientorError::UnknownPatient(patient_id.to_string()))
        }
    }

    /// Applies a patient returned by the backend after an entry was created.
    ///
    /// The selection is replaced when it has the same id, and the list patient
    /// with the same id takes over the returned entries. Nothing else changes.
    pub fn apply_patient_update(&mut self, updated: Patient) {
        if let Some(listed) = self.patients.iter_mut().find(|p| p.id == updated.id) {
            listed.entries = updated.entries.clone();
        }
        if self.selected.as_ref().is_some_and(|p| p.id == updated.id) {
            self.selected = Some(updated);
        }
    }
}
