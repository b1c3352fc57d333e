//! Plain-text rendering of patients, entries and diagnoses.

use patientor_core::{
    most_recent_health_check_rating, Diagnosis, DiagnosisCatalog, Entry, EntryWithoutId,
    HealthCheckRating, Patient,
};
use std::fmt;

/// Colour of the heart shown next to a health check rating.
pub fn health_colour(rating: HealthCheckRating) -> &'static str {
    match rating {
        HealthCheckRating::Healthy => "green",
        HealthCheckRating::LowRisk => "blue",
        HealthCheckRating::HighRisk => "yellow",
        HealthCheckRating::CriticalRisk => "red",
    }
}

/// One line of the patient list.
pub fn patient_row(patient: &Patient) -> String {
    let rating = most_recent_health_check_rating(&patient.entries)
        .map(|r| format!("{} ({})", r.label(), health_colour(r)))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {}  {}  {}  rating: {}",
        patient.id, patient.name, patient.gender, patient.occupation, rating
    )
}

pub fn diagnosis_line(diagnosis: &Diagnosis) -> String {
    match &diagnosis.latin {
        Some(latin) => format!("{} | {} ({latin})", diagnosis.code, diagnosis.name),
        None => format!("{} | {}", diagnosis.code, diagnosis.name),
    }
}

/// Diagnosis block for an entry; codes missing from the catalog are skipped.
fn write_diagnoses(
    f: &mut fmt::Formatter<'_>,
    codes: &[String],
    catalog: &DiagnosisCatalog,
) -> fmt::Result {
    if codes.is_empty() {
        return Ok(());
    }
    writeln!(f, "  Diagnosis")?;
    for diagnosis in catalog.resolve(codes) {
        writeln!(f, "    {}", diagnosis_line(diagnosis))?;
    }
    Ok(())
}

struct EntryDetails<'a> {
    entry: &'a Entry,
    catalog: &'a DiagnosisCatalog,
}

impl fmt::Display for EntryDetails<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.entry.base();
        let codes = self.entry.without_id().diagnosis_codes();

        match self.entry.without_id() {
            EntryWithoutId::HealthCheck(check) => {
                writeln!(f, "{} [health check]", base.date)?;
                writeln!(f, "  {}", base.description)?;
                write_diagnoses(f, codes, self.catalog)?;
                let rating = check.health_check_rating;
                writeln!(f, "  Health: {} ({})", rating.label(), health_colour(rating))?;
            }
            EntryWithoutId::OccupationalHealthcare(occupational) => {
                writeln!(f, "{} [occupational] {}", base.date, occupational.employer_name)?;
                writeln!(f, "  {}", base.description)?;
                write_diagnoses(f, codes, self.catalog)?;
                if let Some(leave) = &occupational.sick_leave {
                    writeln!(f, "  Sick leave: {} - {}", leave.start_date, leave.end_date)?;
                }
            }
            EntryWithoutId::Hospital(hospital) => {
                writeln!(f, "{} [hospital]", base.date)?;
                writeln!(f, "  {}", base.description)?;
                write_diagnoses(f, codes, self.catalog)?;
                writeln!(
                    f,
                    "  Discharge: {} {}",
                    hospital.discharge.date, hospital.discharge.criteria
                )?;
            }
        }

        writeln!(f, "  Diagnose by: {}", base.specialist)
    }
}

struct PatientDetails<'a> {
    patient: &'a Patient,
    catalog: &'a DiagnosisCatalog,
}

impl fmt::Display for PatientDetails<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patient = self.patient;
        writeln!(f, "{} ({})", patient.name, patient.gender)?;
        if let Some(ssn) = &patient.ssn {
            writeln!(f, "ssn: {ssn}")?;
        }
        if let Some(dob) = &patient.date_of_birth {
            writeln!(f, "date of birth: {dob}")?;
        }
        writeln!(f, "occupation: {}", patient.occupation)?;
        writeln!(f)?;
        writeln!(f, "Entries")?;

        if patient.entries.is_empty() {
            return writeln!(f, "No entries available");
        }
        for entry in patient.entries.iter().rev() {
            let details = EntryDetails {
                entry,
                catalog: self.catalog,
            };
            write!(f, "\n{details}")?;
        }
        Ok(())
    }
}

pub fn entry_details(entry: &Entry, catalog: &DiagnosisCatalog) -> String {
    EntryDetails { entry, catalog }.to_string()
}

/// Patient detail view, entries most recent first.
pub fn patient_details(patient: &Patient, catalog: &DiagnosisCatalog) -> String {
    PatientDetails { patient, catalog }.to_string()
}
