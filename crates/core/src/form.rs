//! Entry form assembly.
//!
//! The entry form collects every field any entry kind might need, plus an
//! independently chosen `type`. [`assemble`] turns that flat input into a
//! single [`EntryWithoutId`] of the selected kind, keeping only the fields that
//! kind owns and refusing input that lacks a required field.

use crate::entry::{
    Discharge, EntryBase, EntryKind, EntryWithoutId, HealthCheckEntry, HealthCheckRating,
    HospitalEntry, OccupationalHealthcareEntry, SickLeave,
};
use crate::error::FormError;
use patientor_types::NonEmptyText;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DischargeInput {
    pub date: String,
    pub criteria: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SickLeaveInput {
    pub start_date: String,
    pub end_date: String,
}

/// Raw entry form state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryFormInput {
    /// Selected kind, as the tag name (e.g. `"Hospital"`).
    pub entry_type: String,
    pub description: String,
    pub date: String,
    pub specialist: String,
    pub diagnosis_codes: Option<Vec<String>>,
    pub health_check_rating: Option<HealthCheckRating>,
    pub discharge: DischargeInput,
    pub employer_name: String,
    pub sick_leave: SickLeaveInput,
}

/// Builds the entry described by `input`.
///
/// Partially filled sick leave (only one of the two dates) is dropped rather
/// than rejected.
///
/// # Errors
///
/// - [`FormError::InvalidVariant`] if `entry_type` is not a known kind.
/// - [`FormError::MissingRequiredField`] if the kind's required field is
///   absent or blank.
pub fn assemble(input: &EntryFormInput) -> Result<EntryWithoutId, FormError> {
    let kind: EntryKind = input.entry_type.parse()?;
    let base = EntryBase {
        description: input.description.clone(),
        date: input.date.clone(),
        specialist: input.specialist.clone(),
        diagnosis_codes: input.diagnosis_codes.clone(),
    };

    let entry = match kind {
        EntryKind::HealthCheck => {
            let health_check_rating = input
                .health_check_rating
                .ok_or_else(|| FormError::missing("healthCheckRating"))?;
            EntryWithoutId::HealthCheck(HealthCheckEntry {
                base,
                health_check_rating,
            })
        }
        EntryKind::Hospital => {
            let date = required(&input.discharge.date, "discharge.date")?;
            let criteria = required(&input.discharge.criteria, "discharge.criteria")?;
            EntryWithoutId::Hospital(HospitalEntry {
                base,
                discharge: Discharge {
                    date: date.into_inner(),
                    criteria: criteria.into_inner(),
                },
            })
        }
        EntryKind::OccupationalHealthcare => {
            let employer_name = required(&input.employer_name, "employerName")?;
            let sick_leave =
                SickLeave::from_dates(&input.sick_leave.start_date, &input.sick_leave.end_date);
            EntryWithoutId::OccupationalHealthcare(OccupationalHealthcareEntry {
                base,
                employer_name,
                sick_leave,
            })
        }
    };

    Ok(entry)
}

fn required(value: &str, field: &'static str) -> Result<NonEmptyText, FormError> {
    NonEmptyText::new(value).map_err(|_| FormError::missing(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn common(entry_type: &str) -> EntryFormInput {
        EntryFormInput {
            entry_type: entry_type.into(),
            description: "x".into(),
            date: "2024-01-01".into(),
            specialist: "Dr. A".into(),
            ..Default::default()
        }
    }

    /// An input with every variant's fields filled in.
    fn everything(entry_type: &str) -> EntryFormInput {
        EntryFormInput {
            diagnosis_codes: Some(vec!["S62.5".into()]),
            health_check_rating: Some(HealthCheckRating::LowRisk),
            discharge: DischargeInput {
                date: "2024-01-05".into(),
                criteria: "healed".into(),
            },
            employer_name: "HyPD".into(),
            sick_leave: SickLeaveInput {
                start_date: "2024-01-01".into(),
                end_date: "2024-01-10".into(),
            },
            ..common(entry_type)
        }
    }

    #[test]
    fn health_check_keeps_only_its_own_fields() {
        let entry = assemble(&everything("HealthCheck")).expect("assembles");
        let value = serde_json::to_value(&entry).expect("serialise");

        assert_eq!(
            value,
            json!({
                "type": "HealthCheck",
                "description": "x",
                "date": "2024-01-01",
                "specialist": "Dr. A",
                "diagnosisCodes": ["S62.5"],
                "healthCheckRating": 1
            })
        );
    }

    #[test]
    fn every_rating_assembles() {
        for rating in HealthCheckRating::ALL {
            let input = EntryFormInput {
                health_check_rating: Some(rating),
                ..common("HealthCheck")
            };
            let entry = assemble(&input).expect("assembles");
            assert_eq!(entry.health_check_rating(), Some(rating));
        }
    }

    #[test]
    fn health_check_without_rating_fails() {
        assert_eq!(
            assemble(&common("HealthCheck")),
            Err(FormError::MissingRequiredField {
                field: "healthCheckRating"
            })
        );
    }

    #[test]
    fn hospital_scenario() {
        let input = EntryFormInput {
            discharge: DischargeInput {
                date: "2024-01-01".into(),
                criteria: "recovered".into(),
            },
            ..common("Hospital")
        };

        let entry = assemble(&input).expect("assembles");
        assert_eq!(entry.kind(), EntryKind::Hospital);
        assert_eq!(entry.base().diagnosis_codes, None);
        assert_eq!(
            serde_json::to_value(&entry).expect("serialise"),
            json!({
                "type": "Hospital",
                "discharge": { "date": "2024-01-01", "criteria": "recovered" },
                "description": "x",
                "date": "2024-01-01",
                "specialist": "Dr. A"
            })
        );
    }

    #[test]
    fn hospital_requires_both_discharge_fields() {
        let missing_date = EntryFormInput {
            discharge: DischargeInput {
                date: String::new(),
                criteria: "recovered".into(),
            },
            ..common("Hospital")
        };
        assert_eq!(
            assemble(&missing_date),
            Err(FormError::MissingRequiredField {
                field: "discharge.date"
            })
        );

        let missing_criteria = EntryFormInput {
            discharge: DischargeInput {
                date: "2024-01-01".into(),
                criteria: "   ".into(),
            },
            ..common("Hospital")
        };
        assert_eq!(
            assemble(&missing_criteria),
            Err(FormError::MissingRequiredField {
                field: "discharge.criteria"
            })
        );
    }

    #[test]
    fn occupational_requires_employer() {
        assert_eq!(
            assemble(&common("OccupationalHealthcare")),
            Err(FormError::MissingRequiredField {
                field: "employerName"
            })
        );
    }

    #[test]
    fn occupational_drops_partial_sick_leave() {
        for sick_leave in [
            SickLeaveInput {
                start_date: "2024-01-01".into(),
                end_date: String::new(),
            },
            SickLeaveInput {
                start_date: String::new(),
                end_date: "2024-01-10".into(),
            },
        ] {
            let input = EntryFormInput {
                employer_name: "FBI".into(),
                sick_leave,
                ..common("OccupationalHealthcare")
            };
            let entry = assemble(&input).expect("assembles");
            let value = serde_json::to_value(&entry).expect("serialise");
            assert!(value.get("sickLeave").is_none(), "got {value}");
        }
    }

    #[test]
    fn occupational_keeps_complete_sick_leave_and_no_foreign_fields() {
        let entry = assemble(&everything("OccupationalHealthcare")).expect("assembles");
        let value = serde_json::to_value(&entry).expect("serialise");

        assert_eq!(value["employerName"], "HyPD");
        assert_eq!(
            value["sickLeave"],
            json!({ "startDate": "2024-01-01", "endDate": "2024-01-10" })
        );
        assert!(value.get("discharge").is_none());
        assert!(value.get("healthCheckRating").is_none());
    }

    #[test]
    fn unknown_type_is_invalid_variant() {
        assert_eq!(
            assemble(&everything("Dental")),
            Err(FormError::InvalidVariant("Dental".into()))
        );
        assert_eq!(
            assemble(&everything("")),
            Err(FormError::InvalidVariant(String::new()))
        );
    }

    #[test]
    fn assembled_entries_pass_the_shape_contract() {
        for kind in EntryKind::ALL {
            let entry = assemble(&everything(kind.as_str())).expect("assembles");
            let value = serde_json::to_value(&entry).expect("serialise");
            let checked = EntryWithoutId::from_value(value).expect("well formed");
            assert_eq!(checked, entry);
        }
    }
}
