//! Medical entry model.
//!
//! An entry is a tagged union over three kinds of clinical record. All kinds
//! share the fields in [`EntryBase`]; each adds its own required data:
//!
//! - `HealthCheck`: a [`HealthCheckRating`]
//! - `Hospital`: a [`Discharge`] with date and criteria
//! - `OccupationalHealthcare`: an employer name and an optional [`SickLeave`]
//!
//! On the wire the kind is carried in a `type` field and all other fields use
//! camelCase names. [`EntryWithoutId`] is the shape submitted for creation;
//! [`Entry`] is the persisted shape with its backend-assigned identifier.

use crate::error::{EntryShapeError, FormError};
use patientor_types::NonEmptyText;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Wire fields every entry kind may carry, including the tag itself.
const COMMON_FIELDS: &[&str] = &["type", "description", "date", "specialist", "diagnosisCodes"];

/// Nested objects of a candidate entry and the keys each must carry.
const NESTED_FIELDS: &[(&str, &[&str])] = &[
    ("discharge", &["date", "criteria"]),
    ("sickLeave", &["startDate", "endDate"]),
];

// ============================================================================
// Entry kind
// ============================================================================

/// Discriminant of the entry union.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    HealthCheck,
    Hospital,
    OccupationalHealthcare,
}

impl EntryKind {
    pub const ALL: [EntryKind; 3] = [
        EntryKind::HealthCheck,
        EntryKind::Hospital,
        EntryKind::OccupationalHealthcare,
    ];

    /// The tag as it appears in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::HealthCheck => "HealthCheck",
            EntryKind::Hospital => "Hospital",
            EntryKind::OccupationalHealthcare => "OccupationalHealthcare",
        }
    }

    /// Wire fields only this kind may carry.
    fn variant_fields(self) -> &'static [&'static str] {
        match self {
            EntryKind::HealthCheck => &["healthCheckRating"],
            EntryKind::Hospital => &["discharge"],
            EntryKind::OccupationalHealthcare => &["employerName", "sickLeave"],
        }
    }

    fn allows_field(self, field: &str) -> bool {
        COMMON_FIELDS.contains(&field) || self.variant_fields().contains(&field)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = FormError;

    /// Parses the exact tag name; anything else is an invalid variant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FormError::InvalidVariant(s.to_string()))
    }
}

// ============================================================================
// Health check rating
// ============================================================================

/// Risk rating recorded by a health check, serialised as its integer value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthCheckRating {
    Healthy = 0,
    LowRisk = 1,
    HighRisk = 2,
    CriticalRisk = 3,
}

impl HealthCheckRating {
    pub const ALL: [HealthCheckRating; 4] = [
        HealthCheckRating::Healthy,
        HealthCheckRating::LowRisk,
        HealthCheckRating::HighRisk,
        HealthCheckRating::CriticalRisk,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            HealthCheckRating::Healthy => "Healthy",
            HealthCheckRating::LowRisk => "LowRisk",
            HealthCheckRating::HighRisk => "HighRisk",
            HealthCheckRating::CriticalRisk => "CriticalRisk",
        }
    }

    /// Human-readable label, e.g. "Low Risk".
    pub fn label(self) -> &'static str {
        match self {
            HealthCheckRating::Healthy => "Healthy",
            HealthCheckRating::LowRisk => "Low Risk",
            HealthCheckRating::HighRisk => "High Risk",
            HealthCheckRating::CriticalRisk => "Critical Risk",
        }
    }
}

impl TryFrom<u8> for HealthCheckRating {
    type Error = FormError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        HealthCheckRating::ALL
            .into_iter()
            .find(|rating| rating.value() == value)
            .ok_or_else(|| FormError::InvalidRating(value.to_string()))
    }
}

impl FromStr for HealthCheckRating {
    type Err = FormError;

    /// Accepts the integer value, the variant name or the label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return HealthCheckRating::try_from(value);
        }
        HealthCheckRating::ALL
            .into_iter()
            .find(|rating| {
                rating.name().eq_ignore_ascii_case(trimmed)
                    || rating.label().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| FormError::InvalidRating(s.to_string()))
    }
}

impl Serialize for HealthCheckRating {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for HealthCheckRating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        HealthCheckRating::try_from(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Entry payloads
// ============================================================================

/// Fields shared by every entry kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryBase {
    pub description: String,
    pub date: String,
    pub specialist: String,
    /// Codes into the diagnosis catalog. Not checked against the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
}

/// Hospital discharge.
///
/// Records already stored by the backend may hold blank values, so these are
/// plain strings. New entries get non-blank values from [`crate::assemble`] or
/// [`EntryWithoutId::from_value`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discharge {
    pub date: String,
    pub criteria: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SickLeave {
    pub start_date: NonEmptyText,
    pub end_date: NonEmptyText,
}

impl SickLeave {
    /// A sick leave period, or `None` unless both dates are non-blank.
    pub fn from_dates(start_date: &str, end_date: &str) -> Option<Self> {
        Some(Self {
            start_date: NonEmptyText::optional(start_date)?,
            end_date: NonEmptyText::optional(end_date)?,
        })
    }
}

/// Decodes `sickLeave`, treating a blank or half-filled pair as absent.
fn lenient_sick_leave<'de, D>(deserializer: D) -> Result<Option<SickLeave>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawSickLeave {
        #[serde(default)]
        start_date: Option<String>,
        #[serde(default)]
        end_date: Option<String>,
    }

    let raw = Option::<RawSickLeave>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        SickLeave::from_dates(
            raw.start_date.as_deref().unwrap_or_default(),
            raw.end_date.as_deref().unwrap_or_default(),
        )
    }))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckEntry {
    #[serde(flatten)]
    pub base: EntryBase,
    pub health_check_rating: HealthCheckRating,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalEntry {
    #[serde(flatten)]
    pub base: EntryBase,
    pub discharge: Discharge,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupationalHealthcareEntry {
    #[serde(flatten)]
    pub base: EntryBase,
    pub employer_name: NonEmptyText,
    #[serde(
        default,
        deserialize_with = "lenient_sick_leave",
        skip_serializing_if = "Option::is_none"
    )]
    pub sick_leave: Option<SickLeave>,
}

// ============================================================================
// Entry union
// ============================================================================

/// An entry that has not been persisted yet and so carries no identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntryWithoutId {
    HealthCheck(HealthCheckEntry),
    Hospital(HospitalEntry),
    OccupationalHealthcare(OccupationalHealthcareEntry),
}

impl EntryWithoutId {
    /// Validates a candidate JSON value against the field contract of its tag.
    ///
    /// The value must be an object whose `type` names a known kind, must only
    /// contain the common fields plus that kind's own fields (no `id`, nothing
    /// belonging to another kind), and must have every required field with the
    /// right type.
    ///
    /// # Errors
    ///
    /// Returns an [`EntryShapeError`] describing the first violation found.
    pub fn from_value(value: Value) -> Result<Self, EntryShapeError> {
        {
            let object = value.as_object().ok_or(EntryShapeError::NotAnObject)?;
            let tag = object
                .get("type")
                .and_then(Value::as_str)
                .ok_or(EntryShapeError::MissingTag)?;
            let kind: EntryKind = tag
                .parse()
                .map_err(|_| EntryShapeError::UnknownVariant(tag.to_string()))?;

            if let Some(field) = object.keys().find(|key| !kind.allows_field(key)) {
                return Err(EntryShapeError::DisallowedField {
                    kind: kind.as_str(),
                    field: field.clone(),
                });
            }
            check_nested(kind, object)?;
        }

        serde_path_to_error::deserialize::<_, EntryWithoutId>(value).map_err(|err| {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            EntryShapeError::Malformed {
                path,
                message: err.into_inner().to_string(),
            }
        })
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            EntryWithoutId::HealthCheck(_) => EntryKind::HealthCheck,
            EntryWithoutId::Hospital(_) => EntryKind::Hospital,
            EntryWithoutId::OccupationalHealthcare(_) => EntryKind::OccupationalHealthcare,
        }
    }

    pub fn base(&self) -> &EntryBase {
        match self {
            EntryWithoutId::HealthCheck(entry) => &entry.base,
            EntryWithoutId::Hospital(entry) => &entry.base,
            EntryWithoutId::OccupationalHealthcare(entry) => &entry.base,
        }
    }

    /// Diagnosis codes, or an empty slice when none were given.
    pub fn diagnosis_codes(&self) -> &[String] {
        self.base().diagnosis_codes.as_deref().unwrap_or_default()
    }

    pub fn health_check_rating(&self) -> Option<HealthCheckRating> {
        match self {
            EntryWithoutId::HealthCheck(entry) => Some(entry.health_check_rating),
            _ => None,
        }
    }

    /// Attaches the identifier assigned on creation.
    pub fn into_entry(self, id: impl Into<String>) -> Entry {
        Entry {
            id: id.into(),
            details: self,
        }
    }
}

/// Applies the candidate contract to nested objects: no foreign keys, and
/// every key present with non-blank text. Type mismatches are left to
/// deserialisation.
fn check_nested(kind: EntryKind, object: &Map<String, Value>) -> Result<(), EntryShapeError> {
    for (field, keys) in NESTED_FIELDS {
        let Some(nested) = object.get(*field).and_then(Value::as_object) else {
            continue;
        };
        if let Some(key) = nested.keys().find(|key| !keys.contains(&key.as_str())) {
            return Err(EntryShapeError::DisallowedField {
                kind: kind.as_str(),
                field: format!("{field}.{key}"),
            });
        }
        for key in *keys {
            let message = match nested.get(*key) {
                None => format!("missing field `{key}`"),
                Some(Value::String(text)) if text.trim().is_empty() => {
                    "text cannot be empty".to_string()
                }
                Some(_) => continue,
            };
            return Err(EntryShapeError::Malformed {
                path: format!("{field}.{key}"),
                message,
            });
        }
    }
    Ok(())
}

/// A persisted entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(flatten)]
    pub details: EntryWithoutId,
}

impl Entry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntryKind {
        self.details.kind()
    }

    pub fn base(&self) -> &EntryBase {
        self.details.base()
    }

    pub fn without_id(&self) -> &EntryWithoutId {
        &self.details
    }

    pub fn health_check_rating(&self) -> Option<HealthCheckRating> {
        self.details.health_check_rating()
    }
}
