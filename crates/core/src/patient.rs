//! Patient records and the values used to create them.

use crate::entry::Entry;
use crate::error::FormError;
use patientor_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(FormError::InvalidGender(s.to_string())),
        }
    }
}

/// A patient as returned by the backend.
///
/// The list endpoint may omit `entries`; they then decode as empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub occupation: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Values submitted to create a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFormValues {
    pub name: String,
    pub occupation: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

impl PatientFormValues {
    /// Builds form values from raw input.
    ///
    /// Blank optional fields are dropped rather than sent as empty strings.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingRequiredField`] when `name` or `occupation`
    /// is blank, and [`FormError::InvalidGender`] for an unknown gender.
    pub fn new(
        name: &str,
        occupation: &str,
        gender: &str,
        ssn: Option<&str>,
        date_of_birth: Option<&str>,
    ) -> Result<Self, FormError> {
        let name = NonEmptyText::new(name).map_err(|_| FormError::missing("name"))?;
        let occupation =
            NonEmptyText::new(occupation).map_err(|_| FormError::missing("occupation"))?;
        let gender = gender.parse()?;

        let optional = |value: Option<&str>| {
            value
                .and_then(NonEmptyText::optional)
                .map(NonEmptyText::into_inner)
        };

        Ok(Self {
            name: name.into_inner(),
            occupation: occupation.into_inner(),
            gender,
            ssn: optional(ssn),
            date_of_birth: optional(date_of_birth),
        })
    }
}
