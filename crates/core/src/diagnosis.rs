//! Diagnosis reference data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A coded clinical condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latin: Option<String>,
}

/// Read-only catalog of diagnoses keyed by code.
///
/// Iteration follows the order the catalog was loaded in. When a code appears
/// more than once the first occurrence wins.
#[derive(Clone, Debug, Default)]
pub struct DiagnosisCatalog {
    diagnoses: Vec<Diagnosis>,
    by_code: HashMap<String, usize>,
}

impl DiagnosisCatalog {
    pub fn new(diagnoses: Vec<Diagnosis>) -> Self {
        let mut catalog = Self::default();
        for diagnosis in diagnoses {
            if catalog.by_code.contains_key(&diagnosis.code) {
                tracing::warn!("duplicate diagnosis code ignored: {}", diagnosis.code);
                continue;
            }
            catalog
                .by_code
                .insert(diagnosis.code.clone(), catalog.diagnoses.len());
            catalog.diagnoses.push(diagnosis);
        }
        catalog
    }

    pub fn get(&self, code: &str) -> Option<&Diagnosis> {
        self.by_code.get(code).map(|&idx| &self.diagnoses[idx])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Looks up each code in order, skipping codes the catalog does not know.
    pub fn resolve<'a, I, S>(&'a self, codes: I) -> Vec<&'a Diagnosis>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .filter_map(|code| self.get(code.as_ref()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnosis> {
        self.diagnoses.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnoses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnoses.is_empty()
    }
}
