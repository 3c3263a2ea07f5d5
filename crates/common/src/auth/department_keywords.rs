use std::collections::HashMap;

use crate::domain::{Association, DomainError, DomainResult};

/// Association -> lowercase keyword substrings identifying its departments.
///
/// Matching is a plain case-insensitive substring test against the free-text
/// department, so a keyword like "biomorf" also matches "Biomorfismo".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentKeywordMap {
    entries: HashMap<Association, Vec<String>>,
}

impl DepartmentKeywordMap {
    /// An empty map: every network admin falls back to association matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table shipped with the service.
    pub fn builtin() -> Self {
        Self::new()
            .with_keywords(Association::Unimhealth, ["patologia", "dimed", "biomorf"])
            .with_keywords(Association::InsideDicam, ["dicam"])
    }

    /// Parse an override such as `{"UNIMHEALTH": ["Patologia", "DIMED"]}`.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let raw: HashMap<Association, Vec<String>> = serde_json::from_str(json).map_err(|e| {
            DomainError::ValidationError(format!("invalid department keyword map: {}", e))
        })?;

        Ok(raw
            .into_iter()
            .fold(Self::new(), |map, (association, keywords)| {
                map.with_keywords(association, keywords)
            }))
    }

    /// Replace the keywords of an association.
    ///
    /// Keywords are trimmed and lowercased; blanks are dropped.
    pub fn with_keywords<I, S>(mut self, association: Association, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if normalized.is_empty() {
            self.entries.remove(&association);
        } else {
            self.entries.insert(association, normalized);
        }
        self
    }

    pub fn keywords_for(&self, association: Association) -> &[String] {
        self.entries
            .get(&association)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_keywords(&self, association: Association) -> bool {
        !self.keywords_for(association).is_empty()
    }

    /// Whether `department` textually belongs to `association`.
    ///
    /// A missing or empty department never matches.
    pub fn matches_department(&self, association: Association, department: Option<&str>) -> bool {
        let Some(department) = department.filter(|d| !d.trim().is_empty()) else {
            return false;
        };
        let department = department.to_lowercase();
        self.keywords_for(association)
            .iter()
            .any(|keyword| department.contains(keyword.as_str()))
    }
}
