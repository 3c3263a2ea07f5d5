use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Association, ContentQuery, DomainError, DomainResult, Field, Filterable};

/// Body a representative sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepresentativeCategory {
    Central,
    National,
    Department,
}

impl RepresentativeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepresentativeCategory::Central => "CENTRAL",
            RepresentativeCategory::National => "NATIONAL",
            RepresentativeCategory::Department => "DEPARTMENT",
        }
    }

    /// Central and national seats are never tied to a department.
    pub fn allows_department(&self) -> bool {
        matches!(self, RepresentativeCategory::Department)
    }
}

impl FromStr for RepresentativeCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CENTRAL" => Ok(RepresentativeCategory::Central),
            "NATIONAL" => Ok(RepresentativeCategory::National),
            "DEPARTMENT" => Ok(RepresentativeCategory::Department),
            other => Err(DomainError::ValidationError(format!(
                "unknown representative category: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for RepresentativeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representative domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Representative {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub category: RepresentativeCategory,
    pub department: Option<String>,
    pub list_name: Option<String>,
    pub association: Option<Association>,
    pub position: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Representative {
    /// Editable fields of this record, used when duplicating.
    pub fn data(&self) -> RepresentativeData {
        RepresentativeData {
            name: self.name.clone(),
            surname: self.surname.clone(),
            email: self.email.clone(),
            category: self.category,
            department: self.department.clone(),
            list_name: self.list_name.clone(),
            association: self.association,
            position: self.position.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

impl Filterable for Representative {
    fn field_value(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Id => Some(Cow::Borrowed(&self.id)),
            Field::Name => Some(Cow::Borrowed(&self.name)),
            Field::Surname => Some(Cow::Borrowed(&self.surname)),
            Field::Email => self.email.as_deref().map(Cow::Borrowed),
            Field::Department => self.department.as_deref().map(Cow::Borrowed),
            Field::Association => self.association.map(|a| Cow::Borrowed(a.as_str())),
            Field::Category => Some(Cow::Borrowed(self.category.as_str())),
            Field::ListName => self.list_name.as_deref().map(Cow::Borrowed),
            Field::Title | Field::Published => None,
        }
    }
}

/// Editable representative fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeData {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub category: RepresentativeCategory,
    pub department: Option<String>,
    pub list_name: Option<String>,
    pub association: Option<Association>,
    pub position: Option<String>,
    pub image_url: Option<String>,
}

impl RepresentativeData {
    /// Blank optionals become `None` and the department is cleared for
    /// categories that cannot carry one.
    pub fn normalized(mut self) -> Self {
        self.email = non_blank(self.email);
        self.list_name = non_blank(self.list_name);
        self.position = non_blank(self.position);
        self.image_url = non_blank(self.image_url);
        self.department = if self.category.allows_department() {
            non_blank(self.department)
        } else {
            None
        };
        self
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepresentativeRepoInput {
    pub id: String,
    pub data: RepresentativeData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRepresentativeRepoInput {
    pub representative_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRepresentativeRepoInput {
    pub representative_id: String,
    pub data: RepresentativeData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRepresentativeRepoInput {
    pub representative_id: String,
}

/// Repository trait for representative storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RepresentativeRepository: Send + Sync {
    async fn create_representative(
        &self,
        input: CreateRepresentativeRepoInput,
    ) -> DomainResult<Representative>;

    async fn get_representative(
        &self,
        input: GetRepresentativeRepoInput,
    ) -> DomainResult<Option<Representative>>;

    async fn update_representative(
        &self,
        input: UpdateRepresentativeRepoInput,
    ) -> DomainResult<Representative>;

    async fn delete_representative(&self, input: DeleteRepresentativeRepoInput)
        -> DomainResult<()>;

    async fn list_representatives(&self, query: ContentQuery) -> DomainResult<Vec<Representative>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(category: RepresentativeCategory, department: Option<&str>) -> RepresentativeData {
        RepresentativeData {
            name: "Giulia".to_string(),
            surname: "Rossi".to_string(),
            email: Some("  ".to_string()),
            category,
            department: department.map(str::to_string),
            list_name: None,
            association: Some(Association::Unimhealth),
            position: None,
            image_url: None,
        }
    }

    #[test]
    fn test_central_and_national_drop_department() {
        for category in [
            RepresentativeCategory::Central,
            RepresentativeCategory::National,
        ] {
            let normalized = data(category, Some("DIMED")).normalized();
            assert_eq!(normalized.department, None);
        }
    }

    #[test]
    fn test_department_category_keeps_trimmed_department() {
        let normalized = data(RepresentativeCategory::Department, Some(" DIMED ")).normalized();
        assert_eq!(normalized.department.as_deref(), Some("DIMED"));
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let normalized = data(RepresentativeCategory::Department, Some("")).normalized();
        assert_eq!(normalized.email, None);
        assert_eq!(normalized.department, None);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "national".parse::<RepresentativeCategory>().unwrap(),
            RepresentativeCategory::National
        );
        assert!("senate".parse::<RepresentativeCategory>().is_err());
    }
}
