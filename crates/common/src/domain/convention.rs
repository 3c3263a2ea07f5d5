use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::representative::non_blank;
use crate::domain::{Association, ContentQuery, DomainResult, Field, Filterable};

/// Partner convention (discount or agreement) offered to members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Convention {
    pub id: String,
    pub name: String,
    pub description: String,
    pub discount: Option<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub association: Option<Association>,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Convention {
    pub fn data(&self) -> ConventionData {
        ConventionData {
            name: self.name.clone(),
            description: self.description.clone(),
            discount: self.discount.clone(),
            website_url: self.website_url.clone(),
            image_url: self.image_url.clone(),
            association: self.association,
            published: self.published,
        }
    }
}

impl Filterable for Convention {
    fn field_value(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Id => Some(Cow::Borrowed(&self.id)),
            Field::Name => Some(Cow::Borrowed(&self.name)),
            Field::Association => self.association.map(|a| Cow::Borrowed(a.as_str())),
            Field::Published => Some(Cow::Borrowed(if self.published { "true" } else { "false" })),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionData {
    pub name: String,
    pub description: String,
    pub discount: Option<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub association: Option<Association>,
    pub published: bool,
}

impl ConventionData {
    pub fn normalized(mut self) -> Self {
        self.discount = non_blank(self.discount);
        self.website_url = non_blank(self.website_url);
        self.image_url = non_blank(self.image_url);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateConventionRepoInput {
    pub id: String,
    pub data: ConventionData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetConventionRepoInput {
    pub convention_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConventionRepoInput {
    pub convention_id: String,
    pub data: ConventionData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConventionRepoInput {
    pub convention_id: String,
}

/// Repository trait for convention storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ConventionRepository: Send + Sync {
    async fn create_convention(&self, input: CreateConventionRepoInput) -> DomainResult<Convention>;

    async fn get_convention(&self, input: GetConventionRepoInput)
        -> DomainResult<Option<Convention>>;

    async fn update_convention(&self, input: UpdateConventionRepoInput) -> DomainResult<Convention>;

    async fn delete_convention(&self, input: DeleteConventionRepoInput) -> DomainResult<()>;

    async fn list_conventions(&self, query: ContentQuery) -> DomainResult<Vec<Convention>>;
}
