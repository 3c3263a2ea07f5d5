use std::sync::Arc;

use common::auth::{
    build_public_filter, build_visibility_filter, require_admin, AccessPolicy, ListingFilters,
};
use common::domain::{
    Actor, ContentKind, Convention, ConventionData, ConventionRepository,
    CreateConventionRepoInput, DeleteConventionRepoInput, DomainError, DomainResult,
    GetConventionRepoInput, UpdateConventionRepoInput,
};
use common::garde::{known_association, not_blank};
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::domain::parsing::parse_association;
use crate::domain::COPY_SUFFIX;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConventionFields {
    #[garde(length(max = 150), custom(not_blank))]
    pub name: String,
    #[garde(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    #[garde(length(max = 100))]
    #[serde(default)]
    pub discount: Option<String>,
    #[garde(length(max = 2048))]
    #[serde(default)]
    pub website_url: Option<String>,
    #[garde(length(max = 2048))]
    #[serde(default)]
    pub image_url: Option<String>,
    #[garde(custom(known_association))]
    #[serde(default)]
    pub association: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub published: bool,
}

impl ConventionFields {
    fn into_data(self) -> DomainResult<ConventionData> {
        Ok(ConventionData {
            name: self.name.trim().to_string(),
            description: self.description,
            discount: self.discount,
            website_url: self.website_url,
            image_url: self.image_url,
            association: parse_association(self.association.as_deref())?,
            published: self.published,
        }
        .normalized())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateConventionRequest {
    #[garde(dive)]
    pub fields: ConventionFields,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateConventionRequest {
    #[garde(length(min = 1))]
    pub convention_id: String,
    #[garde(dive)]
    pub fields: ConventionFields,
}

#[derive(Debug, Clone, Validate)]
pub struct ConventionIdRequest {
    #[garde(length(min = 1))]
    pub convention_id: String,
}

/// Domain service for partner conventions. Conventions carry no department,
/// so write access follows the association alone.
pub struct ConventionService {
    convention_repository: Arc<dyn ConventionRepository>,
    policy: Arc<AccessPolicy>,
}

impl ConventionService {
    pub fn new(
        convention_repository: Arc<dyn ConventionRepository>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            convention_repository,
            policy,
        }
    }

    async fn load(&self, convention_id: &str) -> DomainResult<Convention> {
        self.convention_repository
            .get_convention(GetConventionRepoInput {
                convention_id: convention_id.to_string(),
            })
            .await?
            .ok_or_else(|| DomainError::ConventionNotFound(convention_id.to_string()))
    }

    fn require_mutation(&self, actor: Option<&Actor>, data: &ConventionData) -> DomainResult<()> {
        self.policy
            .require_mutation(actor, data.association, None, "this convention")
    }

    #[instrument(skip(self, actor, request), fields(name = %request.fields.name))]
    pub async fn create_convention(
        &self,
        actor: Option<&Actor>,
        request: CreateConventionRequest,
    ) -> DomainResult<Convention> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        self.require_mutation(actor, &data)?;

        let convention = self
            .convention_repository
            .create_convention(CreateConventionRepoInput {
                id: xid::new().to_string(),
                data,
            })
            .await?;

        info!(convention_id = %convention.id, "convention created");
        Ok(convention)
    }

    #[instrument(skip(self, actor, request), fields(convention_id = %request.convention_id))]
    pub async fn update_convention(
        &self,
        actor: Option<&Actor>,
        request: UpdateConventionRequest,
    ) -> DomainResult<Convention> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        let existing = self.load(&request.convention_id).await?;
        self.require_mutation(actor, &existing.data())?;
        self.require_mutation(actor, &data)?;

        let convention = self
            .convention_repository
            .update_convention(UpdateConventionRepoInput {
                convention_id: existing.id,
                data,
            })
            .await?;

        debug!(convention_id = %convention.id, "convention updated");
        Ok(convention)
    }

    #[instrument(skip(self, actor, request), fields(convention_id = %request.convention_id))]
    pub async fn delete_convention(
        &self,
        actor: Option<&Actor>,
        request: ConventionIdRequest,
    ) -> DomainResult<()> {
        common::garde::validate_struct(&request)?;

        let existing = self.load(&request.convention_id).await?;
        self.require_mutation(actor, &existing.data())?;

        self.convention_repository
            .delete_convention(DeleteConventionRepoInput {
                convention_id: existing.id,
            })
            .await?;

        info!(convention_id = %request.convention_id, "convention deleted");
        Ok(())
    }

    #[instrument(skip(self, actor, request), fields(convention_id = %request.convention_id))]
    pub async fn duplicate_convention(
        &self,
        actor: Option<&Actor>,
        request: ConventionIdRequest,
    ) -> DomainResult<Convention> {
        common::garde::validate_struct(&request)?;

        let existing = self.load(&request.convention_id).await?;
        let mut data = existing.data();
        self.require_mutation(actor, &data)?;
        data.name.push_str(COPY_SUFFIX);

        let copy = self
            .convention_repository
            .create_convention(CreateConventionRepoInput {
                id: xid::new().to_string(),
                data,
            })
            .await?;

        debug!(source_id = %existing.id, copy_id = %copy.id, "convention duplicated");
        Ok(copy)
    }

    /// Drafts are only visible to admins
    #[instrument(skip(self, actor, request), fields(convention_id = %request.convention_id))]
    pub async fn get_convention(
        &self,
        actor: Option<&Actor>,
        request: ConventionIdRequest,
    ) -> DomainResult<Convention> {
        common::garde::validate_struct(&request)?;

        let convention = self.load(&request.convention_id).await?;
        if !convention.published && !actor.is_some_and(Actor::is_admin) {
            return Err(DomainError::ConventionNotFound(convention.id));
        }
        Ok(convention)
    }

    #[instrument(skip(self, actor, filters))]
    pub async fn list_admin_conventions(
        &self,
        actor: Option<&Actor>,
        filters: ListingFilters,
    ) -> DomainResult<Vec<Convention>> {
        let actor = require_admin(actor)?;
        let query = build_visibility_filter(
            Some(actor),
            &filters,
            ContentKind::Convention,
            self.policy.keywords(),
        );

        let conventions = self.convention_repository.list_conventions(query).await?;
        debug!(count = conventions.len(), "listed conventions");
        Ok(conventions)
    }

    #[instrument(skip(self, filters))]
    pub async fn list_public_conventions(
        &self,
        filters: ListingFilters,
    ) -> DomainResult<Vec<Convention>> {
        let query = build_public_filter(&filters, ContentKind::Convention);
        self.convention_repository.list_conventions(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::auth::DepartmentKeywordMap;
    use common::domain::{Association, Field, MockConventionRepository, Predicate, Role};

    fn policy() -> Arc<AccessPolicy> {
        Arc::new(AccessPolicy::new(DepartmentKeywordMap::builtin()))
    }

    fn stored(published: bool) -> Convention {
        Convention {
            id: "c1".to_string(),
            name: "Libreria Centrale".to_string(),
            description: "Sconto sui libri di testo".to_string(),
            discount: Some("10%".to_string()),
            website_url: None,
            image_url: None,
            association: Some(Association::Scipog),
            published,
            created_at: None,
            updated_at: None,
        }
    }

    fn fields(association: &str) -> ConventionFields {
        ConventionFields {
            name: "Palestra".to_string(),
            description: String::new(),
            discount: Some(" ".to_string()),
            website_url: None,
            image_url: None,
            association: Some(association.to_string()),
            published: true,
        }
    }

    #[tokio::test]
    async fn test_network_admin_limited_to_own_association() {
        let mut repo = MockConventionRepository::new();
        repo.expect_create_convention().never();

        let service = ConventionService::new(Arc::new(repo), policy());
        let actor = Actor::new("a1", Role::AdminNetwork, Some(Association::Unimhealth));
        let result = service
            .create_convention(
                Some(&actor),
                CreateConventionRequest {
                    fields: fields("SCIPOG"),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_create_normalizes_blank_discount() {
        let mut repo = MockConventionRepository::new();
        repo.expect_create_convention()
            .withf(|input: &CreateConventionRepoInput| input.data.discount.is_none())
            .times(1)
            .returning(|input| {
                let mut convention = stored(input.data.published);
                convention.id = input.id;
                Ok(convention)
            });

        let service = ConventionService::new(Arc::new(repo), policy());
        let actor = Actor::new("a1", Role::AdminNetwork, Some(Association::Scipog));
        let result = service
            .create_convention(
                Some(&actor),
                CreateConventionRequest {
                    fields: fields("SCIPOG"),
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_draft_hidden_from_public() {
        let mut repo = MockConventionRepository::new();
        repo.expect_get_convention()
            .returning(|_| Ok(Some(stored(false))));

        let service = ConventionService::new(Arc::new(repo), policy());
        let request = ConventionIdRequest {
            convention_id: "c1".to_string(),
        };

        let anonymous = service.get_convention(None, request.clone()).await;
        assert!(matches!(anonymous, Err(DomainError::ConventionNotFound(_))));

        let admin = Actor::new("a1", Role::AdminMorgana, Some(Association::MorganaOrum));
        assert!(service.get_convention(Some(&admin), request).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_copies_every_field() {
        let mut repo = MockConventionRepository::new();
        repo.expect_get_convention()
            .returning(|_| Ok(Some(stored(true))));
        repo.expect_create_convention()
            .withf(|input: &CreateConventionRepoInput| {
                input.data.name == "Libreria Centrale (copia)"
                    && input.data.published
                    && input.data.discount.as_deref() == Some("10%")
                    && input.data.association == Some(Association::Scipog)
            })
            .times(1)
            .returning(|input| {
                let mut convention = stored(input.data.published);
                convention.id = input.id;
                convention.name = input.data.name;
                Ok(convention)
            });

        let service = ConventionService::new(Arc::new(repo), policy());
        let admin = Actor::new("root", Role::SuperAdmin, Some(Association::MorganaOrum));
        let copy = service
            .duplicate_convention(
                Some(&admin),
                ConventionIdRequest {
                    convention_id: "c1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(copy.name, "Libreria Centrale (copia)");
        assert_ne!(copy.id, "c1");
    }

    #[tokio::test]
    async fn test_public_listing_requires_published() {
        let mut repo = MockConventionRepository::new();
        repo.expect_list_conventions()
            .withf(|query| {
                query.predicate == Predicate::Eq(Field::Published, "true".to_string())
                    && query.order_by == Field::Name
            })
            .times(1)
            .returning(|_| Ok(vec![stored(true)]));

        let service = ConventionService::new(Arc::new(repo), policy());
        let conventions = service
            .list_public_conventions(ListingFilters::default())
            .await
            .unwrap();
        assert_eq!(conventions.len(), 1);
    }
}
