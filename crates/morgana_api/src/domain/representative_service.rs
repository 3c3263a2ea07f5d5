use std::sync::Arc;

use common::auth::{
    build_public_filter, build_visibility_filter, require_admin, AccessPolicy, ListingFilters,
};
use common::domain::{
    Actor, ContentKind, CreateRepresentativeRepoInput, DeleteRepresentativeRepoInput, DomainError,
    DomainResult, GetRepresentativeRepoInput, Representative, RepresentativeData,
    RepresentativeRepository, UpdateRepresentativeRepoInput,
};
use common::garde::{known_association, known_category, not_blank};
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::domain::parsing::parse_association;

/// Suffix appended to the name of a duplicated record
pub const COPY_SUFFIX: &str = " (copia)";

/// Editable representative fields as submitted by an admin
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RepresentativeFields {
    #[garde(length(max = 100), custom(not_blank))]
    pub name: String,
    #[garde(length(max = 100), custom(not_blank))]
    pub surname: String,
    #[garde(email)]
    #[serde(default)]
    pub email: Option<String>,
    #[garde(custom(known_category))]
    pub category: String,
    #[garde(length(max = 200))]
    #[serde(default)]
    pub department: Option<String>,
    #[garde(length(max = 200))]
    #[serde(default)]
    pub list_name: Option<String>,
    #[garde(custom(known_association))]
    #[serde(default)]
    pub association: Option<String>,
    #[garde(length(max = 200))]
    #[serde(default)]
    pub position: Option<String>,
    #[garde(length(max = 2048))]
    #[serde(default)]
    pub image_url: Option<String>,
}

impl RepresentativeFields {
    /// Parsed and normalised data. Call after validation.
    fn into_data(self) -> DomainResult<RepresentativeData> {
        Ok(RepresentativeData {
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            email: self.email,
            category: self.category.parse()?,
            department: self.department,
            list_name: self.list_name,
            association: parse_association(self.association.as_deref())?,
            position: self.position,
            image_url: self.image_url,
        }
        .normalized())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateRepresentativeRequest {
    #[garde(dive)]
    pub fields: RepresentativeFields,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateRepresentativeRequest {
    #[garde(length(min = 1))]
    pub representative_id: String,
    #[garde(dive)]
    pub fields: RepresentativeFields,
}

/// Identifies one representative for get, delete and duplicate
#[derive(Debug, Clone, Validate)]
pub struct RepresentativeIdRequest {
    #[garde(length(min = 1))]
    pub representative_id: String,
}

/// Domain service for student representatives
pub struct RepresentativeService {
    representative_repository: Arc<dyn RepresentativeRepository>,
    policy: Arc<AccessPolicy>,
}

impl RepresentativeService {
    pub fn new(
        representative_repository: Arc<dyn RepresentativeRepository>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            representative_repository,
            policy,
        }
    }

    async fn load(&self, representative_id: &str) -> DomainResult<Representative> {
        self.representative_repository
            .get_representative(GetRepresentativeRepoInput {
                representative_id: representative_id.to_string(),
            })
            .await?
            .ok_or_else(|| DomainError::RepresentativeNotFound(representative_id.to_string()))
    }

    fn require_mutation(
        &self,
        actor: Option<&Actor>,
        data: &RepresentativeData,
    ) -> DomainResult<()> {
        self.policy.require_mutation(
            actor,
            data.association,
            data.department.as_deref(),
            "this representative",
        )
    }

    #[instrument(skip(self, actor, request), fields(name = %request.fields.name))]
    pub async fn create_representative(
        &self,
        actor: Option<&Actor>,
        request: CreateRepresentativeRequest,
    ) -> DomainResult<Representative> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        self.require_mutation(actor, &data)?;

        let representative_id = xid::new().to_string();
        debug!(representative_id = %representative_id, "creating representative");

        let representative = self
            .representative_repository
            .create_representative(CreateRepresentativeRepoInput {
                id: representative_id,
                data,
            })
            .await?;

        info!(representative_id = %representative.id, "representative created");
        Ok(representative)
    }

    /// Update a representative. The actor must be allowed to modify both the
    /// stored record and the record as it will be after the update.
    #[instrument(skip(self, actor, request), fields(representative_id = %request.representative_id))]
    pub async fn update_representative(
        &self,
        actor: Option<&Actor>,
        request: UpdateRepresentativeRequest,
    ) -> DomainResult<Representative> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        let existing = self.load(&request.representative_id).await?;
        self.require_mutation(actor, &existing.data())?;
        self.require_mutation(actor, &data)?;

        let representative = self
            .representative_repository
            .update_representative(UpdateRepresentativeRepoInput {
                representative_id: existing.id,
                data,
            })
            .await?;

        debug!(representative_id = %representative.id, "representative updated");
        Ok(representative)
    }

    #[instrument(skip(self, actor, request), fields(representative_id = %request.representative_id))]
    pub async fn delete_representative(
        &self,
        actor: Option<&Actor>,
        request: RepresentativeIdRequest,
    ) -> DomainResult<()> {
        common::garde::validate_struct(&request)?;

        let existing = self.load(&request.representative_id).await?;
        self.require_mutation(actor, &existing.data())?;

        self.representative_repository
            .delete_representative(DeleteRepresentativeRepoInput {
                representative_id: existing.id,
            })
            .await?;

        info!(representative_id = %request.representative_id, "representative deleted");
        Ok(())
    }

    /// Copy every field into a new record whose name carries [`COPY_SUFFIX`]
    #[instrument(skip(self, actor, request), fields(representative_id = %request.representative_id))]
    pub async fn duplicate_representative(
        &self,
        actor: Option<&Actor>,
        request: RepresentativeIdRequest,
    ) -> DomainResult<Representative> {
        common::garde::validate_struct(&request)?;

        let existing = self.load(&request.representative_id).await?;
        let mut data = existing.data();
        self.require_mutation(actor, &data)?;
        data.name.push_str(COPY_SUFFIX);

        let copy = self
            .representative_repository
            .create_representative(CreateRepresentativeRepoInput {
                id: xid::new().to_string(),
                data,
            })
            .await?;

        debug!(source_id = %existing.id, copy_id = %copy.id, "representative duplicated");
        Ok(copy)
    }

    #[instrument(skip(self, request), fields(representative_id = %request.representative_id))]
    pub async fn get_representative(
        &self,
        request: RepresentativeIdRequest,
    ) -> DomainResult<Representative> {
        common::garde::validate_struct(&request)?;
        self.load(&request.representative_id).await
    }

    /// Admin listing restricted to what the actor may see
    #[instrument(skip(self, actor, filters))]
    pub async fn list_admin_representatives(
        &self,
        actor: Option<&Actor>,
        filters: ListingFilters,
    ) -> DomainResult<Vec<Representative>> {
        let actor = require_admin(actor)?;
        let query = build_visibility_filter(
            Some(actor),
            &filters,
            ContentKind::Representative,
            self.policy.keywords(),
        );

        let representatives = self
            .representative_repository
            .list_representatives(query)
            .await?;
        debug!(count = representatives.len(), role = %actor.role, "listed representatives");
        Ok(representatives)
    }

    #[instrument(skip(self, filters))]
    pub async fn list_public_representatives(
        &self,
        filters: ListingFilters,
    ) -> DomainResult<Vec<Representative>> {
        let query = build_public_filter(&filters, ContentKind::Representative);
        self.representative_repository
            .list_representatives(query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::auth::DepartmentKeywordMap;
    use common::domain::{
        Association, Field, MockRepresentativeRepository, Predicate, RepresentativeCategory, Role,
    };

    fn policy() -> Arc<AccessPolicy> {
        Arc::new(AccessPolicy::new(DepartmentKeywordMap::new().with_keywords(
            Association::Unimhealth,
            ["patologia", "dimed", "biomorf"],
        )))
    }

    fn fields(category: &str, department: Option<&str>, association: &str) -> RepresentativeFields {
        RepresentativeFields {
            name: " Giulia ".to_string(),
            surname: "Rossi".to_string(),
            email: None,
            category: category.to_string(),
            department: department.map(str::to_string),
            list_name: Some("Lista Studenti".to_string()),
            association: Some(association.to_string()),
            position: None,
            image_url: None,
        }
    }

    fn stored(id: &str, association: Association, department: Option<&str>) -> Representative {
        Representative {
            id: id.to_string(),
            name: "Giulia".to_string(),
            surname: "Rossi".to_string(),
            email: Some("giulia@morgana.example".to_string()),
            category: RepresentativeCategory::Department,
            department: department.map(str::to_string),
            list_name: Some("Lista Studenti".to_string()),
            association: Some(association),
            position: Some("Consigliera".to_string()),
            image_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn echo_create(input: CreateRepresentativeRepoInput) -> DomainResult<Representative> {
        let data = input.data;
        Ok(Representative {
            id: input.id,
            name: data.name,
            surname: data.surname,
            email: data.email,
            category: data.category,
            department: data.department,
            list_name: data.list_name,
            association: data.association,
            position: data.position,
            image_url: data.image_url,
            created_at: None,
            updated_at: None,
        })
    }

    fn network_admin(association: Association) -> Actor {
        Actor::new("admin-1", Role::AdminNetwork, Some(association))
    }

    #[tokio::test]
    async fn test_create_clears_department_for_central_category() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_create_representative()
            .withf(|input: &CreateRepresentativeRepoInput| {
                input.data.department.is_none() && input.data.name == "Giulia"
            })
            .times(1)
            .returning(echo_create);

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let admin = Actor::new("root", Role::SuperAdmin, Some(Association::MorganaOrum));
        let created = service
            .create_representative(
                Some(&admin),
                CreateRepresentativeRequest {
                    fields: fields("central", Some("DIMED"), "MORGANA_ORUM"),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.category, RepresentativeCategory::Central);
        assert_eq!(created.department, None);
    }

    #[tokio::test]
    async fn test_network_admin_may_create_by_department_keyword() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_create_representative()
            .times(1)
            .returning(echo_create);

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let result = service
            .create_representative(
                Some(&network_admin(Association::Unimhealth)),
                CreateRepresentativeRequest {
                    fields: fields(
                        "DEPARTMENT",
                        Some("Dipartimento di Patologia Umana"),
                        "SCIPOG",
                    ),
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_network_admin_denied_outside_scope() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_create_representative().never();

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let result = service
            .create_representative(
                Some(&network_admin(Association::Economia)),
                CreateRepresentativeRequest {
                    fields: fields("DEPARTMENT", Some("Ingegneria"), "SCIPOG"),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_validation_runs_before_permission() {
        let service =
            RepresentativeService::new(Arc::new(MockRepresentativeRepository::new()), policy());
        let result = service
            .create_representative(
                None,
                CreateRepresentativeRequest {
                    fields: fields("SENATE", None, "SCIPOG"),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found_before_permission() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_get_representative().returning(|_| Ok(None));

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let result = service
            .update_representative(
                None,
                UpdateRepresentativeRequest {
                    representative_id: "ghost".to_string(),
                    fields: fields("NATIONAL", None, "SCIPOG"),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::RepresentativeNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_cannot_move_record_out_of_scope() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_get_representative()
            .returning(|_| Ok(Some(stored("r1", Association::Economia, None))));
        repo.expect_update_representative().never();

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let result = service
            .update_representative(
                Some(&network_admin(Association::Economia)),
                UpdateRepresentativeRequest {
                    representative_id: "r1".to_string(),
                    fields: fields("DEPARTMENT", None, "SCIPOG"),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_duplicate_copies_fields_with_suffix() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_get_representative()
            .returning(|_| Ok(Some(stored("r1", Association::Unimhealth, Some("DIMED")))));
        repo.expect_create_representative()
            .withf(|input: &CreateRepresentativeRepoInput| {
                input.id != "r1"
                    && input.data.name == "Giulia (copia)"
                    && input.data.department.as_deref() == Some("DIMED")
                    && input.data.position.as_deref() == Some("Consigliera")
            })
            .times(1)
            .returning(echo_create);

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let copy = service
            .duplicate_representative(
                Some(&network_admin(Association::Unimhealth)),
                RepresentativeIdRequest {
                    representative_id: "r1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(copy.name, "Giulia (copia)");
        assert_eq!(copy.email.as_deref(), Some("giulia@morgana.example"));
    }

    #[tokio::test]
    async fn test_delete_requires_session() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_get_representative()
            .returning(|_| Ok(Some(stored("r1", Association::Economia, None))));
        repo.expect_delete_representative().never();

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let result = service
            .delete_representative(
                None,
                RepresentativeIdRequest {
                    representative_id: "r1".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_admin_listing_applies_visibility_filter() {
        let mut repo = MockRepresentativeRepository::new();
        repo.expect_list_representatives()
            .withf(|query| {
                let Predicate::All(terms) = &query.predicate else {
                    return false;
                };
                terms[0]
                    == Predicate::In(
                        Field::Association,
                        vec!["UNIMHEALTH".to_string(), "MORGANA_ORUM".to_string()],
                    )
                    && query.order_by == Field::Name
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = RepresentativeService::new(Arc::new(repo), policy());
        let result = service
            .list_admin_representatives(
                Some(&network_admin(Association::Unimhealth)),
                ListingFilters::default(),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_admin_listing_rejects_plain_users() {
        let service =
            RepresentativeService::new(Arc::new(MockRepresentativeRepository::new()), policy());
        let user = Actor::new("u1", Role::User, None);
        let result = service
            .list_admin_representatives(Some(&user), ListingFilters::default())
            .await;
        assert!(matches!(result, Err(DomainError::PermissionDenied(_))));
    }
}
