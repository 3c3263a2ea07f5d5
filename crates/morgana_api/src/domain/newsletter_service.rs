use std::sync::Arc;

use common::auth::{can_view_analytics, require_actor};
use common::domain::{
    Actor, CreateSubscriberRepoInput, DeleteSubscriberRepoInput, DomainError, DomainResult,
    NewsletterRepository, NewsletterSubscriber,
};
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::domain::parsing::normalize_email;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[garde(email, length(max = 254))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UnsubscribeRequest {
    #[garde(length(min = 1, max = 254))]
    pub email: String,
}

pub struct NewsletterService {
    newsletter_repository: Arc<dyn NewsletterRepository>,
}

impl NewsletterService {
    pub fn new(newsletter_repository: Arc<dyn NewsletterRepository>) -> Self {
        Self {
            newsletter_repository,
        }
    }

    /// Subscribing the same address twice fails with `AlreadyExists`
    #[instrument(skip(self, request))]
    pub async fn subscribe(&self, request: SubscribeRequest) -> DomainResult<NewsletterSubscriber> {
        let request = SubscribeRequest {
            email: normalize_email(&request.email),
        };
        common::garde::validate_struct(&request)?;

        let subscriber = self
            .newsletter_repository
            .create_subscriber(CreateSubscriberRepoInput {
                id: xid::new().to_string(),
                email: request.email,
            })
            .await?;

        info!(subscriber_id = %subscriber.id, "newsletter subscription added");
        Ok(subscriber)
    }

    #[instrument(skip(self, request))]
    pub async fn unsubscribe(&self, request: UnsubscribeRequest) -> DomainResult<()> {
        let email = normalize_email(&request.email);
        common::garde::validate_struct(&UnsubscribeRequest {
            email: email.clone(),
        })?;

        let removed = self
            .newsletter_repository
            .delete_subscriber(DeleteSubscriberRepoInput {
                email: email.clone(),
            })
            .await?;

        if !removed {
            return Err(DomainError::SubscriberNotFound(email));
        }
        info!("newsletter subscription removed");
        Ok(())
    }

    #[instrument(skip(self, actor))]
    pub async fn list_subscribers(
        &self,
        actor: Option<&Actor>,
    ) -> DomainResult<Vec<NewsletterSubscriber>> {
        let actor = require_actor(actor)?;
        if !can_view_analytics(Some(actor)) {
            return Err(DomainError::PermissionDenied(format!(
                "{} {} cannot view subscribers",
                actor.role, actor.user_id
            )));
        }

        let subscribers = self.newsletter_repository.list_subscribers().await?;
        debug!(count = subscribers.len(), "listed subscribers");
        Ok(subscribers)
    }
}
