use std::sync::Arc;

use common::auth::SessionResolver;

use crate::domain::{
    AnalyticsService, ConventionService, EventService, NewsService, NewsletterService,
    RepresentativeService, UserService,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub representative_service: Arc<RepresentativeService>,
    pub convention_service: Arc<ConventionService>,
    pub event_service: Arc<EventService>,
    pub news_service: Arc<NewsService>,
    pub newsletter_service: Arc<NewsletterService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub session_resolver: Arc<dyn SessionResolver>,
    /// Adds the `Secure` flag to session cookies
    pub secure_cookies: bool,
}
