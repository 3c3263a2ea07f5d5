use axum::routing::{get, post, put};
use axum::Router;
use common::http::ApiResponse;

use super::{
    analytics_handlers, convention_handlers, event_handlers, news_handlers, newsletter_handlers,
    representative_handlers, user_handlers,
};
use crate::http::{ApiResult, AppState};

async fn health() -> ApiResult<&'static str> {
    Ok(ApiResponse::ok("ok"))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(user_handlers::register))
        .route("/login", post(user_handlers::login))
        .route("/logout", post(user_handlers::logout))
        .route("/me", get(user_handlers::me))
        .route(
            "/password-reset/request",
            post(user_handlers::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(user_handlers::reset_password),
        )
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/representatives", get(representative_handlers::list_public))
        .route("/representatives/{id}", get(representative_handlers::get_one))
        .route("/conventions", get(convention_handlers::list_public))
        .route("/conventions/{id}", get(convention_handlers::get_one))
        .route("/events", get(event_handlers::list_public))
        .route("/events/{id}", get(event_handlers::get_one))
        .route("/events/{id}/registrations", post(event_handlers::register))
        .route("/news", get(news_handlers::list_public))
        .route("/news/{id}", get(news_handlers::get_one))
        .route("/newsletter/subscribe", post(newsletter_handlers::subscribe))
        .route(
            "/newsletter/unsubscribe",
            post(newsletter_handlers::unsubscribe),
        )
        .route(
            "/analytics/page-views",
            post(analytics_handlers::record_page_view),
        )
}

/// Every admin route resolves the caller; the services enforce access.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/representatives",
            get(representative_handlers::list_admin).post(representative_handlers::create),
        )
        .route(
            "/representatives/{id}",
            put(representative_handlers::update).delete(representative_handlers::delete),
        )
        .route(
            "/representatives/{id}/duplicate",
            post(representative_handlers::duplicate),
        )
        .route(
            "/conventions",
            get(convention_handlers::list_admin).post(convention_handlers::create),
        )
        .route(
            "/conventions/{id}",
            put(convention_handlers::update).delete(convention_handlers::delete),
        )
        .route(
            "/conventions/{id}/duplicate",
            post(convention_handlers::duplicate),
        )
        .route(
            "/events",
            get(event_handlers::list_admin).post(event_handlers::create),
        )
        .route(
            "/events/{id}",
            put(event_handlers::update).delete(event_handlers::delete),
        )
        .route(
            "/events/{id}/registrations",
            get(event_handlers::list_registrations),
        )
        .route(
            "/news",
            get(news_handlers::list_admin).post(news_handlers::create),
        )
        .route(
            "/news/{id}",
            put(news_handlers::update).delete(news_handlers::delete),
        )
        .route("/news/{id}/duplicate", post(news_handlers::duplicate))
        .route("/users", get(user_handlers::list_users))
        .route(
            "/users/{id}",
            axum::routing::delete(user_handlers::delete_user),
        )
        .route("/users/{id}/role", put(user_handlers::change_user_role))
        .route(
            "/newsletter/subscribers",
            get(newsletter_handlers::list_subscribers),
        )
        .route(
            "/analytics/page-views",
            get(analytics_handlers::page_view_summary),
        )
}

/// Full API router, without the server layers
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/admin", admin_routes())
        .nest("/api", public_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use common::auth::{
        AccessPolicy, DepartmentKeywordMap, MockAuthTokenProvider, MockPasswordResetTokenRepository,
        MockPasswordService, MockResetTokenProvider, MockSessionResolver, PasswordResetConfig,
        SessionToken,
    };
    use common::domain::{
        Actor, Association, Event, MockAnalyticsRepository, MockConventionRepository,
        MockEventRepository, MockNewsRepository, MockNewsletterRepository,
        MockRegistrationRepository, MockRepresentativeRepository, MockUserRepository, Role, User,
    };
    use common::email::LoggingEmailSender;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{
        AnalyticsService, ConventionService, EventService, NewsService, NewsletterService,
        RepresentativeService, UserService,
    };

    #[derive(Default)]
    struct Fixture {
        users: MockUserRepository,
        passwords: MockPasswordService,
        tokens: MockAuthTokenProvider,
        representatives: MockRepresentativeRepository,
        conventions: MockConventionRepository,
        events: MockEventRepository,
        registrations: MockRegistrationRepository,
        news: MockNewsRepository,
        newsletter: MockNewsletterRepository,
        analytics: MockAnalyticsRepository,
        sessions: MockSessionResolver,
    }

    impl Fixture {
        /// Every bearer token resolves to `actor`
        fn signed_in_as(mut self, actor: Actor) -> Self {
            self.sessions
                .expect_resolve_actor()
                .returning(move |_| Ok(Some(actor.clone())));
            self
        }

        fn into_router(self) -> Router {
            let policy = Arc::new(AccessPolicy::new(DepartmentKeywordMap::builtin()));
            let email_sender = Arc::new(LoggingEmailSender);

            let state = AppState {
                user_service: Arc::new(UserService::new(
                    Arc::new(self.users),
                    Arc::new(MockPasswordResetTokenRepository::new()),
                    Arc::new(self.tokens),
                    Arc::new(MockResetTokenProvider::new()),
                    Arc::new(self.passwords),
                    email_sender.clone(),
                    PasswordResetConfig::new("http://localhost:5173".to_string(), 60),
                )),
                representative_service: Arc::new(RepresentativeService::new(
                    Arc::new(self.representatives),
                    policy.clone(),
                )),
                convention_service: Arc::new(ConventionService::new(
                    Arc::new(self.conventions),
                    policy.clone(),
                )),
                event_service: Arc::new(EventService::new(
                    Arc::new(self.events),
                    Arc::new(self.registrations),
                    email_sender,
                    policy.clone(),
                )),
                news_service: Arc::new(NewsService::new(Arc::new(self.news), policy)),
                newsletter_service: Arc::new(NewsletterService::new(Arc::new(self.newsletter))),
                analytics_service: Arc::new(AnalyticsService::new(Arc::new(self.analytics))),
                session_resolver: Arc::new(self.sessions),
                secure_cookies: false,
            };
            build_router(state)
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, "Bearer test-token")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = Fixture::default()
            .into_router()
            .oneshot(get_request("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"], "ok");
    }

    #[tokio::test]
    async fn test_public_listing_forwards_filters() {
        let mut fixture = Fixture::default();
        fixture
            .representatives
            .expect_list_representatives()
            .withf(|query| format!("{:?}", query.predicate).contains("SCIPOG"))
            .times(1)
            .returning(|_| Ok(vec![]));

        let response = fixture
            .into_router()
            .oneshot(get_request("/api/representatives?association=SCIPOG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_admin_listing_without_session_is_unauthorized() {
        let mut fixture = Fixture::default();
        fixture.news.expect_list_news().never();

        let response = fixture
            .into_router()
            .oneshot(get_request("/api/admin/news"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Authentication required");
    }

    #[tokio::test]
    async fn test_network_admin_cannot_create_for_other_association() {
        let mut fixture = Fixture::default().signed_in_as(Actor::new(
            "a1",
            Role::AdminNetwork,
            Some(Association::Unimhealth),
        ));
        fixture.conventions.expect_create_convention().never();

        let response = fixture
            .into_router()
            .oneshot(json_request(
                "POST",
                "/api/admin/conventions",
                serde_json::json!({ "name": "Palestra", "association": "SCIPOG" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let mut fixture = Fixture::default();
        fixture.users.expect_get_user_by_email().returning(|_| {
            Ok(Some(User {
                id: "u1".to_string(),
                email: "anna@morgana.example".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                name: "Anna".to_string(),
                role: Role::User,
                association: None,
                created_at: None,
                updated_at: None,
            }))
        });
        fixture
            .passwords
            .expect_verify_password()
            .returning(|_, _| Ok(true));
        fixture.tokens.expect_generate_token().returning(|_, _| {
            Ok(SessionToken {
                token: "session-abc".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            })
        });

        let response = fixture
            .into_router()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                serde_json::json!({ "email": "anna@morgana.example", "password": "correct horse" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("session=session-abc;"));
        assert!(cookie.contains("HttpOnly"));

        let body = body_json(response).await;
        assert_eq!(body["data"]["user"]["email"], "anna@morgana.example");
        assert!(body["data"]["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let response = Fixture::default()
            .into_router()
            .oneshot(json_request("POST", "/api/auth/logout", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("session=; Max-Age=0"));
    }

    #[tokio::test]
    async fn test_full_event_is_conflict() {
        let mut fixture = Fixture::default();
        fixture.events.expect_get_event().returning(|_| {
            Ok(Some(Event {
                id: "e1".to_string(),
                title: "Gita".to_string(),
                description: String::new(),
                location: "Bologna".to_string(),
                starts_at: Utc::now() + Duration::days(10),
                ends_at: None,
                capacity: Some(1),
                association: None,
                published: true,
                created_at: None,
                updated_at: None,
            }))
        });
        fixture
            .registrations
            .expect_count_registrations()
            .returning(|_| Ok(1));

        let response = fixture
            .into_router()
            .oneshot(json_request(
                "POST",
                "/api/events/e1/registrations",
                serde_json::json!({ "name": "Luca", "email": "luca@morgana.example" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_subscriber_is_not_found() {
        let mut fixture = Fixture::default();
        fixture
            .newsletter
            .expect_delete_subscriber()
            .returning(|_| Ok(false));

        let response = fixture
            .into_router()
            .oneshot(json_request(
                "POST",
                "/api/newsletter/unsubscribe",
                serde_json::json!({ "email": "ghost@morgana.example" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_view_is_accepted() {
        let mut fixture = Fixture::default();
        fixture
            .analytics
            .expect_record_event()
            .times(1)
            .returning(|_| Ok(()));

        let response = fixture
            .into_router()
            .oneshot(json_request(
                "POST",
                "/api/analytics/page-views",
                serde_json::json!({ "path": "/news" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
