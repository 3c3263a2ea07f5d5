use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::domain::Actor;
use common::http::{extract_session_token, ApiError};
use tracing::debug;

use crate::http::AppState;

/// The caller behind the session cookie or bearer token, if any.
///
/// A missing, invalid or stale token resolves to an anonymous caller; the
/// services decide whether that is enough.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Option<Actor>);

impl CurrentActor {
    pub fn get(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_session_token(&parts.headers) else {
            return Ok(CurrentActor(None));
        };

        let actor = state.session_resolver.resolve_actor(&token).await?;
        if let Some(actor) = &actor {
            debug!(user_id = %actor.user_id, role = %actor.role, "request authenticated");
        }
        Ok(CurrentActor(actor))
    }
}
