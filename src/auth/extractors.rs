use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;

use super::{repo_types::Credential, session::current_user_id};
use crate::{error::AppError, state::AppState};

/// Identity of the caller, `None` when anonymous.
pub struct MaybeUser(pub Option<Credential>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Storage(anyhow::anyhow!("session layer: {msg}")))?;

        let Some(user_id) = current_user_id(&session).await.map_err(anyhow::Error::from)? else {
            return Ok(MaybeUser(None));
        };

        // The credential is re-read on every request.
        let credential = state.credentials.find_by_id(&user_id).await?;
        if credential.is_none() {
            debug!(%user_id, "session names an unknown credential");
        }
        Ok(MaybeUser(credential))
    }
}

/// Identity of the caller; anonymous requests are sent to `/login`.
pub struct RequireUser(pub Credential);

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await {
            Ok(MaybeUser(Some(user))) => Ok(RequireUser(user)),
            Ok(MaybeUser(None)) => Err(Redirect::to("/login").into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}
