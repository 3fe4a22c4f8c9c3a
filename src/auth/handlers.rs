use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use time::Duration;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::CredentialsForm,
        extractors::MaybeUser,
        services,
        session,
    },
    error::AppResult,
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/fail", get(login_failed))
        .route("/logout", get(logout))
        .route("/join", get(join_page).post(join))
}

pub async fn login_page(MaybeUser(user): MaybeUser) -> Html<String> {
    views::login(user.as_ref(), false)
}

pub async fn login_failed() -> Html<String> {
    views::login(None, true)
}

#[instrument(skip(state, session, form), fields(id = %form.id))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Redirect> {
    let credential = services::authenticate(state.credentials.as_ref(), &form.id, &form.pw).await?;

    let ttl = Duration::minutes(state.config.session.ttl_minutes);
    session::establish(&session, &credential.id, ttl)
        .await
        .map_err(anyhow::Error::from)?;

    info!(id = %credential.id, "user logged in");
    Ok(Redirect::to("/"))
}

#[instrument(skip_all)]
pub async fn logout(session: Session) -> AppResult<Redirect> {
    session::end(&session).await.map_err(anyhow::Error::from)?;
    Ok(Redirect::to("/"))
}

pub async fn join_page(MaybeUser(user): MaybeUser) -> Html<String> {
    views::join(user.as_ref())
}

#[instrument(skip(state, form), fields(id = %form.id))]
pub async fn join(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Redirect> {
    services::register(state.credentials.as_ref(), &form.id, &form.pw).await?;
    Ok(Redirect::to("/"))
}
