use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::extractors::{MaybeUser, RequireUser},
    error::{AppError, AppResult},
    listings::{
        dto::{SearchQuery, WriteForm},
        services,
    },
    state::AppState,
    views,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list))
        .route("/search", get(search))
        .route("/detail/:id", get(detail))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/write", get(write_page).post(write))
}

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Html<String>> {
    let posts = state.listings.list_all().await?;
    Ok(views::list(user.as_ref(), &posts))
}

#[instrument(skip(state, user))]
pub async fn search(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(q): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let value = q.value.unwrap_or_default();
    let posts = services::search_by_title(state.listings.as_ref(), &value).await?;
    Ok(views::search(user.as_ref(), &value, &posts))
}

/// Unknown or non-numeric ids render the page without data.
#[instrument(skip(state, user))]
pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Html<String>)> {
    let found = match id.parse::<i64>() {
        Ok(id) => match services::get_by_id(state.listings.as_ref(), id).await {
            Ok(listing) => Some(listing),
            Err(AppError::NotFound) => None,
            Err(e) => return Err(e),
        },
        Err(_) => None,
    };
    let status = if found.is_some() {
        StatusCode::OK
    } else {
        warn!(%id, "listing not found");
        StatusCode::NOT_FOUND
    };
    let page = views::detail(user.as_ref(), found.as_ref(), &state.config.image_url_prefix);
    Ok((status, page))
}

#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn write_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> AppResult<Html<String>> {
    let next_id = state.listings.next_id().await?;
    Ok(views::write(Some(&user), next_id))
}

#[instrument(skip(state, user, form), fields(user = %user.id))]
pub async fn write(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<WriteForm>,
) -> AppResult<Redirect> {
    let listing = services::create_listing(state.listings.as_ref(), form.into()).await?;
    Ok(Redirect::to(&format!("/imgUpload?id={}", listing.id)))
}
