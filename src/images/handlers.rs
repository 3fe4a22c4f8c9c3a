use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::RequireUser,
    error::{AppError, AppResult},
    images::services::{attach_to_listing, check_upload},
    listings::{dto::ListingRef, services::get_by_id},
    state::AppState,
    views,
};

pub const IMAGE_FIELD: &str = "img";

pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/imgUpload", get(upload_page).post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn upload_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(listing): Query<ListingRef>,
) -> AppResult<Html<String>> {
    let listing = get_by_id(state.listings.as_ref(), listing.id).await?;
    Ok(views::img_upload(Some(&user), &listing))
}

/// POST /imgUpload?id=N (multipart, field `img`)
#[instrument(skip(state, user, mp), fields(user = %user.id))]
pub async fn upload(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(listing): Query<ListingRef>,
    mut mp: Multipart,
) -> AppResult<Redirect> {
    let listing = get_by_id(state.listings.as_ref(), listing.id).await?;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let upload = check_upload(field.file_name().unwrap_or_default())?;
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        attach_to_listing(
            state.storage.as_ref(),
            state.listings.as_ref(),
            listing.id,
            &upload,
            body,
        )
        .await?;
        return Ok(Redirect::to(&format!("/detail/{}", listing.id)));
    }

    Err(AppError::BadRequest(format!("multipart field `{IMAGE_FIELD}` is required")))
}
