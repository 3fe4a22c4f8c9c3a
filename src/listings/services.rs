use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    listings::{
        repo::ListingStore,
        repo_types::{Listing, NewListing},
    },
};

pub async fn create_listing(store: &dyn ListingStore, listing: NewListing) -> AppResult<Listing> {
    let created = store.create(&listing).await?;
    info!(id = created.id, title = %created.title, "listing created");
    Ok(created)
}

pub async fn get_by_id(store: &dyn ListingStore, id: i64) -> AppResult<Listing> {
    store.find_by_id(id).await?.ok_or(AppError::NotFound)
}

/// Title search; a blank query matches nothing.
pub async fn search_by_title(store: &dyn ListingStore, query: &str) -> AppResult<Vec<Listing>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let hits = store.search_title(query).await?;
    debug!(query, hits = hits.len(), "title search");
    Ok(hits)
}
