use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Listing record in the `post` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub money: String,
    pub description: String,
    pub kakao: String,             // contact handle
    pub image: Option<String>,     // stored file name under the upload dir
    pub created_at: OffsetDateTime,
}

/// Fields supplied when a listing is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub money: String,
    pub description: String,
    pub kakao: String,
}
