use serde::Deserialize;

use crate::listings::repo_types::NewListing;

/// Body of `POST /write`.
#[derive(Debug, Deserialize)]
pub struct WriteForm {
    pub title: String,
    pub money: String,
    pub description: String,
    pub kakao: String,
}

impl From<WriteForm> for NewListing {
    fn from(f: WriteForm) -> Self {
        Self {
            title: f.title,
            money: f.money,
            description: f.description,
            kakao: f.kakao,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub value: Option<String>,
}

/// Listing the upload step belongs to.
#[derive(Debug, Deserialize)]
pub struct ListingRef {
    pub id: i64,
}
