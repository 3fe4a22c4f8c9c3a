//! In-memory store implementations for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::{repo::CredentialStore, repo_types::Credential};
use crate::listings::{
    repo::ListingStore,
    repo_types::{Listing, NewListing},
};

#[derive(Default)]
pub struct MemoryCredentialStore {
    rows: Mutex<BTreeMap<String, Credential>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Credential>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn insert(&self, id: &str, password_hash: &str) -> anyhow::Result<Option<Credential>> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(id) {
            return Ok(None);
        }
        let credential = Credential {
            id: id.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        };
        rows.insert(id.to_owned(), credential.clone());
        Ok(Some(credential))
    }
}

#[derive(Default)]
struct Posts {
    total_post: i64,
    rows: BTreeMap<i64, Listing>,
}

#[derive(Default)]
pub struct MemoryListingStore {
    inner: Mutex<Posts>,
}

impl MemoryListingStore {
    pub fn with_counter(total_post: i64) -> Self {
        Self {
            inner: Mutex::new(Posts {
                total_post,
                rows: BTreeMap::new(),
            }),
        }
    }

    pub fn total_post(&self) -> i64 {
        self.inner.lock().unwrap().total_post
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn next_id(&self) -> anyhow::Result<i64> {
        Ok(self.total_post() + 1)
    }

    async fn create(&self, listing: &NewListing) -> anyhow::Result<Listing> {
        let mut posts = self.inner.lock().unwrap();
        posts.total_post += 1;
        let row = Listing {
            id: posts.total_post,
            title: listing.title.clone(),
            money: listing.money.clone(),
            description: listing.description.clone(),
            kakao: listing.kakao.clone(),
            image: None,
            created_at: OffsetDateTime::now_utc(),
        };
        posts.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        Ok(self.inner.lock().unwrap().rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Listing>> {
        Ok(self.inner.lock().unwrap().rows.get(&id).cloned())
    }

    async fn attach_image(&self, id: i64, file_name: &str) -> anyhow::Result<bool> {
        let mut posts = self.inner.lock().unwrap();
        Ok(match posts.rows.get_mut(&id) {
            Some(row) => {
                row.image = Some(file_name.to_owned());
                true
            }
            None => false,
        })
    }

    /// Case-insensitive word match; stands in for the database text index.
    async fn search_title(&self, query: &str) -> anyhow::Result<Vec<Listing>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let posts = self.inner.lock().unwrap();
        Ok(posts
            .rows
            .values()
            .filter(|row| {
                let words: Vec<String> =
                    row.title.split_whitespace().map(str::to_lowercase).collect();
                terms.iter().all(|t| words.contains(t))
            })
            .cloned()
            .collect())
    }
}
