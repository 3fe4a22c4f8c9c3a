use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::listings::repo_types::{Listing, NewListing};

/// Name of the singleton row in `counter`.
pub const POST_COUNTER: &str = "post_count";

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Id the next listing would get. Only a preview; `create` assigns ids.
    async fn next_id(&self) -> anyhow::Result<i64>;

    /// Increment the counter and insert the listing under the new value, atomically.
    async fn create(&self, listing: &NewListing) -> anyhow::Result<Listing>;

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Listing>>;

    /// Record the stored image name. Returns `false` when no listing has `id`.
    async fn attach_image(&self, id: i64, file_name: &str) -> anyhow::Result<bool>;

    /// Full-text match on titles, best match first.
    async fn search_title(&self, query: &str) -> anyhow::Result<Vec<Listing>>;
}

#[derive(Clone)]
pub struct PgListingStore {
    db: PgPool,
}

impl PgListingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn next_id(&self) -> anyhow::Result<i64> {
        let (total,): (i64,) = sqlx::query_as("SELECT total_post FROM counter WHERE name = $1")
            .bind(POST_COUNTER)
            .fetch_one(&self.db)
            .await
            .context("read post counter")?;
        Ok(total + 1)
    }

    async fn create(&self, listing: &NewListing) -> anyhow::Result<Listing> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            UPDATE counter
               SET total_post = total_post + 1
             WHERE name = $1
            RETURNING total_post
            "#,
        )
        .bind(POST_COUNTER)
        .fetch_one(&mut *tx)
        .await
        .context("increment post counter")?;

        let row = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO post (id, title, money, description, kakao)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, money, description, kakao, image, created_at
            "#,
        )
        .bind(id)
        .bind(&listing.title)
        .bind(&listing.money)
        .bind(&listing.description)
        .bind(&listing.kakao)
        .fetch_one(&mut *tx)
        .await
        .context("insert post")?;

        tx.commit().await.context("commit tx")?;
        Ok(row)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, title, money, description, kakao, image, created_at
            FROM post
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list posts")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, title, money, description, kakao, image, created_at
            FROM post
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find post by id")?;
        Ok(row)
    }

    async fn attach_image(&self, id: i64, file_name: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE post SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(file_name)
            .execute(&self.db)
            .await
            .context("attach image to post")?;
        Ok(res.rows_affected() == 1)
    }

    async fn search_title(&self, query: &str) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, title, money, description, kakao, image, created_at
              FROM post
             WHERE to_tsvector('simple', title) @@ plainto_tsquery('simple', $1)
             ORDER BY ts_rank(to_tsvector('simple', title), plainto_tsquery('simple', $1)) DESC,
                      id ASC
            "#,
        )
        .bind(query)
        .fetch_all(&self.db)
        .await
        .context("search posts by title")?;
        Ok(rows)
    }
}
