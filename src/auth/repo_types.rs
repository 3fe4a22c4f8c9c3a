use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Credential record in the `login` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub id: String,                 // user-chosen handle
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 PHC string
    pub created_at: OffsetDateTime,
}
