//! Login sessions on top of `tower-sessions`.
//!
//! The session layer keeps records in a process-local [`MemoryStore`] and the
//! client only ever holds the random session id in an `HttpOnly` cookie. The
//! credential id of the logged-in user lives under [`SESSION_USER_ID_KEY`].

use time::{Duration, OffsetDateTime};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::debug;

use crate::config::SessionConfig;

/// Key for storing the credential id in the session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

pub fn session_layer(cfg: &SessionConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(cfg.cookie_name.clone())
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(cfg.secure_cookie)
}

/// Mark the session as belonging to `user_id` for a fixed `ttl` from now.
pub async fn establish(
    session: &Session,
    user_id: &str,
    ttl: Duration,
) -> Result<(), tower_sessions::session::Error> {
    // New id on login so a pre-login cookie cannot be reused.
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    session.set_expiry(Some(Expiry::AtDateTime(OffsetDateTime::now_utc() + ttl)));
    debug!(user_id, "session established");
    Ok(())
}

/// Credential id of a live session, `None` when anonymous or expired.
pub async fn current_user_id(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    session.get::<String>(SESSION_USER_ID_KEY).await
}

/// Remove the session record and clear the cookie.
pub async fn end(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
