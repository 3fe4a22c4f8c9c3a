use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo::CredentialStore,
        repo_types::Credential,
    },
    error::{AppError, AppResult},
};

pub(crate) fn is_valid_handle(id: &str) -> bool {
    lazy_static! {
        static ref HANDLE_RE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]{1,32}$").unwrap();
    }
    HANDLE_RE.is_match(id)
}

fn validate(id: &str, raw_password: &str) -> AppResult<()> {
    if !is_valid_handle(id) {
        return Err(AppError::BadRequest(
            "id must be 1-32 letters, digits, '_', '.' or '-'".into(),
        ));
    }
    if raw_password.is_empty() {
        return Err(AppError::BadRequest("password must not be empty".into()));
    }
    Ok(())
}

pub async fn register(
    store: &dyn CredentialStore,
    id: &str,
    raw_password: &str,
) -> AppResult<Credential> {
    validate(id, raw_password)?;

    if store.find_by_id(id).await?.is_some() {
        warn!(id, "id already registered");
        return Err(AppError::DuplicateIdentity);
    }

    let hash = hash_password(raw_password)?;
    // Lost a race with a concurrent registration of the same id.
    let credential = store
        .insert(id, &hash)
        .await?
        .ok_or(AppError::DuplicateIdentity)?;

    info!(id = %credential.id, "credential registered");
    Ok(credential)
}

pub async fn authenticate(
    store: &dyn CredentialStore,
    id: &str,
    raw_password: &str,
) -> AppResult<Credential> {
    let Some(credential) = store.find_by_id(id).await? else {
        warn!(id, "login unknown id");
        return Err(AppError::UnknownIdentity);
    };

    if !verify_password(raw_password, &credential.password_hash)? {
        warn!(id, "login invalid password");
        return Err(AppError::BadCredential);
    }

    info!(id, "credential authenticated");
    Ok(credential)
}
