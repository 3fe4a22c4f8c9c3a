use std::path::Path;

use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    listings::repo::ListingStore,
    storage::StorageClient,
};

/// Client-supplied file name with any directory part removed.
pub fn base_name(original: &str) -> Option<&str> {
    let last = original.rsplit(['/', '\\']).next()?;
    match last {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// Content type for an accepted extension. Matching is case-sensitive.
pub fn mime_from_ext(file_name: &str) -> Option<&'static str> {
    match Path::new(file_name).extension()?.to_str()? {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// An upload whose file name passed [`check_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedUpload {
    pub name: String,
    pub content_type: &'static str,
}

/// Validate an upload's file name before its body is read.
pub fn check_upload(original: &str) -> AppResult<CheckedUpload> {
    let name = base_name(original).ok_or(AppError::UnsupportedFileType)?;
    let content_type = mime_from_ext(name).ok_or_else(|| {
        warn!(file_name = original, "rejected upload");
        AppError::UnsupportedFileType
    })?;
    Ok(CheckedUpload {
        name: name.to_owned(),
        content_type,
    })
}

/// `<millis>-<name>`, the key the upload is stored under.
///
/// Characters outside `[A-Za-z0-9._-]` (and other alphanumerics) become `_`,
/// so the key can be used as a URL path segment without escaping.
pub fn stored_name(now: OffsetDateTime, name: &str) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let name: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{millis}-{name}")
}

/// Store a checked image and return the name it was stored under.
pub async fn accept_upload(
    storage: &dyn StorageClient,
    upload: &CheckedUpload,
    body: Bytes,
) -> AppResult<String> {
    let key = stored_name(OffsetDateTime::now_utc(), &upload.name);
    storage.put_object(&key, body, upload.content_type).await?;
    Ok(key)
}

/// Store an image for listing `id` and record it on the listing.
pub async fn attach_to_listing(
    storage: &dyn StorageClient,
    listings: &dyn ListingStore,
    id: i64,
    upload: &CheckedUpload,
    body: Bytes,
) -> AppResult<String> {
    let key = accept_upload(storage, upload, body).await?;

    let attached = match listings.attach_image(id, &key).await {
        Ok(attached) => attached,
        Err(e) => {
            discard(storage, &key).await;
            return Err(e.into());
        }
    };
    if !attached {
        discard(storage, &key).await;
        return Err(AppError::NotFound);
    }

    info!(listing_id = id, key = %key, "image attached");
    Ok(key)
}

async fn discard(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = ?e, key, "failed to remove orphaned upload");
    }
}
