use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// URL path under which `upload_dir` is served, e.g. `/public/image`.
    pub image_url_prefix: String,
    pub max_upload_bytes: usize,
}

/// Parsed value of `name`, or `default` when unset. A set but malformed value is an error.
fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name}={raw:?} is not valid")),
        Err(_) => Ok(default),
    }
}

/// URL prefix for files in `upload_dir`, which must sit inside `public_dir`.
pub fn image_url_prefix(public_dir: &Path, upload_dir: &Path) -> anyhow::Result<String> {
    let rel = upload_dir.strip_prefix(public_dir).with_context(|| {
        format!(
            "UPLOAD_DIR {} must be inside PUBLIC_DIR {}",
            upload_dir.display(),
            public_dir.display()
        )
    })?;

    let mut prefix = String::from("/public");
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .with_context(|| format!("UPLOAD_DIR {} is not UTF-8", upload_dir.display()))?;
                prefix.push('/');
                prefix.push_str(part);
            }
            Component::CurDir => {}
            _ => anyhow::bail!(
                "UPLOAD_DIR {} must be inside PUBLIC_DIR {}",
                upload_dir.display(),
                public_dir.display()
            ),
        }
    }
    Ok(prefix)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let ttl_minutes: i64 = env_or("SESSION_TTL_MINUTES", 60)?;
        anyhow::ensure!(ttl_minutes > 0, "SESSION_TTL_MINUTES must be positive");
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "uosmarket.sid".into()),
            ttl_minutes,
            secure_cookie: env_or("SESSION_COOKIE_SECURE", false)?,
        };

        let port = match std::env::var("APP_PORT") {
            Ok(_) => env_or("APP_PORT", 8080u16)?,
            Err(_) => env_or("PORT", 8080u16)?,
        };

        let public_dir: PathBuf = env_or("PUBLIC_DIR", PathBuf::from("./public"))?;
        let upload_dir: PathBuf = env_or("UPLOAD_DIR", public_dir.join("image"))?;
        let image_url_prefix = image_url_prefix(&public_dir, &upload_dir)?;

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            session,
            public_dir,
            upload_dir,
            image_url_prefix,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}
