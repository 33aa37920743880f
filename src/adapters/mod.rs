// Adapters layer: concrete implementations of the domain ports over HTTP.

pub mod directus;
pub mod http_image;
pub mod medusa;
pub mod storage;

use crate::utils::error::{Result, SyncError};
use reqwest::Response;
use url::Url;

/// Parses `base_url` so that `join` appends to its path instead of replacing
/// the last segment.
pub(crate) fn normalize_base_url(field: &str, base_url: &str) -> Result<Url> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SyncError::InvalidConfigValueError {
        field: field.to_string(),
        value: base_url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

pub(crate) fn join_url(service: &'static str, base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|e| SyncError::ResponseError {
        service,
        message: format!("cannot build URL for '{}': {}", path, e),
    })
}

/// Turns a non-2xx response into [`SyncError::ApiError`], keeping the body for the log.
pub(crate) async fn check_status(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} responded {}: {}", service, status, body);
    Err(SyncError::ApiError {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Maps a rejected login to [`SyncError::AuthError`].
pub(crate) fn auth_failure(service: &'static str, err: SyncError) -> SyncError {
    match err {
        SyncError::ApiError { status, body, .. } if status == 400 || status == 401 || status == 403 => {
            SyncError::AuthError {
                service,
                message: format!("login rejected with status {}: {}", status, body),
            }
        }
        other => other,
    }
}
