//! Directus REST client: static-credential login and collection reads.

use crate::adapters::{auth_failure, check_status, join_url, normalize_base_url};
use crate::domain::model::SourceListing;
use crate::domain::ports::ProductSource;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

const SERVICE: &str = "directus";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    access_token: String,
}

pub struct DirectusClient {
    client: Client,
    base_url: Url,
    email: String,
    password: String,
    collection: String,
    access_token: RwLock<Option<String>>,
}

impl DirectusClient {
    pub fn new(
        base_url: &str,
        email: &str,
        password: &str,
        collection: &str,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url("directus_url", base_url)?,
            email: email.to_string(),
            password: password.to_string(),
            collection: collection.to_string(),
            access_token: RwLock::new(None),
        })
    }

    /// Absolute http(s) URLs pass through; anything else is a file id served
    /// from `/assets/{id}`.
    pub fn asset_url(&self, image: &str) -> String {
        let image = image.trim();
        if image.starts_with("http://") || image.starts_with("https://") {
            return image.to_string();
        }

        match join_url(SERVICE, &self.base_url, &format!("assets/{}", image.trim_start_matches('/'))) {
            Ok(url) => url.to_string(),
            Err(_) => image.to_string(),
        }
    }

    async fn bearer_token(&self) -> Result<String> {
        self.access_token
            .read()
            .await
            .clone()
            .ok_or_else(|| SyncError::AuthError {
                service: SERVICE,
                message: "not logged in".to_string(),
            })
    }
}

#[async_trait]
impl ProductSource for DirectusClient {
    async fn authenticate(&self) -> Result<()> {
        let url = join_url(SERVICE, &self.base_url, "auth/login")?;
        tracing::debug!("Logging in to Directus at {}", url);

        let response = self
            .client
            .post(url)
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await?;
        let response = check_status(SERVICE, response)
            .await
            .map_err(|e| auth_failure(SERVICE, e))?;

        let login: Envelope<LoginData> = response.json().await?;
        *self.access_token.write().await = Some(login.data.access_token);

        tracing::info!("🔑 Authenticated with Directus as {}", self.email);
        Ok(())
    }

    async fn list_products(&self) -> Result<SourceListing> {
        let token = self.bearer_token().await?;
        let url = join_url(SERVICE, &self.base_url, &format!("items/{}", self.collection))?;

        let response = self
            .client
            .get(url)
            .query(&[("limit", "-1")])
            .bearer_auth(token)
            .send()
            .await?;
        let response = check_status(SERVICE, response).await?;

        let body: serde_json::Value = response.json().await?;
        let data = body.get("data").cloned().ok_or_else(|| SyncError::ResponseError {
            service: SERVICE,
            message: "items response has no 'data' field".to_string(),
        })?;
        let rows: Vec<serde_json::Value> = serde_json::from_value(data)?;
        let listing = SourceListing::from_rows(rows);

        for row in &listing.rejected {
            tracing::warn!(
                "Unreadable row {:?} ({:?}) in Directus collection '{}': {}",
                row.id,
                row.name,
                self.collection,
                row.error
            );
        }
        tracing::info!(
            "📥 Read {} products from Directus collection '{}' ({} unreadable)",
            listing.products.len(),
            self.collection,
            listing.rejected.len()
        );
        Ok(listing)
    }

    fn image_url(&self, image: &str) -> String {
        self.asset_url(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_url_resolution() {
        let client =
            DirectusClient::new("http://localhost:8055/", "a@b.c", "pw", "products", 5).unwrap();

        assert_eq!(
            client.asset_url("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            client.asset_url("4f1c-9a"),
            "http://localhost:8055/assets/4f1c-9a"
        );
    }

    #[tokio::test]
    async fn test_list_requires_login() {
        let client =
            DirectusClient::new("http://localhost:8055", "a@b.c", "pw", "products", 5).unwrap();
        let result = client.list_products().await;
        assert!(matches!(result, Err(SyncError::AuthError { .. })));
    }
}
