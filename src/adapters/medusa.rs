//! Medusa admin REST client.
//!
//! The admin session is a cookie set by `POST /admin/auth`, so the underlying
//! `reqwest` client keeps a cookie store. Reads, updates, deletes and login
//! are retried on transient failures up to `max_retries` extra attempts.
//! Calls that create something (products, uploads) are only retried when the
//! server cannot have processed them, so a lost response never duplicates a
//! product.

use crate::adapters::{auth_failure, check_status, join_url, normalize_base_url};
use crate::domain::model::{ImageFile, ProductPayload, TargetProduct};
use crate::domain::ports::ProductTarget;
use crate::utils::error::{Result, SyncError};
use crate::utils::retry::retry_with_backoff_if;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const SERVICE: &str = "medusa";
const PAGE_SIZE: usize = 100;
const DEFAULT_BACKOFF_MS: u64 = 500;

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    #[serde(default)]
    products: Vec<TargetProduct>,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    product: TargetProduct,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    uploads: Vec<UploadedFile>,
}

pub struct MedusaClient {
    client: Client,
    base_url: Url,
    email: String,
    password: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl MedusaClient {
    pub fn new(
        base_url: &str,
        email: &str,
        password: &str,
        max_retries: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url("medusa_url", base_url)?,
            email: email.to_string(),
            password: password.to_string(),
            max_retries,
            backoff_base_ms: DEFAULT_BACKOFF_MS,
        })
    }

    /// Overrides the first retry delay; tests set it to zero.
    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    fn url(&self, path: &str) -> Result<Url> {
        join_url(SERVICE, &self.base_url, path)
    }

    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> Result<RequestBuilder> + Send + Sync,
    {
        self.send_retrying(SyncError::is_transient, build).await
    }

    /// For requests that are not safe to replay.
    async fn send_once<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> Result<RequestBuilder> + Send + Sync,
    {
        self.send_retrying(SyncError::is_unprocessed, build).await
    }

    async fn send_retrying<F>(&self, should_retry: fn(&SyncError) -> bool, build: F) -> Result<Response>
    where
        F: Fn() -> Result<RequestBuilder> + Send + Sync,
    {
        let build = &build;
        retry_with_backoff_if(self.max_retries, self.backoff_base_ms, should_retry, || async move {
            let response = build()?.send().await?;
            check_status(SERVICE, response).await
        })
        .await
    }

    async fn list_page(&self, offset: usize) -> Result<ProductListResponse> {
        let url = self.url("admin/products")?;
        let query = [("limit", PAGE_SIZE.to_string()), ("offset", offset.to_string())];
        let response = self
            .send(|| Ok(self.client.get(url.clone()).query(&query)))
            .await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProductTarget for MedusaClient {
    async fn authenticate(&self) -> Result<()> {
        let url = self.url("admin/auth")?;
        let body = SessionRequest {
            email: &self.email,
            password: &self.password,
        };

        self.send(|| Ok(self.client.post(url.clone()).json(&body)))
            .await
            .map_err(|e| auth_failure(SERVICE, e))?;

        tracing::info!("🔑 Authenticated with Medusa as {}", self.email);
        Ok(())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<TargetProduct>> {
        let url = self.url("admin/products")?;
        let response = self
            .send(|| Ok(self.client.get(url.clone()).query(&[("q", query)])))
            .await?;
        let list: ProductListResponse = response.json().await?;
        tracing::debug!("Medusa search '{}' returned {} products", query, list.products.len());
        Ok(list.products)
    }

    async fn list_all_products(&self) -> Result<Vec<TargetProduct>> {
        let mut products = Vec::new();
        loop {
            let page = self.list_page(products.len()).await?;
            let fetched = page.products.len();
            products.extend(page.products);

            let total = page.count.unwrap_or(products.len());
            if fetched == 0 || products.len() >= total {
                break;
            }
        }

        tracing::info!("📋 Medusa holds {} products", products.len());
        Ok(products)
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<String> {
        let url = self.url("admin/products")?;
        let response = self
            .send_once(|| Ok(self.client.post(url.clone()).json(payload)))
            .await?;
        let created: ProductResponse = response.json().await?;
        Ok(created.product.id)
    }

    async fn update_product(&self, id: &str, payload: &ProductPayload) -> Result<String> {
        let url = self.url(&format!("admin/products/{}", id))?;
        let response = self
            .send(|| Ok(self.client.post(url.clone()).json(payload)))
            .await?;
        let updated: ProductResponse = response.json().await?;
        Ok(updated.product.id)
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("admin/products/{}", id))?;
        self.send(|| Ok(self.client.delete(url.clone()))).await?;
        Ok(())
    }

    async fn upload_image(&self, image: ImageFile) -> Result<String> {
        let url = self.url("admin/uploads")?;
        // multipart forms are consumed on send, so each attempt builds its own
        let response = self
            .send_once(|| {
                let part = Part::bytes(image.bytes.clone())
                    .file_name(image.file_name.clone())
                    .mime_str(&image.content_type)?;
                Ok(self
                    .client
                    .post(url.clone())
                    .multipart(Form::new().part("files", part)))
            })
            .await?;

        let uploaded: UploadResponse = response.json().await?;
        uploaded
            .uploads
            .into_iter()
            .next()
            .map(|file| file.url)
            .ok_or_else(|| SyncError::ResponseError {
                service: SERVICE,
                message: format!("upload of '{}' returned no files", image.file_name),
            })
    }
}
