#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_currency_code, validate_file_extension, validate_non_empty_string, validate_range,
    validate_url, Validate,
};
use serde::Serialize;
use toml_config::{is_unresolved_placeholder, FileConfig};

pub const DEFAULT_DIRECTUS_URL: &str = "http://localhost:8055";
pub const DEFAULT_MEDUSA_URL: &str = "http://localhost:9000";
pub const DEFAULT_COLLECTION: &str = "products";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fully resolved settings for one sync run.
#[derive(Clone, Serialize)]
pub struct SyncConfig {
    pub directus_url: String,
    pub directus_email: String,
    #[serde(skip)]
    pub directus_password: String,
    pub directus_collection: String,
    pub medusa_url: String,
    pub medusa_email: String,
    #[serde(skip)]
    pub medusa_password: String,
    pub max_retries: u32,
    pub currency_code: String,
    pub image_concurrency: usize,
    pub prune: bool,
    pub dry_run: bool,
    pub request_timeout_secs: u64,
    pub report_path: Option<String>,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("directus_url", &self.directus_url)
            .field("directus_email", &self.directus_email)
            .field("directus_collection", &self.directus_collection)
            .field("medusa_url", &self.medusa_url)
            .field("medusa_email", &self.medusa_email)
            .field("max_retries", &self.max_retries)
            .field("currency_code", &self.currency_code)
            .field("image_concurrency", &self.image_concurrency)
            .field("prune", &self.prune)
            .field("dry_run", &self.dry_run)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("report_path", &self.report_path)
            .finish_non_exhaustive()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            directus_url: DEFAULT_DIRECTUS_URL.to_string(),
            directus_email: String::new(),
            directus_password: String::new(),
            directus_collection: DEFAULT_COLLECTION.to_string(),
            medusa_url: DEFAULT_MEDUSA_URL.to_string(),
            medusa_email: String::new(),
            medusa_password: String::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            currency_code: DEFAULT_CURRENCY.to_string(),
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
            prune: true,
            dry_run: false,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            report_path: None,
        }
    }
}

impl SyncConfig {
    /// Defaults overlaid with whatever the file sets.
    pub fn from_file_config(file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            directus_url: file.directus.url.unwrap_or(defaults.directus_url),
            directus_email: file.directus.email.unwrap_or_default(),
            directus_password: file.directus.password.unwrap_or_default(),
            directus_collection: file
                .directus
                .collection
                .unwrap_or(defaults.directus_collection),
            medusa_url: file.medusa.url.unwrap_or(defaults.medusa_url),
            medusa_email: file.medusa.email.unwrap_or_default(),
            medusa_password: file.medusa.password.unwrap_or_default(),
            max_retries: file.medusa.max_retries.unwrap_or(defaults.max_retries),
            currency_code: file.sync.currency_code.unwrap_or(defaults.currency_code),
            image_concurrency: file
                .sync
                .image_concurrency
                .unwrap_or(defaults.image_concurrency),
            prune: file.sync.prune.unwrap_or(defaults.prune),
            dry_run: defaults.dry_run,
            request_timeout_secs: file
                .sync
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            report_path: defaults.report_path,
        }
    }
}

fn validate_credential(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() || is_unresolved_placeholder(value) {
        return Err(SyncError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        validate_url("directus_url", &self.directus_url)?;
        validate_url("medusa_url", &self.medusa_url)?;

        validate_credential("directus_email", &self.directus_email)?;
        validate_credential("directus_password", &self.directus_password)?;
        validate_credential("medusa_email", &self.medusa_email)?;
        validate_credential("medusa_password", &self.medusa_password)?;

        validate_non_empty_string("directus_collection", &self.directus_collection)?;
        validate_currency_code("currency_code", &self.currency_code)?;
        validate_range("image_concurrency", self.image_concurrency, 1, 32)?;
        validate_range("max_retries", self.max_retries, 0, 10)?;
        validate_range("request_timeout_secs", self.request_timeout_secs, 1, 600)?;

        if let Some(path) = &self.report_path {
            validate_file_extension("report_path", path, &["json", "csv"])?;
        }

        Ok(())
    }
}

impl ConfigProvider for SyncConfig {
    fn currency_code(&self) -> &str {
        &self.currency_code
    }

    fn image_concurrency(&self) -> usize {
        self.image_concurrency
    }

    fn prune(&self) -> bool {
        self.prune
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}
