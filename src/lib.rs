pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{
    directus::DirectusClient, http_image::HttpImageFetcher, medusa::MedusaClient,
    storage::LocalStorage,
};
pub use config::SyncConfig;
pub use crate::core::{engine::SyncEngine, report::ReportWriter};
pub use utils::error::{Result, SyncError};
