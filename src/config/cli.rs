use crate::config::toml_config::FileConfig;
use crate::config::SyncConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "product-sync")]
#[command(about = "Synchronize products from a Directus collection into Medusa")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, env = "DIRECTUS_URL")]
    pub directus_url: Option<String>,

    #[arg(long, env = "DIRECTUS_EMAIL")]
    pub directus_email: Option<String>,

    #[arg(long, env = "DIRECTUS_PASS", hide_env_values = true)]
    pub directus_password: Option<String>,

    /// Directus collection holding the products
    #[arg(long)]
    pub collection: Option<String>,

    #[arg(long, env = "MEDUSA_URL")]
    pub medusa_url: Option<String>,

    #[arg(long, env = "MEDUSA_EMAIL")]
    pub medusa_email: Option<String>,

    #[arg(long, env = "MEDUSA_PASS", hide_env_values = true)]
    pub medusa_password: Option<String>,

    /// Extra attempts for transient Medusa failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Currency for prices of newly created products
    #[arg(long)]
    pub currency: Option<String>,

    /// Image uploads in flight per product
    #[arg(long)]
    pub image_concurrency: Option<usize>,

    /// Keep Medusa products that no longer exist in Directus
    #[arg(long)]
    pub no_prune: bool,

    /// Show what would change without writing to Medusa
    #[arg(long)]
    pub dry_run: bool,

    /// Write a report of every action (.json or .csv)
    #[arg(long)]
    pub report: Option<String>,

    /// Exit with code 2 when any product failed to sync
    #[arg(long)]
    pub fail_on_error: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl CliArgs {
    /// Command line over file over defaults.
    pub fn resolve(&self, file: Option<FileConfig>) -> SyncConfig {
        let mut config = SyncConfig::from_file_config(file.unwrap_or_default());

        if let Some(v) = &self.directus_url {
            config.directus_url = v.clone();
        }
        if let Some(v) = &self.directus_email {
            config.directus_email = v.clone();
        }
        if let Some(v) = &self.directus_password {
            config.directus_password = v.clone();
        }
        if let Some(v) = &self.collection {
            config.directus_collection = v.clone();
        }
        if let Some(v) = &self.medusa_url {
            config.medusa_url = v.clone();
        }
        if let Some(v) = &self.medusa_email {
            config.medusa_email = v.clone();
        }
        if let Some(v) = &self.medusa_password {
            config.medusa_password = v.clone();
        }
        if let Some(v) = self.max_retries {
            config.max_retries = v;
        }
        if let Some(v) = &self.currency {
            config.currency_code = v.clone();
        }
        if let Some(v) = self.image_concurrency {
            config.image_concurrency = v;
        }
        if self.no_prune {
            config.prune = false;
        }
        config.dry_run = self.dry_run;
        config.report_path = self.report.clone();

        config
    }
}
