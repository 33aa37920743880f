use clap::Parser;
use product_sync::config::toml_config::FileConfig;
use product_sync::core::report::summary;
use product_sync::utils::error::ErrorSeverity;
use product_sync::utils::{logger, validation::Validate};
use product_sync::{
    CliArgs, DirectusClient, HttpImageFetcher, LocalStorage, MedusaClient, ReportWriter,
    SyncConfig, SyncEngine, SyncError,
};

fn exit_code(e: &SyncError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &SyncError) -> ! {
    tracing::error!(
        "❌ Product sync failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e).max(1));
}

async fn run(config: SyncConfig) -> Result<product_sync::core::SyncReport, SyncError> {
    let source = DirectusClient::new(
        &config.directus_url,
        &config.directus_email,
        &config.directus_password,
        &config.directus_collection,
        config.request_timeout_secs,
    )?;
    let target = MedusaClient::new(
        &config.medusa_url,
        &config.medusa_email,
        &config.medusa_password,
        config.max_retries,
        config.request_timeout_secs,
    )?;
    let images = HttpImageFetcher::new(config.request_timeout_secs)?;
    let report_path = config.report_path.clone();

    let engine = SyncEngine::new(source, target, images, config);
    let report = engine.run().await?;

    if let Some(path) = report_path {
        ReportWriter::new(LocalStorage::new(".")).write(&report, &path).await?;
        tracing::info!("📁 Report saved to: {}", path);
    }

    Ok(report)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting product-sync");

    let file = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match FileConfig::from_file(path) {
                Ok(file) => Some(file),
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let config = args.resolve(file);
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(config).await {
        Ok(report) => {
            println!("✅ {}", summary(&report));
            if report.has_failures() {
                tracing::warn!("Some products failed to sync, see the log above");
                if args.fail_on_error {
                    std::process::exit(2);
                }
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
