use anyhow::{Context, Result};
use tori_watch::api::{TelegramNotifier, ToriClient};
use tori_watch::core::{self, Config};
use tori_watch::monitoring::PostedRegistry;
use tori_watch::scanner::NewListingDetector;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Rotate before the subscriber opens the file
    let rotation = core::logging::rotate_log_file(
        &config.monitoring.log_file,
        config.monitoring.log_max_size_bytes(),
        config.monitoring.log_max_files,
    );

    // Initialize logging
    core::logging::init_logging(&config.monitoring)?;

    match rotation {
        Ok(removed) => {
            for old in removed {
                tracing::info!("Removed old log file: {}", old.display());
            }
        }
        Err(e) => tracing::warn!("Log rotation failed: {}", e),
    }

    tracing::info!("tori-watch starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let source = ToriClient::new(&config.tori)?;
    tracing::info!("Watching {}", source.search_url());

    let notifier = TelegramNotifier::new(&config.telegram)?;
    let registry = PostedRegistry::load(&config.scanner.posted_items_file).with_context(|| {
        format!(
            "Failed to load posted items from {}",
            config.scanner.posted_items_file.display()
        )
    })?;

    let mut detector = NewListingDetector::new(source, notifier, registry, &config.scanner)?;
    detector.run().await;

    Ok(())
}
