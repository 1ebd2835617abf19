use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

use rajneete_sitemap::config::{self, Config};
use rajneete_sitemap::dates::MonthWindow;
use rajneete_sitemap::logging::configure_logging;
use rajneete_sitemap::sitemap;
use rajneete_sitemap::storage::Uploader;

#[derive(Parser)]
#[clap(
    name = "rajneete-sitemap",
    about = "Generate a monthly news sitemap and upload it to object storage"
)]
struct Cli {
    /// Target year (requires MONTH)
    #[clap(requires = "month")]
    year: Option<i32>,

    /// Target month (1-12)
    month: Option<u32>,

    /// Generate for the month containing today
    #[clap(long, conflicts_with_all = ["year", "month", "previous_month"])]
    current_month: bool,

    /// Generate for the previous full calendar month (the default)
    #[clap(long, conflicts_with_all = ["year", "month"])]
    previous_month: bool,

    /// Fail the run when storage credentials are missing or the upload fails
    #[clap(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    configure_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();

    let window = if cli.current_month {
        MonthWindow::current()
    } else if let (Some(year), Some(month)) = (cli.year, cli.month) {
        MonthWindow::new(year, month)?
    } else {
        // Scheduled runs target the previous full month
        MonthWindow::previous()
    };

    let missing = config::missing_storage_vars();
    if !missing.is_empty() {
        if cli.strict {
            bail!(
                "Missing required storage environment variables: {}",
                missing.join(", ")
            );
        }
        warn!(
            "Missing storage environment variables: {}; sitemap will be generated locally but not uploaded",
            missing.join(", ")
        );
    }

    let client = reqwest::Client::new();
    let content = sitemap::generate_monthly(&client, &config, &window).await;

    let filename = config.render_filename(window.year(), window.month());
    fs::create_dir_all(&config.sitemaps_dir).with_context(|| {
        format!("Failed to create sitemap directory {}", config.sitemaps_dir)
    })?;
    let local_path = Path::new(&config.sitemaps_dir).join(&filename);
    fs::write(&local_path, &content)
        .with_context(|| format!("Failed to write sitemap to {}", local_path.display()))?;
    info!("Sitemap saved locally: {}", local_path.display());

    match &config.storage {
        Some(storage) => {
            let uploader = Uploader::new(storage, &config.sitemap_folder);
            if !config.sitemap_folder.is_empty() {
                uploader.create_folder(&config.sitemap_folder).await;
            }
            if uploader.upload_sitemap(content, &filename).await {
                info!("Sitemap generation and upload completed successfully");
            } else if cli.strict {
                bail!("Sitemap generation completed but upload failed");
            } else {
                warn!("Sitemap generation completed but upload failed");
            }
        }
        None => {
            info!("Sitemap generated locally (upload skipped due to missing credentials)");
        }
    }

    Ok(())
}
