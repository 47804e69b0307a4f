use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use w3c_common::observability::{LogConfig, LogFormat, init_logging};
use w3c_config::{
    DEFAULT_CONFIG_FILE, HarvestConfig, HarvestConfigLoader, LogFormatSetting, LoggingConfig,
};

mod harvest;

#[derive(Parser, Debug)]
#[command(name = "w3c-harvest", about = "Harvest the W3C technical reports index into JSON lines")]
struct Cli {
    /// Configuration file (defaults to ./w3c.yaml when present)
    #[arg(short, long, env = "W3C_CONFIG")]
    config: Option<PathBuf>,

    /// Write records here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many documents
    #[arg(short = 'n', long)]
    max_documents: Option<usize>,

    /// Fingerprint of the newest document from a previous run
    #[arg(long)]
    last_seen: Option<String>,

    /// Chromedriver endpoint
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,
}

impl Cli {
    fn load_config(&self) -> Result<HarvestConfig> {
        let loader = HarvestConfigLoader::new();
        let loader = match &self.config {
            Some(path) => loader.with_file(path),
            None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
        };
        let mut cfg = loader.load()?;

        // flags win over file and environment
        if let Some(output) = &self.output {
            cfg.harvest.output = Some(output.display().to_string());
        }
        if let Some(max) = self.max_documents {
            cfg.harvest.max_count_documents = Some(max);
        }
        if let Some(last_seen) = &self.last_seen {
            cfg.harvest.last_document_fingerprint = Some(last_seen.clone());
        }
        if let Some(url) = &self.webdriver_url {
            cfg.browser.webdriver_url = url.clone();
        }
        if self.headed {
            cfg.browser.headless = false;
        }
        Ok(cfg)
    }
}

fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig {
        app_name: logging.app_name.clone(),
        log_dir: logging.dir.as_ref().map(PathBuf::from),
        emit_stderr: logging.emit_stderr,
        format: match logging.format {
            LogFormatSetting::Text => LogFormat::Text,
            LogFormatSetting::Json => LogFormat::Json,
        },
        default_filter: logging.filter.clone(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load_config()?;

    let log_path = init_logging(log_config(&cfg.logging))?;
    info!(target: "w3c.app", log = %log_path.display(), "logging initialised");

    harvest::run(cfg).await
}
