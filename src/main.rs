use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use worklog_exporter::wire::parse_date;
use worklog_exporter::{
    ConfigStore, DateRange, FileConfigStore, WidgetController, WidgetStatus, YouTrackRemote,
};
use youtrack_api::{ExportFormat, YouTrackClient, YouTrackConfig};

#[derive(Parser, Debug)]
#[command(
    name = "worklog-export",
    version,
    about,
    long_about = "Exports YouTrack work items matching a persisted filter"
)]
struct Cli {
    /// YouTrack base URL
    #[arg(long, env = "YOUTRACK_URL")]
    url: String,

    /// Permanent token used for YouTrack and Hub requests
    #[arg(long, env = "YOUTRACK_TOKEN", hide_env_values = true)]
    token: String,

    /// Standalone Hub URL; defaults to the Hub embedded in YouTrack
    #[arg(long, env = "HUB_URL")]
    hub_url: Option<String>,

    /// Language for server-side labels in the export, e.g. `de`
    #[arg(long, env = "YOUTRACK_LANGUAGE")]
    language: Option<String>,

    /// Filter config file; defaults to the per-user config directory
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Service id the filter is bound to
    #[arg(long)]
    service_id: Option<String>,

    /// Replaces the stored search query
    #[arg(long, short)]
    query: Option<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    until: Option<NaiveDate>,

    #[arg(long, short, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Output file; defaults to the export's file name in the current directory
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Xlsx,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Xlsx => ExportFormat::Spreadsheet,
        }
    }
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = YouTrackConfig::new(cli.url, cli.token);
    if let Some(hub_url) = cli.hub_url {
        config = config.with_hub_url(hub_url);
    }
    if let Some(language) = cli.language {
        config = config.with_accept_language(language);
    }
    let client = YouTrackClient::new(config)?;
    let mut remote = YouTrackRemote::new(client.clone());
    if let Some(service_id) = cli.service_id.as_deref() {
        remote = remote.with_service(service_id, client);
    }

    let store = match cli.config {
        Some(path) => FileConfigStore::open(path).await?,
        None => FileConfigStore::open_default().await?,
    };
    info!("Using filter config at {}", store.path().display());
    let store: Arc<dyn ConfigStore> = Arc::new(store);

    let mut widget = WidgetController::new(store, Arc::new(remote));
    let status = widget.initialize().await?;
    if let Some(service_id) = cli.service_id {
        widget.select_service(&service_id).await?;
    } else if status == WidgetStatus::Unconfigured {
        return Err("no compatible YouTrack service found; pass --service-id".into());
    } else if let Err(err) = widget.available_services().await {
        // Registers a client for the stored service id.
        warn!("Service discovery failed: {}", err);
    }

    let query = cli.query;
    let (since, until) = (cli.since, cli.until);
    widget
        .edit(|filter| {
            if let Some(query) = query {
                filter.set_search_text(Some(query));
            }
            if since.is_some() || until.is_some() {
                let current = filter.values().date_range;
                filter.set_date_range(DateRange {
                    start: since.or(current.start),
                    end: until.or(current.end),
                });
            }
        })
        .await?;

    if let (Some(start), Some(end)) = (since, until) {
        if start > end {
            warn!("Date range starts after it ends; the export will be empty");
        }
    }

    let file = widget.export(cli.format.into()).await?;
    let target = cli.output.unwrap_or_else(|| PathBuf::from(&file.file_name));
    tokio::fs::write(&target, &file.bytes).await?;
    info!(
        "Wrote {} byte(s) of {} to {}",
        file.bytes.len(),
        file.mime_type,
        target.display()
    );
    Ok(())
}
