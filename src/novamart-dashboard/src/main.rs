//! NovaMart marketing dashboard host.
//!
//! Loads the marketing dataset once, renders the requested page and prints
//! its chart specifications as JSON for the presentation shell.

use anyhow::Context;
use clap::Parser;
use novamart_analytics::DerivedMetrics;
use novamart_cache::BundleCache;
use novamart_core::config::{AppConfig, LogConfig};
use novamart_core::TableBundle;
use novamart_reporting::Page;
use serde::Serialize;
use serde_json::{json, Value as Json};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "novamart-dashboard")]
#[command(about = "Marketing analytics dashboard over the NovaMart CSV dataset")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset directory (overrides config; disables candidate search)
    #[arg(long, env = "NOVAMART__DATA__DIR")]
    data_dir: Option<String>,

    /// Page to render
    #[arg(long, default_value = "executive-overview")]
    page: String,

    /// Page selections as a JSON object
    #[arg(long)]
    selections: Option<String>,

    /// Print table shapes and headline KPIs instead of a page
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Print the available pages and exit
    #[arg(long, default_value_t = false)]
    list_pages: bool,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[derive(Serialize)]
struct TableShape {
    table: &'static str,
    rows: usize,
    columns: usize,
}

fn summary(bundle: &TableBundle, engine: &DerivedMetrics) -> Json {
    let tables: Vec<TableShape> = bundle
        .iter()
        .map(|(name, table)| TableShape {
            table: name.key(),
            rows: table.height(),
            columns: table.width(),
        })
        .collect();
    let stats = engine.summary(bundle.campaigns());
    json!({
        "tables": tables,
        "summary": stats,
        "net_return": stats.net_return(),
    })
}

fn print(value: &impl Serialize, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref());
    let mut config = match (&loaded, &cli.config) {
        (Ok(config), _) => config.clone(),
        (Err(_), None) => AppConfig::default(),
        (Err(e), Some(path)) => {
            anyhow::bail!("Failed to load config {}: {e}", path.display());
        }
    };
    init_tracing(&config.log);
    if let Err(e) = &loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    if let Some(dir) = cli.data_dir {
        config.data.dir = Some(dir);
    }

    if cli.list_pages {
        let pages: Vec<Json> = Page::ALL
            .iter()
            .map(|p| json!({ "slug": p.slug(), "title": p.title() }))
            .collect();
        return print(&pages, cli.pretty);
    }

    info!(
        data_dir = ?config.data.dir,
        candidates = config.data.candidates.len(),
        max_views = config.cache.max_views,
        "Configuration loaded"
    );

    let page: Page = cli.page.parse()?;
    let selections: Json = match &cli.selections {
        Some(raw) => serde_json::from_str(raw).context("--selections is not valid JSON")?,
        None => Json::Null,
    };

    let engine = DerivedMetrics::from_config(&config.cache);
    let cache = BundleCache::from_config(config.data.clone());
    let bundle = cache.get_or_load().map_err(|e| {
        error!(error = %e, "Failed to load marketing dataset");
        e
    });
    let bundle = bundle.with_context(|| {
        format!(
            "Error loading data. Checked: {}",
            config
                .data
                .candidate_dirs()
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    if cli.summary {
        return print(&summary(&bundle, &engine), cli.pretty);
    }

    let report = page.render(&bundle, &engine, &selections)?;
    print(&report, cli.pretty)
}
