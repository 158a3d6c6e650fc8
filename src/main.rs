use anyhow::{Context, Result};
use clap::Parser;
use crimedash::{
    config::{DashboardConfig, Overrides, Variant},
    dataset::load_table,
    pages::{default_pages, required_columns},
    server::{routes, AppState},
};
use std::{env, path::PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Serve the crime-statistics dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML config file with `server` and `dataset` sections
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Address to bind
    #[arg(long)]
    host: Option<String>,
    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,
    /// Verbose logging and error details in responses
    #[arg(long, overrides_with = "no_debug")]
    debug: bool,
    /// Turn debug off even if the config file enables it
    #[arg(long, overrides_with = "debug")]
    no_debug: bool,
    /// Path to the CSV dataset
    #[arg(long)]
    data: Option<PathBuf>,
    /// Column layout of the dataset
    #[arg(long, value_enum)]
    variant: Option<Variant>,
}

impl Cli {
    /// `Some` only when one of `--debug` / `--no-debug` was given; the last one wins.
    fn debug_override(&self) -> Option<bool> {
        match (self.debug, self.no_debug) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let debug_override = cli.debug_override();

    // ─── 1) resolve config ───────────────────────────────────────────
    let cfg = DashboardConfig::resolve(
        cli.config.as_deref(),
        Overrides {
            host: cli.host,
            port: cli.port,
            debug: debug_override,
            data: cli.data,
            variant: cli.variant,
        },
    )?;

    // ─── 2) init logging ─────────────────────────────────────────────
    let default_level = if cfg.server.debug { "debug" } else { "info" };
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    fmt().with_env_filter(env).init();
    info!(?cfg, "startup");

    // ─── 3) load dataset once ────────────────────────────────────────
    let pages = default_pages(cfg.dataset.variant);
    let table = match load_table(&cfg.dataset.path, &required_columns(pages)) {
        Ok(t) => t,
        Err(e) => {
            error!("cannot load dataset: {}", e);
            return Err(e).with_context(|| format!("loading {:?}", cfg.dataset.path));
        }
    };

    // ─── 4) serve ────────────────────────────────────────────────────
    let addr = cfg.server.socket_addr()?;
    let state = AppState::new(table, pages, cfg.server.debug);

    info!("Server starting on http://{}", addr);
    for page in pages {
        info!("  {} -> {}", page.path, page.title);
    }
    info!("Health check: http://{}/health", addr);

    warp::serve(routes(state)).run(addr).await;

    Ok(())
}
