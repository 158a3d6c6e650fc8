use anyhow::{Context, Result};
use clap::Parser;
use crimedash::{
    config::{Variant, DEFAULT_DATA_PATH},
    dataset::load_table,
    pages::{default_pages, render_page, required_columns, LinkStyle},
};
use std::{fs, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Render every dashboard page to a static HTML file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the CSV dataset
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,
    /// Column layout of the dataset
    #[arg(long, value_enum, default_value_t = Variant::Categories)]
    variant: Variant,
    /// Output directory
    #[arg(short, long, default_value = "site")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).init();

    let cli = Cli::parse();
    let start = Instant::now();

    let pages = default_pages(cli.variant);
    let table = load_table(&cli.data, &required_columns(pages))
        .with_context(|| format!("loading {:?}", cli.data))?;

    fs::create_dir_all(&cli.out).with_context(|| format!("creating {:?}", cli.out))?;

    for page in pages {
        let html = render_page(&table, pages, page, LinkStyle::Files)
            .with_context(|| format!("rendering {}", page.path))?;
        let file = cli.out.join(format!("{}.html", page.slug()));
        fs::write(&file, html).with_context(|| format!("writing {:?}", file))?;
        info!(path = page.path, file = %file.display(), "exported");
    }

    info!(pages = pages.len(), elapsed = ?start.elapsed(), "all done");
    Ok(())
}
