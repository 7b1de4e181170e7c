use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use titlestats::{
    config::{Config, DEFAULT_CONFIG_FILE},
    present::{export, render},
    LoadCache, Pipeline, Source,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(author, version, about = "Content statistics for a streaming-titles CSV")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// CSV to analyse instead of the configured default dataset
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output written to stdout
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Also write dashboard.json and one parquet file per view here
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) config + source ──────────────────────────────────────────
    let config = Config::load(&args.config)?;
    let path = args.input.unwrap_or_else(|| config.dataset_path.clone());
    if !path.is_file() {
        bail!("dataset {} not found; pass --input <CSV>", path.display());
    }
    let source = Source::from_path(path);

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let cache = LoadCache::new();
    let dash = Pipeline::new(&cache, config.limits).run(&source)?;

    match args.format {
        Format::Text => print!("{}", render::render_text(&dash)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&dash)?),
    }

    // ─── 4) optional export ──────────────────────────────────────────
    if let Some(dir) = args.export_dir.or(config.export_dir) {
        let written = export::write_parquet(&dash, &dir)?;
        export::write_json(&dash, &dir.join("dashboard.json"))?;
        info!(dir = %dir.display(), files = written.len() + 1, "exported views");
    }

    Ok(())
}
