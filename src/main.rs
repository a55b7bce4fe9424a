use anyhow::{bail, Context};
use clap::Parser;
use sidecut::{Dialect, Engine, EngineConfig, Side};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sidecut")]
#[command(about = "Environment-aware code elimination for sided TypeScript modules")]
#[command(version)]
struct Cli {
    /// Side to build for (client, server or both)
    #[arg(short, long, default_value = "client")]
    side: String,

    /// Syntax dialect (ts or js)
    #[arg(long, default_value = "ts")]
    dialect: String,

    /// Optional JSON config file; command-line flags win over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rewrite files in place instead of printing to stdout
    #[arg(short, long)]
    write: bool,

    /// Source files to transform
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.side = cli.side.parse::<Side>().map_err(anyhow::Error::msg)?;
    config.dialect = cli.dialect.parse::<Dialect>().map_err(anyhow::Error::msg)?;

    if cli.files.is_empty() {
        bail!("no input files");
    }

    let extension = config.dialect.extension();
    let engine = Engine::new(config);

    for file in &cli.files {
        // Cheap pre-filter; the engine's structural checks are authoritative.
        if file.extension().map_or(true, |e| e != extension) {
            tracing::debug!(file = %file.display(), "skipping non-source file");
            continue;
        }

        let code = fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;
        let id = file.to_string_lossy();

        match engine.transform(&id, &code)? {
            Some(output) => {
                if cli.write {
                    fs::write(file, &output)
                        .with_context(|| format!("writing {}", file.display()))?;
                    println!("rewrote {}", file.display());
                } else {
                    print!("{}", output);
                }
            }
            None => {
                tracing::info!(file = %file.display(), "unchanged");
            }
        }
    }

    Ok(())
}
