use clap::{Parser, Subcommand};
use pcbkit::{
    init_logging, BoardHandle, CallbackAbort, Config, ExportKind, PoolRegistry, Project,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Inspect export settings of a board and run its exports.
#[derive(Parser, Debug)]
#[command(name = "pcbkit", version, about)]
struct Cli {
    /// Project descriptor (JSON)
    project: PathBuf,

    /// Pool location, repeatable
    #[arg(long = "pool", value_name = "UUID=PATH", value_parser = parse_pool)]
    pools: Vec<(Uuid, PathBuf)>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board's current settings record
    Settings { kind: ExportKind },
    /// Run an export with the settings record in a JSON file
    Export { kind: ExportKind, record: PathBuf },
}

fn parse_pool(arg: &str) -> Result<(Uuid, PathBuf), String> {
    let (uuid, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected UUID=PATH, got '{}'", arg))?;
    let uuid = uuid
        .trim()
        .parse()
        .map_err(|e| format!("invalid pool uuid '{}': {}", uuid, e))?;
    Ok((uuid, PathBuf::from(path)))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(_) => Config::default(),
        },
    };
    Ok(config)
}

fn read_record(path: &Path) -> pcbkit::Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_logging(&config.logging)?;

    let mut pools = PoolRegistry::new();
    for (uuid, path) in &cli.pools {
        pools.register(*uuid, path);
    }

    let project = Project::load_from_file(&cli.project)?
        .with_default_pool_cache(config.export.pool_cache_directory());
    let mut handle = BoardHandle::open(&pools, &project)?;
    if let Some(dir) = &config.export.output_directory {
        handle.set_output_directory(dir)?;
    }

    match cli.command {
        Command::Settings { kind } => {
            let record = match kind {
                ExportKind::Gerber => handle.get_gerber_export_settings()?,
                ExportKind::Pdf => handle.get_pdf_export_settings()?,
                ExportKind::Pnp => handle.get_pnp_export_settings()?,
                ExportKind::Step => handle.get_step_export_settings()?,
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Export { kind, record } => {
            let record = read_record(&record)?;
            match kind {
                ExportKind::Gerber => handle.export_gerber(&record)?,
                ExportKind::Pdf => handle.export_pdf(&record)?,
                ExportKind::Pnp => handle.export_pnp(&record)?,
                ExportKind::Step => {
                    let mut progress = |milestone: &str| -> Result<(), CallbackAbort> {
                        info!("STEP: {}", milestone);
                        Ok(())
                    };
                    handle.export_step(&record, Some(&mut progress))?;
                }
            }
            info!("{} export complete", kind);
        }
    }

    handle.close();
    Ok(())
}
