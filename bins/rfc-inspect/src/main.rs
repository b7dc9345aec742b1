mod error;
mod render;

use std::path::Path;

use clap::Parser;
use rfc_dynamic::{ExtractConfig, FunctionView, RfcContext};
use rfc_interop_memory::{MemoryInterop, load_call};

use crate::error::InspectError;

#[derive(Parser)]
#[command(name = "rfc-inspect", about = "Dump an RFC function call as JSON")]
struct Cli {
    /// Call fixture to load (TOML, or JSON by extension).
    #[arg(long, env = "RFC_INSPECT_FIXTURE")]
    fixture: String,

    /// Extraction settings TOML file.
    #[arg(long, env = "RFC_INSPECT_CONFIG")]
    config: Option<String>,

    /// Dump parameter shapes instead of values.
    #[arg(long)]
    metadata: bool,

    /// Restrict output to one parameter.
    #[arg(long)]
    parameter: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!(config = %path, "loading extraction config");
            match ExtractConfig::load(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "failed to load config");
                    std::process::exit(1);
                }
            }
        }
        None => ExtractConfig::default(),
    };

    match run(&cli, &config) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, fixture = %cli.fixture, "inspection failed");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, config: &ExtractConfig) -> Result<String, InspectError> {
    let mem = MemoryInterop::new();
    let call = load_call(&mem, Path::new(&cli.fixture))?;
    tracing::debug!(fixture = %cli.fixture, metadata = cli.metadata, "rendering call");

    let view = FunctionView::new(RfcContext::new(&mem, config), call);
    let parameter = cli.parameter.as_deref();
    let json = if cli.metadata {
        render::metadata(&view.metadata()?, parameter)?
    } else {
        render::values(&view, parameter)?
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
