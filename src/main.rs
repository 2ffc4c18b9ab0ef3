//! Gateway header transform CLI entry point.
//!
//! Runs the transform against a snapshot of flow variables and prints the
//! output variables as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use gateway_header_transform::{
    decode_header_map, Direction, HeaderMap, HeaderTransformer, TransformConfig, VariableContext,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gateway-header-transform")]
#[command(
    author,
    version,
    about = "Serialize gateway request/response headers into flow variables"
)]
struct Args {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, env = "HEADER_TRANSFORM_CONFIG")]
    config: Option<PathBuf>,

    /// Flow variable snapshot (YAML or JSON object). Reads stdin if omitted.
    #[arg(short, long)]
    variables: Option<PathBuf>,

    /// Print decoded header objects instead of the raw variable values
    #[arg(long)]
    decode: bool,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration and exit.
    #[arg(long)]
    validate: bool,
}

fn print_example_config() {
    let example = r#"# Header Transform Configuration Example
version: "1"

settings:
  # Listed headers without a value: "null" keeps the key, "omit" drops it
  missing_values: "null"

request:
  names_variable: "request.headers.names"
  value_prefix: "request.header."
  output_variable: "apic.reqHeaders"

response:
  names_variable: "response.headers.names"
  value_prefix: "response.header."
  output_variable: "apic.resHeaders"
"#;
    println!("{}", example);
}

/// Value printed for one output variable.
#[derive(Serialize)]
#[serde(untagged)]
enum OutputValue {
    Raw(String),
    Decoded(HeaderMap),
}

fn load_variables(path: Option<&PathBuf>) -> Result<VariableContext> {
    match path {
        Some(path) => VariableContext::from_file(path)
            .with_context(|| format!("Failed to load variables: {}", path.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read variables from stdin")?;
            VariableContext::from_yaml(&content).context("Failed to parse variables from stdin")
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if args.example_config {
        print_example_config();
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => TransformConfig::from_file(path)
            .with_context(|| format!("Invalid config file: {}", path.display()))?,
        None => TransformConfig::default(),
    };

    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let mut ctx = load_variables(args.variables.as_ref())?;
    info!(variables = ctx.len(), "Loaded flow variables");

    let transformer = HeaderTransformer::new(config);
    let report = transformer.apply(&mut ctx);

    info!(
        request_headers = report.request.headers,
        response_headers = report.response.headers,
        "Header transform complete"
    );

    let mut output = BTreeMap::new();
    for direction in Direction::ALL {
        let name = &transformer.config().direction(direction).output_variable;
        let raw = ctx
            .get(name)
            .with_context(|| format!("Output variable {} was not written", name))?;

        let value = if args.decode {
            OutputValue::Decoded(decode_header_map(raw)?)
        } else {
            OutputValue::Raw(raw.to_string())
        };
        output.insert(name.clone(), value);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
