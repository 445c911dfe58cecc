use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use fastex_core::config::Config;
use fastex_core::labels::LabelValues;
use fastex_core::schema::Schema;
use fastex_core::traits::{RecordObserver, RecordSearch};
use fastex_query::{Dataset, Query};

#[derive(Parser)]
#[command(name = "fex", version)]
#[command(about = "Query and inspect JSONL annotation datasets", long_about = None)]
struct Cli {
    /// Path to configuration file [default: fex.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// The granularity of logs to report (RUST_LOG takes precedence)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the indices of records matching a query
    Search {
        /// Query, e.g. `alice label:positive !archived:*`
        #[arg(required = true, allow_hyphen_values = true)]
        query: Vec<String>,

        /// Data file in JSONL format (defaults to `data.input` from the config)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Print matching records as JSONL instead of their indices
        #[arg(long)]
        records: bool,
    },
    /// List the flattened schema fields
    Fields,
    /// Print the label values seen for every classification field
    Labels {
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Print the number of records
    Count {
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let schema = config.schema().context("Failed to read schema from configuration")?;

    match cli.command {
        Commands::Search { query, input, records } => {
            let dataset = open_dataset(&config, input.as_deref(), schema)?;
            run_search(&dataset, &query.join(" "), records)
        }
        Commands::Fields => print_fields(schema.as_ref()),
        Commands::Labels { input } => {
            let schema = schema.context("No schema configured; nothing to collect labels for")?;
            let labels = LabelValues::from_schema(&schema);
            let dataset = open_dataset(&config, input.as_deref(), Some(schema))?;
            print_labels(labels, &dataset)
        }
        Commands::Count { input } => {
            let dataset = open_dataset(&config, input.as_deref(), schema)?;
            println!("{}", serde_json::json!({ "value": dataset.len() }));
            Ok(())
        }
    }
}

fn open_dataset(config: &Config, input: Option<&Path>, schema: Option<Schema>) -> Result<Dataset> {
    let path = match input {
        Some(path) => path.to_path_buf(),
        None => config
            .input_path()?
            .context("No input file given; pass --input or set data.input in the configuration")?,
    };
    let dataset = Dataset::open(&path, schema)?;
    info!("Serving {} inputs from {}", dataset.len(), path.display());
    Ok(dataset)
}

fn run_search(dataset: &Dataset, query: &str, print_records: bool) -> Result<()> {
    let parsed = Query::parse(query, dataset.schema())?;
    let hits = parsed.filter_indices(dataset.records());
    info!("{} of {} records match `{}`", hits.len(), dataset.len(), query);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if print_records {
        for &i in &hits {
            if let Some(record) = dataset.get(i) {
                writeln!(out, "{}", serde_json::to_string(record)?)?;
            }
        }
    } else {
        writeln!(out, "{}", serde_json::to_string(&hits)?)?;
    }
    Ok(())
}

fn print_fields(schema: Option<&Schema>) -> Result<()> {
    let Some(schema) = schema else {
        println!("No schema configured.");
        return Ok(());
    };
    if schema.is_empty() {
        println!("Schema declares no fields.");
        return Ok(());
    }
    for field in schema.fields() {
        println!("{}\t{}", field.name, field.kind);
    }
    Ok(())
}

fn print_labels(mut labels: LabelValues, dataset: &Dataset) -> Result<()> {
    for record in dataset.records() {
        labels.observe(record);
    }
    let summary: BTreeMap<&str, Vec<&str>> = labels
        .fields()
        .filter_map(|name| labels.values(name).map(|values| (name, values)))
        .collect();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
