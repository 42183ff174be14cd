//! Data-quality profiler.
//!
//! This binary connects to a named database environment, profiles a sample
//! of every table column by column, runs the SQL validation rules found in
//! the rules directory, and writes everything to one JSON report.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - Passwords are prompted, never taken from arguments, and zeroized
//! - Connection URLs are redacted in logs

mod environments;
mod output;

use std::path::PathBuf;

use clap::Parser;
use dq_profiler_core::{
    AnalyzerRegistry, Environment, EnvironmentScope, ProfilerConfig, Result, SamplingConfig,
    ValidationConfig, adapters::DEFAULT_SAMPLE_SIZE, aggregate, create_data_source,
    error::redact_database_url, load_rules, logging::init_logging, profile, run_validations,
    validation::DEFAULT_RULES_DIR,
};
use tracing::{error, info};

use environments::{Credentials, ENVIRONMENTS_FILE, Environments, example_document};
use output::{DEFAULT_OUTPUT, ReportDocument, save_report};

#[derive(Parser)]
#[command(name = "dq-profiler")]
#[command(about = "Profiles database columns and runs SQL validation rules")]
#[command(version)]
#[command(long_about = "
dq-profiler - column profiling and SQL validation for relational databases

For every table in the selected environment the profiler draws a random
sample and reports, per column: missing and distinct ratios, candidate keys,
percentiles, mode, CPF/CNPJ validity, hash-like values and personal names.

Every .sql file in the rules directory is then run against each table.
Header lines of the form

  # filtro[var]: semantic_type == 'STRING'

bind {var} to the matching columns; {tabela} is the (filtered) table.

SUPPORTED DATABASES:
- SQLite (sqlite:// or .db/.sqlite files)
- SQL Server and Oracle SQL generation (no connection backend compiled in)

EXAMPLES:
  dq-profiler --ambiente local --amostra 5000
  dq-profiler --ambiente prod --usuario scott --schema SALES --tables ORDERS ITEMS
  dq-profiler --where \"created >= '2024-01-01'\" --regras ./rules --output report.json
")]
pub struct Cli {
    /// Environment name from the environment file (defaults to the first one)
    #[arg(long, env = "DQ_PROFILER_AMBIENTE", value_name = "ID")]
    pub ambiente: Option<String>,

    /// Environment parameter file
    #[arg(long, default_value = ENVIRONMENTS_FILE, value_name = "FILE")]
    pub ambientes: PathBuf,

    /// User name substituted into the connection URL
    #[arg(long, value_name = "LOGIN")]
    pub usuario: Option<String>,

    /// Database name (Oracle owner)
    #[arg(long, value_name = "BD")]
    pub database: Option<String>,

    /// Only profile this schema
    #[arg(long, value_name = "SCHEMA")]
    pub schema: Option<String>,

    /// Only profile these tables
    #[arg(long, num_args = 1.., value_delimiter = ',', value_name = "TABELA")]
    pub tables: Vec<String>,

    /// Row filter applied to every count, sample, and rule query
    #[arg(long = "where", value_name = "FILTRO")]
    pub filter: Option<String>,

    /// Number of rows sampled per table
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE, value_name = "N")]
    pub amostra: u64,

    /// Directory holding validation rules
    #[arg(long, default_value = DEFAULT_RULES_DIR, value_name = "DIR")]
    pub regras: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT, value_name = "ARQUIVO")]
    pub output: PathBuf,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet)?;

    let Some(environments) = Environments::load(&cli.ambientes).await? else {
        eprintln!(
            "Environment file {} not found. Create it to proceed. Example content:",
            cli.ambientes.display()
        );
        eprintln!("{}", example_document());
        std::process::exit(1);
    };

    let name = cli
        .ambiente
        .clone()
        .or_else(|| environments.default_name().map(str::to_string));
    let Some((name, params)) = name
        .as_deref()
        .and_then(|n| environments.get(n).map(|p| (n, p)))
    else {
        eprintln!(
            "Environment {} not found. Available environments: {:?}",
            cli.ambiente.as_deref().unwrap_or("<none>"),
            environments.names()
        );
        std::process::exit(1);
    };

    let credentials =
        Credentials::prompt_missing(&params.url, cli.usuario.clone(), cli.database.clone())?;
    let url = credentials.resolve_url(&params.url)?;
    drop(credentials);

    run(&cli, name, &url).await.map_err(|e| {
        error!("Profiling failed: {}", e);
        e
    })
}

/// Profiles and validates one environment, then writes the report.
async fn run(cli: &Cli, name: &str, url: &str) -> Result<()> {
    info!("Environment: {}", name);
    info!("Target: {}", redact_database_url(url));

    let source = create_data_source(url).await?;

    let mut scope = EnvironmentScope::new().with_tables(cli.tables.iter().cloned());
    if let Some(ref database) = cli.database {
        scope = scope.with_database(database.clone());
    }
    if let Some(ref schema) = cli.schema {
        scope = scope.with_schema(schema.clone());
    }

    let sampling = SamplingConfig::new().with_sample_size(cli.amostra);

    let env = Environment::new(source)
        .with_scope(scope)
        .with_filter(cli.filter.clone());
    env.test_connection().await?;
    info!("Connected to {} data source", env.dialect().name());

    let registry = AnalyzerRegistry::with_builtins()?;
    let report = profile(&env, &registry, &ProfilerConfig::new().with_sampling(sampling)).await?;

    let validation_config = ValidationConfig::new().with_rules_dir(cli.regras.clone());
    let rules = load_rules(&validation_config).await;
    let outcomes = run_validations(&env, &rules, &report, &validation_config).await;
    let aggregated = aggregate(report, outcomes);

    let document = ReportDocument::new(
        env.tables().await?.to_vec(),
        env.columns().await?.to_vec(),
        aggregated,
    );

    info!("Writing {}", cli.output.display());
    save_report(&document, &cli.output).await?;

    println!("Profiling completed successfully");
    println!("Output: {}", cli.output.display());
    println!("Tables: {}", document.tables.len());
    println!("Columns profiled: {}", document.profile.len());
    println!("Rules loaded: {}", rules.len());
    println!(
        "Multi-column validations: {}",
        document.multi_column_validations.len()
    );

    Ok(())
}
