//! movies-audit - analytical SQL auditor for a movie-ratings database
//!
//! A CLI tool that runs a fixed set of analytical queries against a
//! PostgreSQL movies/ratings dataset and writes the results to a text
//! report file.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, connection, or query failure)

mod audit;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod report;

use anyhow::{Context, Result};
use audit::Auditor;
use cli::Args;
use config::Config;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("movies-audit v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_audit(args).await {
        Ok(()) => {
            std::process::exit(0);
        }
        Err(e) => {
            error!("Audit failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .movies-audit.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".movies-audit.toml");

    if path.exists() {
        eprintln!("⚠️  .movies-audit.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .movies-audit.toml")?;

    println!("✅ Created .movies-audit.toml with default settings.");
    println!("   Edit it to customize the database connection, tables, and output path.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete audit workflow: audit the database, then save the
/// report. The report is only written if every query succeeded.
async fn run_audit(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Dry run needs no credentials: show the plan and exit
    if args.dry_run {
        return handle_dry_run(&config);
    }

    // Credential resolution happens here, before any I/O
    let mut auditor = Auditor::new(&config)?;

    info!("Starting movies audit...");
    println!(
        "🔍 Auditing {}:{}/{}...",
        config.database.host, config.database.port, config.database.dbname
    );

    auditor.audit().await.context("Audit aborted")?;

    auditor.save().context("Failed to save report")?;

    info!(
        "Finished audit. Results can be found in {}",
        auditor.output_path().display()
    );
    println!(
        "\n✅ Audit complete! {} results written to: {}",
        auditor.report().len(),
        auditor.output_path().display()
    );

    Ok(())
}

/// Handle --dry-run: print the queries the audit would execute and exit.
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("\n🔍 Dry run: showing audit queries (no database connection)...\n");

    for (key, sql) in audit::planned_statements(&config.tables, &config.queries) {
        println!("── {} ──", key);
        println!("{}\n", sql.trim());
    }

    println!("✅ Dry run complete. No queries were executed.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .movies-audit.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
