// src/main.rs
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion2vault::{
    CommandLineInput, FsVault, HttpAssetSource, MigrationConfig, MigrationLog, Migrator,
    NotionHttpClient,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = log_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::env::temp_dir().join("notion2vault.log"));
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(log_file_path)
}

async fn run(config: MigrationConfig) -> anyhow::Result<()> {
    let migration_log = MigrationLog::new(&config.migration_log);
    if config.clear_log {
        migration_log
            .clear()
            .await
            .context("Failed to clear the migration log")?;
    }
    log::debug!("Migration log: {}", migration_log.path().display());

    let repository = Arc::new(
        NotionHttpClient::new(&config.api_key).context("Failed to create the Notion client")?,
    );
    let migrator = Migrator::new(
        repository,
        Arc::new(HttpAssetSource::new()),
        Arc::new(FsVault::new(&config.vault)),
        config.conversion.clone(),
    )
    .with_concurrency(config.concurrency)
    .with_migration_log(migration_log);

    let cancel = migrator.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, finishing documents already started");
            cancel.cancel();
        }
    });

    let report = migrator
        .run(&config.collection)
        .await
        .with_context(|| format!("Migration of {} failed", config.collection))?;

    for (id, reason) in &report.failed {
        log::warn!("Failed: {} ({})", id, reason);
    }
    println!("{}", report);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();
    let verbose = cli.verbose;
    let log_file = cli.log_file.clone();

    if let Err(e) = setup_logging(verbose, log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = MigrationConfig::resolve(cli).context("Invalid configuration")?;
    log::debug!("Vault: {}", config.vault.display());
    run(config).await
}
