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
use std::fs;
use std::sync::Arc;
use tumblr_archive::{
    select_candidates, ArchiveConfig, Archiver, CommandLineInput, HttpTransport, PaginatedClient,
    RunReport, SnapshotStore, SystemClock, TumblrApi, TumblrRepository,
};

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("tumblr_archive.log");
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
    Ok(())
}

/// Selects the configured posts and archives the stale ones.
async fn execute_run(config: &ArchiveConfig) -> anyhow::Result<RunReport> {
    let clock = Arc::new(SystemClock);
    let transport = Arc::new(HttpTransport::new(&config.api_key)?);
    let api = TumblrApi::new(PaginatedClient::new(
        transport,
        clock.clone(),
        config.client_settings(),
    ));
    let store = SnapshotStore::new(&config.archive_dir);

    let candidates = select_candidates(&api, &config.blog, &config.selection)
        .await
        .context("selecting posts")?;
    log::info!("{} posts selected", candidates.len());

    let archiver = Archiver::new(&api, clock.as_ref(), &store, &config.blog)
        .with_policy(config.staleness_policy())
        .with_options(config.options.clone());

    match archiver.run(candidates).await {
        Ok(report) => Ok(report),
        Err(e) => {
            println!("{} requests.", api.request_count());
            Err(e).context("archiving posts")
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("setting up logging")?;

    let config = ArchiveConfig::resolve(cli)?;

    let report = execute_run(&config).await?;

    for (id, error) in &report.failed {
        eprintln!("✗ {}: {}", id, error);
    }
    println!("{}", report);
    println!("{} requests.", report.requests);

    if !report.is_success() {
        anyhow::bail!("{} posts failed", report.failed.len());
    }
    Ok(())
}
