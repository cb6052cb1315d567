use uls_radio::cli::{Cli, RunPlan};
use uls_radio::config::AppConfig;
use uls_radio::module::channel::ChannelNameSynthesizer;
use uls_radio::module::export::{ExportPlan, RadioProfile};
use uls_radio::module::uls::{
    ArchiveFetcher, FlatFileLoader, FlatTable, LoadLedger, QueryEngine, UlsStore, ingest_archives, table_exists,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use uls_common::SourceArchive;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (config, config_found) = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to read config {:?}", cli.config))?;

    // Initialize logging
    let level = uls_radio::logging::effective_level(&config.log_level, cli.verbose);
    let _logging_guard = uls_radio::logging::init_logging(&config.log_dir, "uls-radio", level)?;

    if config_found {
        tracing::info!("Loaded configuration from {:?}", cli.config);
    } else {
        tracing::debug!("{:?} not found, using default configuration", cli.config);
    }

    if cli.list_radios {
        println!("Supported radio models:");
        println!("{}", RadioProfile::supported_names().join(", "));
        return Ok(());
    }

    if cli.list_zipfiles {
        println!("Supported ZIP files are:");
        println!("{}", SourceArchive::supported_names().join(", "));
        return Ok(());
    }

    if cli.list_services {
        return list_services(&config);
    }

    let plan = cli.validate(&config)?;
    run(&config, plan).await
}

fn list_services(config: &AppConfig) -> Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        println!("No cache at {:?} yet. Run a search first to load data", db_path);
        return Ok(());
    }

    let store = UlsStore::open(&db_path)?;
    if !table_exists(store.conn(), FlatTable::Hd.name())? {
        println!("No service codes loaded yet");
        return Ok(());
    }

    let codes = QueryEngine::new(store.conn()).list_service_codes()?;
    println!("Available service codes in the database:");
    println!("{}", codes.join(", "));
    Ok(())
}

async fn run(config: &AppConfig, plan: RunPlan) -> Result<()> {
    let db_path = config.db_path();

    if db_path.exists() {
        if plan.clear_cache {
            tracing::info!("{:?} exists, but re-creating database because --clear-cache was specified", db_path);
            UlsStore::remove(&db_path)?;
        } else {
            tracing::info!("{:?} exists. Using existing database. Use --clear-cache to re-create it", db_path);
        }
    }

    let mut store = UlsStore::open(&db_path).with_context(|| format!("Failed to open cache {:?}", db_path))?;
    LoadLedger::new(store.conn()).ensure()?;

    let fetcher = ArchiveFetcher::new(
        config.base_url.as_str(),
        config.data_dir.as_path(),
        Duration::from_secs(config.download_timeout_secs),
    )?;
    let loader = FlatFileLoader::new(config.sample_lines);

    let report = ingest_archives(&mut store, &fetcher, &loader, &plan.archives, plan.clear_cache).await?;
    if !report.failed.is_empty() {
        tracing::warn!("Some archives failed to load, results may be incomplete: {}", report);
    }

    let records = QueryEngine::new(store.conn()).search(&plan.search)?;
    if records.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("\n{}", plan.label());
    for record in &records {
        println!("{}", record);
    }

    let mut synthesizer = ChannelNameSynthesizer::new(plan.naming);
    let export = ExportPlan::build(plan.profile, &records, &mut synthesizer, plan.channel_offset);
    let path = export.write_file(&config.output_dir)?;

    println!("\nCSV file written: {}", path.display());
    Ok(())
}
