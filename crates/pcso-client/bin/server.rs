use std::sync::Arc;

use anyhow::Result;
use clap::{Arg, Command};
use pcso_client::{PcsoConfig, Pipeline, server::HttpServer};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("pcso-api")
        .version(env!("CARGO_PKG_VERSION"))
        .about("HTTP trigger for the PCSO lotto data pipeline")
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("ADDR")
                .help("Listen address, overrides [http] host"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16))
                .help("Listen port, overrides [http] port"),
        )
        .arg(
            Arg::new("config-check")
                .long("config-check")
                .action(clap::ArgAction::SetTrue)
                .help("Check configuration and exit"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(clap::ArgAction::Count)
                .help("Set verbose output level"),
        )
        .get_matches();

    let log_level = match matches.get_count("verbose") {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    pcso_client::setup(Some(log_level));

    let mut config = PcsoConfig::load()?;
    if let Some(host) = matches.get_one::<String>("host") {
        config.http.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.http.port = *port;
    }

    if matches.get_flag("config-check") {
        return config_check(&config);
    }
    config.validate()?;

    run_server(config).await
}

fn config_check(config: &PcsoConfig) -> Result<()> {
    log::info!("Checking configuration...");
    config.validate()?;

    log::info!("Listen address: {}", config.http.socket_addr()?);
    log::info!("Results site: {}", config.scrape.base_url);
    log::info!("Dataset: {}", config.output.dataset_path().display());
    log::info!("Statistics: {}", config.output.statistics_path().display());
    match &config.import.csv_path {
        Some(path) if path.exists() => log::info!("CSV import: {}", path.display()),
        Some(path) => log::warn!("CSV import {} does not exist yet", path.display()),
        None => log::debug!("No CSV import configured"),
    }

    log::info!("Configuration check: OK");
    Ok(())
}

async fn run_server(config: PcsoConfig) -> Result<()> {
    let pipeline = Arc::new(Pipeline::new(config));
    let (addr, handle) = HttpServer::new(pipeline)?.start().await?;

    log::info!("Health check: GET http://{addr}/api/health");
    log::info!("Update data: POST http://{addr}/api/update-data");
    log::info!("API docs: http://{addr}/api/docs");

    tokio::select! {
        result = handle => {
            if let Err(e) = result {
                log::error!("HTTP server task failed: {e}");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                log::error!("Failed to listen for shutdown signal: {e}");
            }
            log::info!("Shutting down");
        }
    }

    Ok(())
}
