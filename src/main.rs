use clap::Parser;
use mme_soleil::app::{export, server};
use mme_soleil::config::cli::{Cli, Command, ForecastArgs};
use mme_soleil::config::env_file::load_env_file;
use mme_soleil::config::Settings;
use mme_soleil::domain::ports::Storage;
use mme_soleil::utils::{logger, validation::Validate};
use mme_soleil::{LocalStorage, Result, SoleilError};
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

/// Loads the env file and the settings, then starts the logger.
fn load_settings(cli: &Cli) -> Result<Settings> {
    // the env file may set LOG_FORMAT and RUST_LOG, so it goes first
    let loaded = match cli.common.env_file() {
        Some(path) => Some((load_env_file(&path)?, path)),
        None => None,
    };

    let settings = Settings::from_env()?;
    logger::init_logger(&settings.log_format, cli.common.verbose);

    match loaded {
        Some((count, path)) => {
            tracing::info!("Loaded {} variables from {}", count, path.display())
        }
        None => tracing::info!("Environment file loading disabled"),
    }

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }
    Ok(settings)
}

async fn run(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;

    match cli.command() {
        Command::Serve(args) => {
            let addr = args.bind_addr()?;
            tracing::info!("Starting Madame Soleil");
            server::serve(settings, addr).await
        }
        Command::Forecast(args) => forecast(&settings, &args).await,
        Command::Check => {
            check(&settings);
            Ok(())
        }
    }
}

async fn forecast(settings: &Settings, args: &ForecastArgs) -> Result<()> {
    let solar = server::build_solar_service(settings);
    let start_date = args.start_date.unwrap_or_else(|| solar.today());
    let csv = export::export_forecast(&solar, start_date, args.days).await?;

    match &args.output {
        Some(path) => {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| SoleilError::InvalidConfigValue {
                    field: "--output".to_string(),
                    value: path.display().to_string(),
                    reason: "expected a file path".to_string(),
                })?;
            let base = path.parent().unwrap_or_else(|| std::path::Path::new(""));
            LocalStorage::new(base).write_file(file_name, &csv).await?;
            tracing::info!("📁 Forecast saved to: {}", path.display());
        }
        None => {
            std::io::stdout().write_all(&csv)?;
        }
    }
    Ok(())
}

fn check(settings: &Settings) {
    let location = &settings.location;
    println!("✅ Configuration is valid");
    println!(
        "📍 Site: {:.4}, {:.4} at {} m ({})",
        location.latitude,
        location.longitude,
        location.altitude,
        location.timezone.name()
    );
    for (i, array) in settings.arrays.iter().enumerate() {
        println!(
            "☀️ Array {}: {} modules, tilt {}°, azimuth {}°",
            i + 1,
            array.modules_per_string,
            array.tilt,
            array.azimuth
        );
    }
    println!("🔌 Panel: {} / Inverter: {}", settings.panel.name, settings.inverter.name);
    println!("🌦️ Forecast endpoint: {}", settings.openmeteo_endpoint);
}
