use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use tracing::debug;
use weathercard_core::{Config, CwbProvider, WeatherCoordinator};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathercard", version, about = "CWB weather card in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the CWB open-data API key and the card locations.
    Configure {
        /// API key; prompted for interactively when omitted.
        #[arg(long)]
        api_key: Option<String>,

        /// Observation station name; prompted for when omitted.
        #[arg(long)]
        station: Option<String>,

        /// Forecast area name; prompted for when omitted.
        #[arg(long)]
        area: Option<String>,
    },

    /// Fetch the latest observation and forecast and print the card.
    Show {
        /// Keep the card open and offer a manual refresh.
        #[arg(long)]
        watch: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure {
                api_key,
                station,
                area,
            } => configure(api_key, station, area),
            Command::Show { watch } => show(watch).await,
        }
    }
}

fn configure(
    api_key: Option<String>,
    station: Option<String>,
    area: Option<String>,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("CWB open-data API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };
    config.api_key = Some(api_key);

    config.observation_station = match station {
        Some(station) => station,
        None => Text::new("Observation station:")
            .with_initial_value(&config.observation_station)
            .prompt()
            .context("Failed to read observation station")?,
    };

    config.forecast_location = match area {
        Some(area) => area,
        None => Text::new("Forecast area:")
            .with_initial_value(&config.forecast_location)
            .prompt()
            .context("Failed to read forecast area")?,
    };

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(watch: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = CwbProvider::from_config(&config)?;
    let coordinator = WeatherCoordinator::new(Arc::new(provider));

    // Initial refresh: with nothing on the card yet, a failure is fatal.
    coordinator
        .refresh()
        .await
        .context("Failed to fetch weather data")?;
    print!("{}", render::render(&coordinator.display()));

    if !watch {
        return Ok(());
    }

    loop {
        let again = Confirm::new("Refresh?")
            .with_default(true)
            .prompt()
            .context("Failed to read refresh prompt")?;
        if !again {
            return Ok(());
        }

        // Later failures keep the last good card on screen.
        match coordinator.refresh().await {
            Ok(outcome) => debug!(?outcome, "manual refresh finished"),
            Err(err) => eprintln!("refresh failed: {err} (showing last good data)"),
        }
        print!("{}", render::render(&coordinator.display()));
    }
}
