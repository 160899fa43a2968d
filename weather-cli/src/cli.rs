use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use weather_core::{City, Config, ForecastMode};

use crate::{menu, session::Session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Fetch Open-Meteo forecasts for a few cities and save them as JSON and XLSX"
)]
pub struct Cli {
    /// Read configuration from this file instead of the platform config directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the forecast mode from the configuration.
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    /// Runs the interactive menu when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pick cities from a numbered menu until you choose to exit.
    Menu,

    /// Fetch and save the forecast for the given cities without prompting.
    Fetch {
        /// City names or their menu numbers (1-based).
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        cities: Vec<String>,

        /// Process every city in the lookup table.
        #[arg(long)]
        all: bool,
    },

    /// List the configured cities.
    Cities,

    /// Write the default configuration file.
    InitConfig {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Every hour of today's forecast.
    FullDay,
    /// Only the current hour.
    SingleHour,
}

impl From<ModeArg> for ForecastMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::FullDay => ForecastMode::FullDay,
            ModeArg::SingleHour => ForecastMode::SingleHour,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            None | Some(Command::Menu) => {
                let config = load_config(self.config.as_deref(), self.mode)?;
                let session = Session::from_config(&config)?;
                menu::run(&session, &config.cities).await?;
            }
            Some(Command::Fetch { cities, all }) => {
                let config = load_config(self.config.as_deref(), self.mode)?;
                let selected = if all {
                    config.cities.clone()
                } else {
                    resolve_cities(&config, &cities)?
                };

                let session = Session::from_config(&config)?;
                let done = session.process(&selected).await;
                println!("🎉 Processed {done}/{} selected cities.", selected.len());
            }
            Some(Command::Cities) => {
                let config = load_config(self.config.as_deref(), self.mode)?;
                for (i, city) in config.cities.iter().enumerate() {
                    println!("{}. {} ({}, {})", i + 1, city.name, city.latitude, city.longitude);
                }
            }
            Some(Command::InitConfig { force }) => init_config(self.config, force)?,
        }

        Ok(())
    }
}

/// Explicit file if given, else the platform config (or built-in defaults), then the mode override.
fn load_config(path: Option<&Path>, mode: Option<ModeArg>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(mode) = mode {
        config.forecast.mode = mode.into();
    }

    Ok(config)
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::config_file_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists: {}\n\
             Hint: pass `--force` to replace it.",
            path.display()
        );
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("Failed to initialise config at {}", path.display()))?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Resolve each argument as a 1-based menu number or a city name.
fn resolve_cities(config: &Config, args: &[String]) -> anyhow::Result<Vec<City>> {
    args.iter()
        .map(|arg| {
            let by_number = arg
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| config.city(i));

            by_number.or_else(|| config.city_by_name(arg)).cloned().ok_or_else(|| {
                let known: Vec<&str> = config.cities.iter().map(|c| c.name.as_str()).collect();
                anyhow!("Unknown city '{arg}'. Known cities: {}.", known.join(", "))
            })
        })
        .collect()
}
