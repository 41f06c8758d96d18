use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};

use comfort_core::{
    AppController, Config, HistoryLog, KvStore, Metric, QueryOutcome, QueryParams, QueryState,
    Theme, chart, service_from_config,
    store::keys,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "comfort", version, about = "AI-grounded weather-comfort advisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key used for forecast queries.
    Configure,

    /// Predict weather comfort for a location on a date.
    Daily {
        /// Location name, e.g. "Paris, France". Defaults to the last
        /// queried location.
        location: Option<String>,

        /// Date as YYYY-MM-DD; if absent, means "today".
        #[arg(long)]
        date: Option<String>,
    },

    /// Summarize a country's typical weather comfort for one month.
    Country {
        /// Country name, e.g. "Japan".
        country: String,

        /// Month number, 1-12.
        #[arg(long)]
        month: u32,

        /// Year; defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Inspect, chart, or clear past daily predictions.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Switch the display theme; with no argument, toggles it.
    Theme {
        /// "light" or "dark".
        mode: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List stored predictions, newest first.
    Show,

    /// Forget all stored predictions.
    Clear,

    /// Export one metric's history as an SVG chart.
    Chart {
        /// comfort-score, very-hot, very-cold, very-windy, very-wet, or
        /// very-uncomfortable.
        #[arg(long, default_value = "comfort-score")]
        metric: String,

        /// Defaults to the most recently queried location in history.
        #[arg(long)]
        location: Option<String>,

        /// Output file.
        #[arg(long)]
        out: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Daily { location, date } => daily(location, date).await,
            Command::Country { country, month, year } => country(country, month, year).await,
            Command::History { action } => history(action),
            Command::Theme { mode } => theme(mode),
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("Gemini API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.api_key = Some(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn daily(location: Option<String>, date: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let service = service_from_config(&config)?;
    let mut controller = AppController::new(service, KvStore::open()?);

    let location = match location.or_else(|| controller.last_location().map(str::to_owned)) {
        Some(location) => location,
        None => bail!(
            "No location given and no previous location stored.\n\
             Hint: run `comfort daily <LOCATION>` once; later runs can omit it."
        ),
    };
    let date = match date {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{text}', expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };

    println!("Analyzing weather comfort for {location} on {date}...");
    let state = controller.submit(QueryParams::Daily { location, date }).await;
    report(state)
}

async fn country(country: String, month: u32, year: Option<i32>) -> Result<()> {
    let config = Config::load()?;
    let service = service_from_config(&config)?;
    let mut controller = AppController::new(service, KvStore::open()?);

    let year = year.unwrap_or_else(|| Local::now().year());

    println!("Analyzing typical weather comfort for {country}, month {month}, {year}...");
    let state = controller.submit(QueryParams::Country { country, month, year }).await;
    report(state)
}

fn report(state: &QueryState) -> Result<()> {
    match state {
        QueryState::Success(QueryOutcome::Daily(forecast)) => {
            render::daily(forecast);
            Ok(())
        }
        QueryState::Success(QueryOutcome::Country(overview)) => {
            render::country(overview);
            Ok(())
        }
        QueryState::Failed(message) => bail!("{message}"),
        // submit() always resolves to Success or Failed.
        QueryState::Idle | QueryState::Loading => Ok(()),
    }
}

fn history(action: HistoryAction) -> Result<()> {
    let store = KvStore::open()?;
    let mut log = HistoryLog::load(&store);

    match action {
        HistoryAction::Show => {
            if log.is_empty() {
                println!("No predictions recorded yet.");
            } else {
                render::history_table(log.items());
            }
            Ok(())
        }
        HistoryAction::Clear => {
            log.clear(&store);
            println!("Prediction history cleared.");
            Ok(())
        }
        HistoryAction::Chart { metric, location, out } => {
            let metric = Metric::try_from(metric.as_str())?;

            let location =
                match location.or_else(|| log.locations().first().map(|l| (*l).to_string())) {
                    Some(location) => location,
                    None => bail!("History is empty; run `comfort daily` first."),
                };

            let slice = log.for_location(&location);
            let Some(model) = chart::derive(&slice, metric) else {
                bail!("No history recorded for '{location}'.");
            };

            let svg = render::chart_svg(&model, &location);
            fs::write(&out, svg)
                .with_context(|| format!("Failed to write chart to {}", out.display()))?;

            println!("Wrote {} chart for {location} to {}", metric.label(), out.display());
            Ok(())
        }
    }
}

fn theme(mode: Option<String>) -> Result<()> {
    let store = KvStore::open()?;
    let current = Theme::from_stored(store.get(keys::THEME).as_deref());

    let next = match mode.as_deref() {
        None => current.toggle(),
        Some("light") => Theme::Light,
        Some("dark") => Theme::Dark,
        Some(other) => bail!("Unknown theme '{other}'. Use 'light' or 'dark'."),
    };

    store.set(keys::THEME, next.as_str());
    println!("Theme set to {}.", next.as_str());
    Ok(())
}
