#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use balizenn::map::ConsoleMap;
use balizenn::shell::Shell;
use balizenn::store::{SqliteStorage, WorkoutStore};
use balizenn::weather::{WeatherApiClient, WeatherProvider};
use balizenn::{cli, utils};
use clap::Parser;

#[macro_use]
extern crate balizenn;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let storage = SqliteStorage::open(&cli.store)?;
    let store = WorkoutStore::new(storage);
    let workouts = store.load().context("Loading stored workouts")?;
    dlog!("loaded workouts={}", workouts.len());

    let key = cli
        .weather_key
        .or_else(|| env::var("WEATHER_API_KEY").ok());
    let weather: Option<Arc<dyn WeatherProvider>> = match key {
        Some(key) => Some(Arc::new(WeatherApiClient::new(cli.weather_url, key))),
        None => {
            tracing::info!("no weather API key; workouts will be logged without weather");
            None
        }
    };

    if cli.home.is_none() {
        dlog!("no home position configured");
    }

    let mut shell = Shell::new(store, ConsoleMap::new(), weather, workouts);
    shell.run(cli.home)
}
