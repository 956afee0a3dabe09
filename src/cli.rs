use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::types::Coordinates;
use crate::weather;

const DEFAULT_STORE: &str = "balizenn.db";

#[derive(Parser, Debug)]
#[command(
    name = "balizenn",
    about = "Pin running and cycling workouts on a map and keep them in a local store"
)]
pub struct Cli {
    /// Path to the local workout store (SQLite).
    #[arg(long, value_name = "FILE", default_value = DEFAULT_STORE)]
    pub store: PathBuf,

    /// Starting map position as `lat,lng`, used while no workouts exist yet.
    #[arg(long, value_name = "LAT,LNG", value_parser = parse_coordinates)]
    pub home: Option<Coordinates>,

    /// Weather API key. Falls back to WEATHER_API_KEY; without either,
    /// workouts are logged with no weather snapshot.
    #[arg(long, value_name = "KEY")]
    pub weather_key: Option<String>,

    /// Weather endpoint base URL.
    #[arg(long, value_name = "URL", default_value = weather::DEFAULT_API_URL)]
    pub weather_url: String,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

fn parse_coordinates(raw: &str) -> Result<Coordinates, String> {
    let Some((lat, lng)) = raw.split_once(',') else {
        return Err("expected `lat,lng`".to_owned());
    };
    let lat = lat
        .trim()
        .parse()
        .map_err(|_| format!("bad latitude: {lat}"))?;
    let lng = lng
        .trim()
        .parse()
        .map_err(|_| format!("bad longitude: {lng}"))?;
    Ok(Coordinates { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_with_spaces() {
        let c = parse_coordinates("48.1, -4.3").unwrap();
        assert!((c.lat - 48.1).abs() < f64::EPSILON);
        assert!((c.lng - -4.3).abs() < f64::EPSILON);
    }

    #[test]
    fn coordinates_need_a_comma_and_numbers() {
        assert!(parse_coordinates("48.1").is_err());
        assert!(parse_coordinates("north,west").is_err());
    }
}
