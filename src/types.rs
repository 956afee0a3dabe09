use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Conditions at the pin location around the time the workout was logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub temp_c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "running" => Some(Self::Running),
            "cycling" => Some(Self::Cycling),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃",
            Self::Cycling => "🚴",
        }
    }
}

/// Locally-unique workout identifier: the last ten decimal digits of the
/// creation time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn from_millis(ms: i64) -> Self {
        let digits = ms.unsigned_abs().to_string();
        let start = digits.len().saturating_sub(10);
        Self(digits[start..].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant-specific fields. The derived metric is computed once at
/// construction and stored; reloads keep the stored value as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutDetails {
    Running {
        /// steps/min
        cadence: f64,
        /// min/km
        pace: f64,
    },
    Cycling {
        /// m, may be negative on net-downhill rides
        elevation_gain: f64,
        /// km/h
        speed: f64,
    },
}

impl WorkoutDetails {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: WorkoutId,
    pub coords: Coordinates,
    /// km
    pub distance_km: f64,
    /// min
    pub duration_min: f64,
    pub date: DateTime<Utc>,
    /// How many times the user jumped to this workout's marker.
    pub clicks: u32,
    pub weather: Option<WeatherSnapshot>,
    pub description: String,
    #[serde(flatten)]
    pub details: WorkoutDetails,
}

impl Workout {
    /// Constructors do no validation; callers run the form checks first.
    pub fn running(
        id: WorkoutId,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence: f64,
        weather: Option<WeatherSnapshot>,
        date: DateTime<Utc>,
    ) -> Self {
        let pace = duration_min / distance_km;
        Self::assemble(
            id,
            coords,
            distance_km,
            duration_min,
            weather,
            date,
            WorkoutDetails::Running { cadence, pace },
        )
    }

    pub fn cycling(
        id: WorkoutId,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain: f64,
        weather: Option<WeatherSnapshot>,
        date: DateTime<Utc>,
    ) -> Self {
        let speed = distance_km / (duration_min / 60.0);
        Self::assemble(
            id,
            coords,
            distance_km,
            duration_min,
            weather,
            date,
            WorkoutDetails::Cycling {
                elevation_gain,
                speed,
            },
        )
    }

    fn assemble(
        id: WorkoutId,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        weather: Option<WeatherSnapshot>,
        date: DateTime<Utc>,
        details: WorkoutDetails,
    ) -> Self {
        let description = describe(details.kind(), date);
        Self {
            id,
            coords,
            distance_km,
            duration_min,
            date,
            clicks: 0,
            weather,
            description,
            details,
        }
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    pub fn click(&mut self) {
        self.clicks += 1;
    }
}

fn describe(kind: WorkoutKind, date: DateTime<Utc>) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} on {} {}", kind.label(), month, date.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 9, 30, 0).unwrap()
    }

    fn at() -> Coordinates {
        Coordinates { lat: 48.1, lng: -4.3 }
    }

    #[test]
    fn pace_is_duration_over_distance() {
        let w = Workout::running(WorkoutId::from("1"), at(), 5.0, 30.0, 170.0, None, date());
        let WorkoutDetails::Running { pace, .. } = w.details else {
            panic!("expected a run");
        };
        assert!((pace - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn speed_is_distance_over_hours() {
        let w = Workout::cycling(WorkoutId::from("2"), at(), 20.0, 60.0, 300.0, None, date());
        let WorkoutDetails::Cycling { speed, .. } = w.details else {
            panic!("expected a ride");
        };
        assert!((speed - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn description_names_kind_month_and_day() {
        let run = Workout::running(WorkoutId::from("1"), at(), 5.0, 30.0, 170.0, None, date());
        assert_eq!(run.description, "Running on August 6");

        let jan = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let ride = Workout::cycling(WorkoutId::from("2"), at(), 20.0, 60.0, 300.0, None, jan);
        assert_eq!(ride.description, "Cycling on January 15");
    }

    #[test]
    fn id_keeps_last_ten_digits_of_millis() {
        let ms = date().timestamp_millis();
        let id = WorkoutId::from_millis(ms);
        assert_eq!(id.as_str().len(), 10);
        assert!(ms.to_string().ends_with(id.as_str()));
    }

    #[test]
    fn id_from_short_millis_keeps_all_digits() {
        assert_eq!(WorkoutId::from_millis(42).as_str(), "42");
    }

    #[test]
    fn persisted_form_is_flat_with_a_type_tag() {
        let w = Workout::running(WorkoutId::from("1234567890"), at(), 5.0, 30.0, 170.0, None, date());
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "running");
        assert_eq!(json["cadence"], 170.0);
        assert_eq!(json["distance_km"], 5.0);
        assert_eq!(json["id"], "1234567890");
    }

    #[test]
    fn reload_keeps_stored_derived_metrics_verbatim() {
        let mut w = Workout::cycling(WorkoutId::from("3"), at(), 20.0, 60.0, 300.0, None, date());
        // Simulate a stale stored metric; reload must not recompute it.
        if let WorkoutDetails::Cycling { speed, .. } = &mut w.details {
            *speed = 99.0;
        }
        let json = serde_json::to_string(&w).unwrap();
        let back: Workout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }
}
