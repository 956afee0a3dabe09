//! Text rendering for the sidebar list and marker popups. Rendering is
//! full-replace: every call regenerates the whole output from the
//! current state, no diffing.

use crate::app::SortOrder;
use crate::map::MarkerPopup;
use crate::types::{WeatherSnapshot, Workout, WorkoutDetails};

pub fn render_list(workouts: &[Workout], sort: SortOrder) -> Vec<String> {
    if workouts.is_empty() {
        return vec!["No workouts yet — `pin <lat> <lng>` to start one.".to_owned()];
    }

    let mut lines = Vec::with_capacity(workouts.len() * 3 + 2);
    lines.push(format!("⇵ sort: {}", sort_label(sort)));
    for w in workouts {
        lines.extend(workout_card(w));
    }
    lines.push("actions: fit (view all) · clear (remove all)".to_owned());
    lines
}

pub fn workout_card(w: &Workout) -> Vec<String> {
    let metrics = match &w.details {
        WorkoutDetails::Running { cadence, pace } => format!(
            "    {} km  ⏱ {} min  ⚡ {:.1} min/km  🦶 {} spm",
            w.distance_km, w.duration_min, pace, cadence
        ),
        WorkoutDetails::Cycling {
            elevation_gain,
            speed,
        } => format!(
            "    {} km  ⏱ {} min  ⚡ {:.1} km/h  ⛰ {} m",
            w.distance_km, w.duration_min, speed, elevation_gain
        ),
    };
    vec![
        format!("[{}] {} {}", w.id, w.kind().icon(), w.description),
        format!("    📍 {}", weather_line(w.weather.as_ref())),
        metrics,
    ]
}

pub fn weather_line(weather: Option<&WeatherSnapshot>) -> String {
    weather.map_or_else(
        || "Unavailable".to_owned(),
        |w| format!("{} {:.1} °C", w.location, w.temp_c),
    )
}

pub fn popup(w: &Workout) -> MarkerPopup {
    MarkerPopup {
        kind: w.kind(),
        text: format!(
            "{} {}\n📍 {}",
            w.kind().icon(),
            w.description,
            weather_line(w.weather.as_ref())
        ),
    }
}

/// Prefilled edit prompt, mirroring the values already on the record.
pub fn edit_prompt(w: &Workout) -> String {
    match &w.details {
        WorkoutDetails::Running { cadence, .. } => format!(
            "editing [{}] {} — submit with `log running {} {} {}` (adjust as needed), `delete` to remove",
            w.id, w.description, w.distance_km, w.duration_min, cadence
        ),
        WorkoutDetails::Cycling { elevation_gain, .. } => format!(
            "editing [{}] {} — submit with `log cycling {} {} {}` (adjust as needed), `delete` to remove",
            w.id, w.description, w.distance_km, w.duration_min, elevation_gain
        ),
    }
}

pub const fn sort_label(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Ascending => "ASCENDING",
        SortOrder::Descending => "DESCENDING",
    }
}
