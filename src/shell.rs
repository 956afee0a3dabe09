//! The imperative layer: reads commands, feeds intents to the app core,
//! and carries out the effects it gets back. Background work (weather
//! fetches, the form-collapse timer, stdin itself) reports back through
//! one channel, so all state mutation stays on this thread.

use anyhow::Result;
use chrono::Utc;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::app::{
    self, AppState, Effect, FORM_COLLAPSE_MS, FormTarget, Intent, RequestId, TimerToken,
};
use crate::dlog;
use crate::map::MapPort;
use crate::render;
use crate::store::{Storage, WorkoutStore};
use crate::types::{Coordinates, Workout, WorkoutId, WorkoutKind};
use crate::validate::FormInput;
use crate::weather::WeatherProvider;

pub enum ShellEvent {
    Line(String),
    Intent(Intent),
    Eof,
}

#[derive(Debug, PartialEq)]
enum ParsedLine {
    Intent(Intent),
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
    Usage(&'static str),
}

pub struct Shell<S, M> {
    state: AppState,
    store: WorkoutStore<S>,
    map: M,
    weather: Option<Arc<dyn WeatherProvider>>,
    tx: Sender<ShellEvent>,
    rx: Receiver<ShellEvent>,
}

impl<S: Storage, M: MapPort> Shell<S, M> {
    pub fn new(
        store: WorkoutStore<S>,
        map: M,
        weather: Option<Arc<dyn WeatherProvider>>,
        workouts: Vec<Workout>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: AppState::new(workouts),
            store,
            map,
            weather,
            tx,
            rx,
        }
    }

    pub fn run(&mut self, home: Option<Coordinates>) -> Result<()> {
        let effects = app::bootstrap(&mut self.state, home);
        self.apply(effects);

        spawn_stdin_reader(&self.tx);
        println!("balizenn — `help` lists commands");
        self.prompt();

        while let Ok(event) = self.rx.recv() {
            match event {
                ShellEvent::Line(line) => match parse_line(&line) {
                    ParsedLine::Intent(intent) => {
                        self.dispatch(intent);
                        self.prompt();
                    }
                    ParsedLine::Show => self.print_list(),
                    ParsedLine::Help => print_help(),
                    ParsedLine::Quit => break,
                    ParsedLine::Empty => {}
                    ParsedLine::Unknown(cmd) => {
                        println!("unknown command: {cmd} (try `help`)");
                    }
                    ParsedLine::Usage(msg) => println!("{msg}"),
                },
                ShellEvent::Intent(intent) => self.dispatch(intent),
                ShellEvent::Eof => break,
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, intent: Intent) {
        let effects = app::update(&mut self.state, intent, Utc::now());
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetView { center, zoom } => self.map.set_view(center, zoom),
                Effect::FitBounds(bounds) => self.map.fit_bounds(bounds),
                Effect::PlaceMarker { id, at, popup } => self.map.place_marker(id, at, popup),
                Effect::SetMarkerPopup { id, popup } => self.map.set_popup(id, popup),
                Effect::RemoveMarker(id) => self.map.remove_marker(id),
                Effect::RenderList => self.print_list(),
                Effect::ReportErrors(errors) => {
                    for e in errors {
                        println!("{}: {}", e.field.name(), e.kind.message());
                    }
                }
                Effect::FetchWeather { request, at } => self.fetch_weather(request, at),
                Effect::StartCollapseTimer { token } => {
                    spawn_collapse_timer(self.tx.clone(), token);
                }
                Effect::CollapseForm => {
                    dlog!("form collapsed");
                }
                Effect::Persist => {
                    if let Err(err) = self.store.save(&self.state.workouts) {
                        tracing::warn!(%err, "saving workouts failed; memory and store now differ");
                    }
                }
                Effect::ClearStorage => {
                    if let Err(err) = self.store.clear() {
                        tracing::warn!(%err, "clearing the store failed");
                    }
                }
            }
        }
    }

    fn fetch_weather(&self, request: RequestId, at: Coordinates) {
        let Some(provider) = self.weather.clone() else {
            dlog!("weather disabled, skipping fetch");
            return;
        };
        let tx = self.tx.clone();
        thread::spawn(move || match provider.current(at) {
            Ok(report) => {
                let _ = tx.send(ShellEvent::Intent(Intent::WeatherArrived { request, report }));
            }
            Err(err) => tracing::warn!(%err, "weather lookup failed"),
        });
    }

    fn prompt(&self) {
        let Some(form) = &self.state.form else {
            return;
        };
        match (&form.target, form.confirm_delete) {
            (FormTarget::Create { at }, _) => println!(
                "new workout at {at} — `log <running|cycling> <distance-km> <duration-min> <cadence|elevation-gain>`"
            ),
            (FormTarget::Edit { id }, false) => {
                if let Some(w) = self.state.workout(id) {
                    println!("{}", render::edit_prompt(w));
                }
            }
            (FormTarget::Edit { .. }, true) => {
                println!("delete this workout? `confirm` or `cancel`");
            }
        }
    }

    fn print_list(&self) {
        for line in render::render_list(&self.state.workouts, self.state.sort) {
            println!("{line}");
        }
    }
}

fn spawn_stdin_reader(tx: &Sender<ShellEvent>) {
    let tx = tx.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(ShellEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(ShellEvent::Eof);
    });
}

fn spawn_collapse_timer(tx: Sender<ShellEvent>, token: TimerToken) {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(FORM_COLLAPSE_MS));
        let _ = tx.send(ShellEvent::Intent(Intent::CollapseTimerElapsed { token }));
    });
}

fn parse_line(line: &str) -> ParsedLine {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return ParsedLine::Empty;
    };
    let args: Vec<&str> = parts.collect();
    match cmd {
        "pin" => parse_pin(&args),
        "log" => parse_log(&args),
        "edit" => parse_id(&args, "usage: edit <id>", |id| Intent::OpenEdit { id }),
        "goto" => parse_id(&args, "usage: goto <id>", |id| Intent::SelectWorkout { id }),
        "delete" => ParsedLine::Intent(Intent::RequestDelete),
        "confirm" => ParsedLine::Intent(Intent::ConfirmDelete),
        "cancel" => ParsedLine::Intent(Intent::CancelDelete),
        "clear" => ParsedLine::Intent(Intent::DeleteAll),
        "sort" => ParsedLine::Intent(Intent::ToggleSort),
        "fit" => ParsedLine::Intent(Intent::ViewAll),
        "close" => ParsedLine::Intent(Intent::Dismiss),
        "list" => ParsedLine::Show,
        "help" => ParsedLine::Help,
        "quit" | "exit" => ParsedLine::Quit,
        other => ParsedLine::Unknown(other.to_owned()),
    }
}

fn parse_pin(args: &[&str]) -> ParsedLine {
    let (Some(lat), Some(lng)) = (args.first(), args.get(1)) else {
        return ParsedLine::Usage("usage: pin <lat> <lng>");
    };
    let (Ok(lat), Ok(lng)) = (lat.parse(), lng.parse()) else {
        return ParsedLine::Usage("pin: coordinates must be numbers");
    };
    ParsedLine::Intent(Intent::ClickMap {
        at: Coordinates { lat, lng },
    })
}

/// Field tokens pass through raw; the form validation decides what they
/// mean, so a missing token surfaces as an empty-field error there.
fn parse_log(args: &[&str]) -> ParsedLine {
    let Some(kind) = args.first().and_then(|s| WorkoutKind::parse(s)) else {
        return ParsedLine::Usage(
            "usage: log <running|cycling> <distance-km> <duration-min> <cadence|elevation-gain>",
        );
    };
    let field = |i: usize| args.get(i).copied().unwrap_or_default().to_owned();
    let input = match kind {
        WorkoutKind::Running => FormInput {
            kind,
            distance: field(1),
            duration: field(2),
            cadence: field(3),
            elevation: String::new(),
        },
        WorkoutKind::Cycling => FormInput {
            kind,
            distance: field(1),
            duration: field(2),
            cadence: String::new(),
            elevation: field(3),
        },
    };
    ParsedLine::Intent(Intent::Submit { input })
}

fn parse_id(args: &[&str], usage: &'static str, make: fn(WorkoutId) -> Intent) -> ParsedLine {
    args.first().map_or(ParsedLine::Usage(usage), |raw| {
        ParsedLine::Intent(make(WorkoutId::from(*raw)))
    })
}

fn print_help() {
    println!("commands:");
    println!("  pin <lat> <lng>                          drop a pin and open the workout form");
    println!("  log <running|cycling> <km> <min> <extra> submit the form (extra: cadence or elevation gain)");
    println!("  edit <id>                                open a workout for editing");
    println!("  goto <id>                                pan the map to a workout");
    println!("  delete / confirm / cancel                remove the workout being edited");
    println!("  clear                                    remove all workouts");
    println!("  sort                                     toggle date sort order");
    println!("  fit                                      bring all workouts into view");
    println!("  close                                    close the open form");
    println!("  list                                     reprint the workout list");
    println!("  quit                                     leave");
}
