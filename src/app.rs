//! Application core: an explicit state struct and one transition
//! function. Frontend events arrive as [`Intent`] values; everything the
//! outside world must do in response leaves as [`Effect`] values. No I/O
//! happens in here.

use chrono::{DateTime, Utc};

use crate::geo::{self, LatLngBounds};
use crate::map::{MarkerId, MarkerPopup};
use crate::render;
use crate::types::{Coordinates, WeatherSnapshot, Workout, WorkoutId};
use crate::validate::{self, FieldError, FormInput, ValidDetails, ValidInput};

pub const MAP_ZOOM: u8 = 13;
/// Delay before a hidden form fully collapses, in ms. Purely visual;
/// reshowing the form within the window cancels the collapse.
pub const FORM_COLLAPSE_MS: u64 = 1000;

pub type RequestId = u64;
pub type TimerToken = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Registry key: one live marker per workout, plus at most one
/// provisional pin for the not-yet-confirmed creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKey {
    Workout(WorkoutId),
    Temporary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRef {
    pub key: MarkerKey,
    pub marker: MarkerId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormTarget {
    Create { at: Coordinates },
    Edit { id: WorkoutId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingForm {
    pub target: FormTarget,
    /// Correlates an in-flight weather fetch with this form; responses
    /// carrying any other id are stale and get dropped.
    pub weather_request: Option<RequestId>,
    pub weather: Option<WeatherSnapshot>,
    /// Delete confirmation popup, reachable only while editing.
    pub confirm_delete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ClickMap { at: Coordinates },
    Submit { input: FormInput },
    OpenEdit { id: WorkoutId },
    SelectWorkout { id: WorkoutId },
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    DeleteAll,
    ToggleSort,
    ViewAll,
    Dismiss,
    WeatherArrived { request: RequestId, report: WeatherSnapshot },
    CollapseTimerElapsed { token: TimerToken },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetView { center: Coordinates, zoom: u8 },
    FitBounds(LatLngBounds),
    PlaceMarker { id: MarkerId, at: Coordinates, popup: Option<MarkerPopup> },
    SetMarkerPopup { id: MarkerId, popup: MarkerPopup },
    RemoveMarker(MarkerId),
    RenderList,
    ReportErrors(Vec<FieldError>),
    FetchWeather { request: RequestId, at: Coordinates },
    StartCollapseTimer { token: TimerToken },
    CollapseForm,
    Persist,
    ClearStorage,
}

#[derive(Debug)]
pub struct AppState {
    pub workouts: Vec<Workout>,
    pub markers: Vec<MarkerRef>,
    pub form: Option<PendingForm>,
    pub sort: SortOrder,
    collapse_timer: Option<TimerToken>,
    next_marker: MarkerId,
    next_request: RequestId,
    next_token: TimerToken,
}

impl AppState {
    pub fn new(workouts: Vec<Workout>) -> Self {
        Self {
            workouts,
            markers: Vec::new(),
            form: None,
            sort: SortOrder::Ascending,
            collapse_timer: None,
            next_marker: 0,
            next_request: 0,
            next_token: 0,
        }
    }

    pub fn workout(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| &w.id == id)
    }

    fn alloc_marker(&mut self) -> MarkerId {
        let id = self.next_marker;
        self.next_marker += 1;
        id
    }

    fn alloc_request(&mut self) -> RequestId {
        let id = self.next_request;
        self.next_request += 1;
        id
    }

    fn alloc_token(&mut self) -> TimerToken {
        let token = self.next_token;
        self.next_token += 1;
        token
    }
}

/// Startup: a marker per stored workout, a full list render, then bring
/// everything into view — or center on `home` when the list is empty.
pub fn bootstrap(state: &mut AppState, home: Option<Coordinates>) -> Vec<Effect> {
    let mut effects = Vec::new();

    let placements: Vec<(WorkoutId, Coordinates, MarkerPopup)> = state
        .workouts
        .iter()
        .map(|w| (w.id.clone(), w.coords, render::popup(w)))
        .collect();
    for (id, at, popup) in placements {
        let marker = state.alloc_marker();
        state.markers.push(MarkerRef {
            key: MarkerKey::Workout(id),
            marker,
        });
        effects.push(Effect::PlaceMarker {
            id: marker,
            at,
            popup: Some(popup),
        });
    }

    effects.push(Effect::RenderList);

    if state.workouts.is_empty() {
        if let Some(center) = home {
            effects.push(Effect::SetView {
                center,
                zoom: MAP_ZOOM,
            });
        }
    } else {
        effects.extend(view_all(state));
    }
    effects
}

pub fn update(state: &mut AppState, intent: Intent, now: DateTime<Utc>) -> Vec<Effect> {
    match intent {
        Intent::ClickMap { at } => click_map(state, at),
        Intent::Submit { input } => submit(state, &input, now),
        Intent::OpenEdit { id } => open_edit(state, &id),
        Intent::SelectWorkout { id } => select_workout(state, &id),
        Intent::RequestDelete => request_delete(state),
        Intent::ConfirmDelete => confirm_delete(state),
        Intent::CancelDelete => cancel_delete(state),
        Intent::DeleteAll => delete_all(state),
        Intent::ToggleSort => toggle_sort(state),
        Intent::ViewAll => view_all(state),
        Intent::Dismiss => dismiss(state),
        Intent::WeatherArrived { request, report } => weather_arrived(state, request, report),
        Intent::CollapseTimerElapsed { token } => collapse_elapsed(state, token),
    }
}

fn click_map(state: &mut AppState, at: Coordinates) -> Vec<Effect> {
    let mut effects = Vec::new();
    discard_temp_marker(state, &mut effects);
    // The form is reshown right away, so any pending collapse is void.
    state.collapse_timer = None;

    let marker = state.alloc_marker();
    state.markers.push(MarkerRef {
        key: MarkerKey::Temporary,
        marker,
    });
    effects.push(Effect::PlaceMarker {
        id: marker,
        at,
        popup: None,
    });

    let request = state.alloc_request();
    state.form = Some(PendingForm {
        target: FormTarget::Create { at },
        weather_request: Some(request),
        weather: None,
        confirm_delete: false,
    });
    effects.push(Effect::FetchWeather { request, at });
    effects
}

fn submit(state: &mut AppState, input: &FormInput, now: DateTime<Utc>) -> Vec<Effect> {
    let Some(form) = state.form.clone() else {
        return Vec::new();
    };
    let valid = match validate::validate(input) {
        Ok(valid) => valid,
        Err(errors) => return vec![Effect::ReportErrors(errors)],
    };
    match form.target {
        FormTarget::Create { at } => create_workout(state, valid, at, form.weather, now),
        FormTarget::Edit { id } => edit_workout(state, valid, &id),
    }
}

fn create_workout(
    state: &mut AppState,
    valid: ValidInput,
    at: Coordinates,
    weather: Option<WeatherSnapshot>,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    let id = unique_id(now, &state.workouts);
    let workout = build_workout(id.clone(), at, valid, weather, now);
    let popup = render::popup(&workout);
    state.workouts.push(workout);

    let mut effects = Vec::new();
    discard_temp_marker(state, &mut effects);
    let marker = state.alloc_marker();
    state.markers.push(MarkerRef {
        key: MarkerKey::Workout(id),
        marker,
    });
    effects.push(Effect::PlaceMarker {
        id: marker,
        at,
        popup: Some(popup),
    });
    effects.push(Effect::RenderList);
    hide_form(state, &mut effects);
    effects.push(Effect::Persist);
    effects
}

fn edit_workout(state: &mut AppState, valid: ValidInput, id: &WorkoutId) -> Vec<Effect> {
    let Some(index) = state.workouts.iter().position(|w| &w.id == id) else {
        return Vec::new();
    };
    // Identity fields carry over; everything the form owns is replaced,
    // and the description follows from the preserved creation date.
    let original = &state.workouts[index];
    let replacement = build_workout(
        original.id.clone(),
        original.coords,
        valid,
        original.weather.clone(),
        original.date,
    );
    let popup = render::popup(&replacement);
    state.workouts[index] = replacement;

    let mut effects = Vec::new();
    if let Some(marker) = marker_for(state, &MarkerKey::Workout(id.clone())) {
        effects.push(Effect::SetMarkerPopup { id: marker, popup });
    }
    effects.push(Effect::RenderList);
    hide_form(state, &mut effects);
    effects.push(Effect::Persist);
    effects
}

fn build_workout(
    id: WorkoutId,
    at: Coordinates,
    valid: ValidInput,
    weather: Option<WeatherSnapshot>,
    date: DateTime<Utc>,
) -> Workout {
    match valid.details {
        ValidDetails::Running { cadence } => Workout::running(
            id,
            at,
            valid.distance_km,
            valid.duration_min,
            cadence,
            weather,
            date,
        ),
        ValidDetails::Cycling { elevation_gain } => Workout::cycling(
            id,
            at,
            valid.distance_km,
            valid.duration_min,
            elevation_gain,
            weather,
            date,
        ),
    }
}

fn open_edit(state: &mut AppState, id: &WorkoutId) -> Vec<Effect> {
    let Some(center) = state.workout(id).map(|w| w.coords) else {
        return Vec::new();
    };
    let mut effects = Vec::new();
    discard_temp_marker(state, &mut effects);
    state.collapse_timer = None;
    state.form = Some(PendingForm {
        target: FormTarget::Edit { id: id.clone() },
        weather_request: None,
        weather: None,
        confirm_delete: false,
    });
    effects.push(Effect::SetView {
        center,
        zoom: MAP_ZOOM,
    });
    effects
}

fn select_workout(state: &mut AppState, id: &WorkoutId) -> Vec<Effect> {
    let Some(workout) = state.workouts.iter_mut().find(|w| &w.id == id) else {
        return Vec::new();
    };
    workout.click();
    vec![Effect::SetView {
        center: workout.coords,
        zoom: MAP_ZOOM,
    }]
}

fn request_delete(state: &mut AppState) -> Vec<Effect> {
    if let Some(form) = state.form.as_mut()
        && matches!(form.target, FormTarget::Edit { .. })
    {
        form.confirm_delete = true;
    }
    Vec::new()
}

fn confirm_delete(state: &mut AppState) -> Vec<Effect> {
    let Some(PendingForm {
        target: FormTarget::Edit { id },
        confirm_delete: true,
        ..
    }) = state.form.clone()
    else {
        return Vec::new();
    };
    let Some(index) = state.workouts.iter().position(|w| w.id == id) else {
        return Vec::new();
    };
    state.workouts.remove(index);

    let mut effects = Vec::new();
    if let Some(pos) = state
        .markers
        .iter()
        .position(|m| m.key == MarkerKey::Workout(id.clone()))
    {
        let gone = state.markers.remove(pos);
        effects.push(Effect::RemoveMarker(gone.marker));
    }
    effects.push(Effect::RenderList);
    hide_form(state, &mut effects);
    effects.push(if state.workouts.is_empty() {
        Effect::ClearStorage
    } else {
        Effect::Persist
    });
    effects
}

fn cancel_delete(state: &mut AppState) -> Vec<Effect> {
    if let Some(form) = state.form.as_mut() {
        form.confirm_delete = false;
    }
    Vec::new()
}

fn delete_all(state: &mut AppState) -> Vec<Effect> {
    let mut effects = Vec::new();
    for gone in state.markers.drain(..) {
        effects.push(Effect::RemoveMarker(gone.marker));
    }
    state.workouts.clear();
    effects.push(Effect::RenderList);
    if state.form.is_some() {
        hide_form(state, &mut effects);
    }
    effects.push(Effect::ClearStorage);
    effects
}

fn toggle_sort(state: &mut AppState) -> Vec<Effect> {
    state.sort = state.sort.flipped();
    match state.sort {
        SortOrder::Ascending => state.workouts.sort_by(|a, b| a.date.cmp(&b.date)),
        SortOrder::Descending => state.workouts.sort_by(|a, b| b.date.cmp(&a.date)),
    }
    vec![Effect::RenderList]
}

fn view_all(state: &AppState) -> Vec<Effect> {
    match state.workouts.as_slice() {
        [] => Vec::new(),
        [only] => vec![Effect::SetView {
            center: only.coords,
            zoom: MAP_ZOOM,
        }],
        many => {
            let coords: Vec<Coordinates> = many.iter().map(|w| w.coords).collect();
            geo::bounding_box(&coords)
                .map(Effect::FitBounds)
                .into_iter()
                .collect()
        }
    }
}

fn dismiss(state: &mut AppState) -> Vec<Effect> {
    if state.form.is_none() {
        return Vec::new();
    }
    let mut effects = Vec::new();
    discard_temp_marker(state, &mut effects);
    hide_form(state, &mut effects);
    effects
}

fn weather_arrived(
    state: &mut AppState,
    request: RequestId,
    report: WeatherSnapshot,
) -> Vec<Effect> {
    match state.form.as_mut() {
        Some(form) if form.weather_request == Some(request) => {
            form.weather = Some(report);
        }
        _ => {
            crate::dlog!("weather_stale request={request}");
        }
    }
    Vec::new()
}

fn collapse_elapsed(state: &mut AppState, token: TimerToken) -> Vec<Effect> {
    if state.collapse_timer == Some(token) {
        state.collapse_timer = None;
        vec![Effect::CollapseForm]
    } else {
        Vec::new()
    }
}

fn hide_form(state: &mut AppState, effects: &mut Vec<Effect>) {
    state.form = None;
    let token = state.alloc_token();
    state.collapse_timer = Some(token);
    effects.push(Effect::StartCollapseTimer { token });
}

fn discard_temp_marker(state: &mut AppState, effects: &mut Vec<Effect>) {
    if let Some(pos) = state
        .markers
        .iter()
        .position(|m| m.key == MarkerKey::Temporary)
    {
        let gone = state.markers.remove(pos);
        effects.push(Effect::RemoveMarker(gone.marker));
    }
}

fn marker_for(state: &AppState, key: &MarkerKey) -> Option<MarkerId> {
    state.markers.iter().find(|m| &m.key == key).map(|m| m.marker)
}

/// Ids derive from the creation instant; two submissions landing in the
/// same millisecond probe forward until the id is free.
fn unique_id(now: DateTime<Utc>, existing: &[Workout]) -> WorkoutId {
    let mut ms = now.timestamp_millis();
    loop {
        let id = WorkoutId::from_millis(ms);
        if !existing.iter().any(|w| w.id == id) {
            return id;
        }
        ms += 1;
    }
}
