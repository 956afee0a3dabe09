use crate::types::WorkoutKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FieldId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Cadence => "cadence",
            Self::Elevation => "elevation gain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Empty,
    NotANumber,
    NotPositive,
}

impl FieldErrorKind {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Empty => "Field cannot be empty",
            Self::NotANumber => "Input has to be a number",
            Self::NotPositive => "Input has to be greater than 0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: FieldId,
    pub kind: FieldErrorKind,
}

/// Raw form fields as entered. Only the fields relevant to `kind` are
/// looked at; the other variant's field stays empty and unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidDetails {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidInput {
    pub distance_km: f64,
    pub duration_min: f64,
    pub details: ValidDetails,
}

/// Two phases: first every relevant field must be present and numeric,
/// then every positivity-checked field must be > 0. Elevation gain is
/// exempt from the second phase (net-downhill rides are legitimate).
/// All failing fields of the active phase are reported.
pub fn validate(input: &FormInput) -> Result<ValidInput, Vec<FieldError>> {
    let fields: [(FieldId, &str); 3] = match input.kind {
        WorkoutKind::Running => [
            (FieldId::Distance, input.distance.as_str()),
            (FieldId::Duration, input.duration.as_str()),
            (FieldId::Cadence, input.cadence.as_str()),
        ],
        WorkoutKind::Cycling => [
            (FieldId::Distance, input.distance.as_str()),
            (FieldId::Duration, input.duration.as_str()),
            (FieldId::Elevation, input.elevation.as_str()),
        ],
    };

    let mut errors = Vec::new();
    let mut values = [0.0_f64; 3];
    for (slot, (field, raw)) in values.iter_mut().zip(fields) {
        match parse_field(raw) {
            Ok(v) => *slot = v,
            Err(kind) => errors.push(FieldError { field, kind }),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    for ((field, _), value) in fields.into_iter().zip(values) {
        if field != FieldId::Elevation && value <= 0.0 {
            errors.push(FieldError {
                field,
                kind: FieldErrorKind::NotPositive,
            });
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let details = match input.kind {
        WorkoutKind::Running => ValidDetails::Running { cadence: values[2] },
        WorkoutKind::Cycling => ValidDetails::Cycling {
            elevation_gain: values[2],
        },
    };
    Ok(ValidInput {
        distance_km: values[0],
        duration_min: values[1],
        details,
    })
}

fn parse_field(raw: &str) -> Result<f64, FieldErrorKind> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldErrorKind::Empty);
    }
    let value: f64 = raw.parse().map_err(|_| FieldErrorKind::NotANumber)?;
    if !value.is_finite() {
        return Err(FieldErrorKind::NotANumber);
    }
    Ok(value)
}
