// Workout model: logged running and cycling sessions and their derived metrics

mod record;

pub use record::WorkoutRecord;

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::MaptyError;

// prettier month names for descriptions, indexed by `month0`
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

/// Number of trailing timestamp digits kept as the workout identifier.
const ID_LENGTH: usize = 10;

/// Geographic coordinate pair, stored as `[lat, lng]`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from(value: [f64; 2]) -> Self {
        Self {
            lat: value[0],
            lng: value[1],
        }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(value: Coords) -> Self {
        [value.lat, value.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    #[default]
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 2] = [WorkoutKind::Running, WorkoutKind::Cycling];

    /// Capitalized name used in descriptions and the kind selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// Style class attached to map popups of this kind.
    pub fn style_class(&self) -> &'static str {
        match self {
            Self::Running => "running-popup",
            Self::Cycling => "cycling-popup",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

/// Kind-specific input and derived metric of a workout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Activity {
    /// `pace` is in min/km.
    Running { cadence: f64, pace: f64 },
    /// `speed` is in km/h.
    Cycling { elevation_gain: f64, speed: f64 },
}

impl Activity {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// Running pace in min/km.
pub fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

/// Cycling speed in km/h.
pub fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

/// A single logged exercise session. Built only through [`Workout::running`],
/// [`Workout::cycling`] or from a stored [`WorkoutRecord`], and never changed afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Workout {
    id: String,
    date: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    activity: Activity,
}

impl Workout {
    /// Create a running workout timestamped now.
    pub fn running(
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Result<Self, MaptyError> {
        Self::running_at(coords, distance, duration, cadence, Local::now())
    }

    pub fn running_at(
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
        now: DateTime<Local>,
    ) -> Result<Self, MaptyError> {
        ensure_positive("distance", distance)?;
        ensure_positive("duration", duration)?;
        ensure_positive("cadence", cadence)?;

        let activity = Activity::Running {
            cadence,
            pace: pace(distance, duration),
        };
        Self::build(coords, distance, duration, activity, now)
    }

    /// Create a cycling workout timestamped now.
    ///
    /// Elevation gain only has to be finite, it may be zero or negative.
    pub fn cycling(
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Result<Self, MaptyError> {
        Self::cycling_at(coords, distance, duration, elevation_gain, Local::now())
    }

    pub fn cycling_at(
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
        now: DateTime<Local>,
    ) -> Result<Self, MaptyError> {
        ensure_positive("distance", distance)?;
        ensure_positive("duration", duration)?;
        ensure_finite("elevation", elevation_gain)?;

        let activity = Activity::Cycling {
            elevation_gain,
            speed: speed(distance, duration),
        };
        Self::build(coords, distance, duration, activity, now)
    }

    fn build(
        coords: Coords,
        distance: f64,
        duration: f64,
        activity: Activity,
        now: DateTime<Local>,
    ) -> Result<Self, MaptyError> {
        ensure_finite("latitude", coords.lat)?;
        ensure_finite("longitude", coords.lng)?;
        Ok(Self {
            id: generate_id(&now),
            date: now.with_timezone(&Utc),
            coords,
            distance,
            duration,
            description: describe(activity.kind(), &now),
            activity,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Distance in km.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Duration in minutes.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }
}

// non-finite floats are written as null and would not load back
fn ensure_finite(field: &str, value: f64) -> Result<(), MaptyError> {
    if !value.is_finite() {
        return Err(MaptyError::invalid_input(field, "must be a finite number"));
    }
    Ok(())
}

fn ensure_positive(field: &str, value: f64) -> Result<(), MaptyError> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(MaptyError::invalid_input(field, "must be positive"));
    }
    Ok(())
}

/// Identifier from the trailing digits of the creation time in milliseconds.
/// Two workouts created within the same millisecond share an id.
fn generate_id(now: &DateTime<Local>) -> String {
    let millis = now.timestamp_millis().to_string();
    millis[millis.len().saturating_sub(ID_LENGTH)..].to_string()
}

/// "Running on April 14"
pub fn describe(kind: WorkoutKind, date: &DateTime<Local>) -> String {
    format!(
        "{} on {} {}",
        kind.label(),
        MONTHS[date.month0() as usize],
        date.day()
    )
}
