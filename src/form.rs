// Form and list controller: form visibility, input parsing and list entry formatting

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::errors::MaptyError;
use crate::workout::{Activity, Coords, Workout, WorkoutKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Hidden,
    Visible,
}

/// Raw text of the form inputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInputs {
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

pub struct FormController {
    state: FormState,
    kind: WorkoutKind,
    inputs: FormInputs,
    focus_requested: bool,
    reopen_delay: Duration,
    ready_at: Option<Instant>,
}

impl FormController {
    pub fn new(reopen_delay: Duration) -> Self {
        Self {
            state: FormState::Hidden,
            kind: WorkoutKind::default(),
            inputs: FormInputs::default(),
            focus_requested: false,
            reopen_delay,
            ready_at: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == FormState::Visible
    }

    /// Visible and past the reopen delay of the last submission.
    pub fn is_interactive(&self, now: Instant) -> bool {
        self.is_visible() && self.ready_at.is_none_or(|ready_at| now >= ready_at)
    }

    /// Show the form and ask for the distance input to be focused.
    pub fn show_form(&mut self) {
        self.state = FormState::Visible;
        self.focus_requested = true;
    }

    /// Returns true once after each [`FormController::show_form`].
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn kind(&self) -> WorkoutKind {
        self.kind
    }

    /// Switch between the cadence and the elevation field. The field that
    /// gets hidden is emptied.
    pub fn on_kind_changed(&mut self, kind: WorkoutKind) {
        if kind == self.kind {
            return;
        }
        match kind {
            WorkoutKind::Running => self.inputs.elevation.clear(),
            WorkoutKind::Cycling => self.inputs.cadence.clear(),
        }
        self.kind = kind;
    }

    pub fn inputs(&self) -> &FormInputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut FormInputs {
        &mut self.inputs
    }

    /// Parse the inputs and build a workout of the selected kind at `location`.
    /// Leaves the form untouched, whatever the outcome.
    pub fn build_workout(
        &self,
        location: Coords,
        now: DateTime<Local>,
    ) -> Result<Workout, MaptyError> {
        let distance = parse_input("distance", &self.inputs.distance)?;
        let duration = parse_input("duration", &self.inputs.duration)?;
        match self.kind {
            WorkoutKind::Running => {
                let cadence = parse_input("cadence", &self.inputs.cadence)?;
                Workout::running_at(location, distance, duration, cadence, now)
            }
            WorkoutKind::Cycling => {
                let elevation = parse_input("elevation", &self.inputs.elevation)?;
                Workout::cycling_at(location, distance, duration, elevation, now)
            }
        }
    }

    /// Hide and clear the form. It cannot be used again before the reopen delay.
    pub fn hide(&mut self, now: Instant) {
        self.inputs = FormInputs::default();
        self.state = FormState::Hidden;
        self.focus_requested = false;
        self.ready_at = Some(now + self.reopen_delay);
    }
}

fn parse_input(field: &str, raw: &str) -> Result<f64, MaptyError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| MaptyError::invalid_input(field, "must be a number"))?;
    if !value.is_finite() {
        return Err(MaptyError::invalid_input(field, "must be a finite number"));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListDetail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

/// Everything the workout list shows for one workout
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: String,
    pub kind: WorkoutKind,
    pub title: String,
    pub details: Vec<ListDetail>,
}

fn detail(icon: &'static str, value: String, unit: &'static str) -> ListDetail {
    ListDetail { icon, value, unit }
}

pub fn list_entry(workout: &Workout) -> ListEntry {
    let kind = workout.kind();
    let mut details = vec![
        detail(kind.emoji(), workout.distance().to_string(), "km"),
        detail("⏱", workout.duration().to_string(), "min"),
    ];
    match *workout.activity() {
        Activity::Running { cadence, pace } => {
            details.push(detail("⚡️", format!("{:.1}", pace), "min/km"));
            details.push(detail("🦶🏼", cadence.to_string(), "spm"));
        }
        Activity::Cycling {
            elevation_gain,
            speed,
        } => {
            details.push(detail("⚡️", format!("{:.1}", speed), "km/h"));
            details.push(detail("⛰", elevation_gain.to_string(), "m"));
        }
    }

    ListEntry {
        id: workout.id().to_string(),
        kind,
        title: workout.description().to_string(),
        details,
    }
}
