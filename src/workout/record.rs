// Stored form of a workout and its reconstruction into the right variant

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::{Activity, Coords, Workout, WorkoutKind, describe, ensure_positive, pace, speed};
use crate::errors::MaptyError;

/// Flat, kind-tagged record persisted for each workout. Derived metrics are
/// written for readers of the raw store but recomputed on load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl From<&Workout> for WorkoutRecord {
    fn from(workout: &Workout) -> Self {
        let mut record = WorkoutRecord {
            id: workout.id.clone(),
            date: workout.date,
            coords: workout.coords,
            distance: workout.distance,
            duration: workout.duration,
            description: Some(workout.description.clone()),
            kind: workout.kind(),
            cadence: None,
            pace: None,
            elevation_gain: None,
            speed: None,
        };
        match workout.activity {
            Activity::Running { cadence, pace } => {
                record.cadence = Some(cadence);
                record.pace = Some(pace);
            }
            Activity::Cycling {
                elevation_gain,
                speed,
            } => {
                record.elevation_gain = Some(elevation_gain);
                record.speed = Some(speed);
            }
        }
        record
    }
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = MaptyError;

    fn try_from(record: WorkoutRecord) -> Result<Self, Self::Error> {
        ensure_positive("distance", record.distance)?;
        ensure_positive("duration", record.duration)?;

        let activity = match record.kind {
            WorkoutKind::Running => {
                let cadence = record
                    .cadence
                    .ok_or_else(|| MaptyError::invalid_input("cadence", "missing"))?;
                ensure_positive("cadence", cadence)?;
                Activity::Running {
                    cadence,
                    pace: pace(record.distance, record.duration),
                }
            }
            WorkoutKind::Cycling => {
                let elevation_gain = record
                    .elevation_gain
                    .ok_or_else(|| MaptyError::invalid_input("elevationGain", "missing"))?;
                Activity::Cycling {
                    elevation_gain,
                    speed: speed(record.distance, record.duration),
                }
            }
        };

        let description = record
            .description
            .unwrap_or_else(|| describe(record.kind, &record.date.with_timezone(&Local)));

        Ok(Workout {
            id: record.id,
            date: record.date,
            coords: record.coords,
            distance: record.distance,
            duration: record.duration,
            description,
            activity,
        })
    }
}
