// Error types for mapty

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum MaptyError {
    // Errors while resolving the user's position
    #[snafu(display("Could not get your position: {reason}"))]
    GeolocationDenied { reason: String },

    // User input validation errors
    #[snafu(display("Invalid workout input: {field} - {reason}"))]
    ValidationError { field: String, reason: String },
    #[snafu(display("Click on the map to choose where the workout happened"))]
    MissingLocation,

    // Workout storage errors
    #[snafu(display("Could not find application data directory to store workouts"))]
    NoDataDir,
    #[snafu(display("Error reading or writing workout store"))]
    StorageIOError { source: io::Error },
    #[snafu(display("Error serializing workouts"))]
    StorageSerializeError { source: serde_json::Error },
    #[snafu(display("Stored workouts could not be decoded"))]
    StorageDecodeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // UI errors
    #[snafu(display("Could not start the user interface: {reason}"))]
    UiStartError { reason: String },
}

impl MaptyError {
    pub(crate) fn invalid_input(field: &str, reason: &str) -> Self {
        MaptyError::ValidationError {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Text shown to the user when the error surfaces as an alert.
    pub fn alert_message(&self) -> String {
        match self {
            MaptyError::ValidationError { .. } => "Inputs have to be positive numbers!".to_string(),
            MaptyError::GeolocationDenied { .. } => "Could not get your position".to_string(),
            other => other.to_string(),
        }
    }
}
