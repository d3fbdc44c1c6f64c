// Library interface for mapty
// The desktop shell in main.rs drives these modules; integration tests use them directly

pub mod app;
pub mod config;
pub mod errors;
pub mod form;
pub mod geolocation;
pub mod map;
pub mod storage;
pub mod workout;

// Re-export commonly used types
pub use app::{AppEvent, WorkoutLog};
pub use config::AppConfig;
pub use errors::MaptyError;
pub use map::{MapController, MapSurface, MarkerId, PanAnimation, PopupOptions};
pub use storage::{FileStore, KeyValueStore, MemoryStore, WorkoutStorage};
pub use workout::{Activity, Coords, Workout, WorkoutKind};
