// Workout persistence
// A string-keyed store plus the adapter that mirrors the workout list into it

pub mod store;
pub mod workouts;

pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use workouts::{WORKOUTS_KEY, WorkoutStorage};
