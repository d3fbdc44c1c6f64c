// Mirrors the full workout list into a key-value store

use log::{debug, warn};

use super::store::KeyValueStore;
use crate::errors::MaptyError;
use crate::workout::{Workout, WorkoutRecord};

/// Key holding the JSON-encoded workout list
pub const WORKOUTS_KEY: &str = "workouts";

pub struct WorkoutStorage {
    store: Box<dyn KeyValueStore>,
}

impl WorkoutStorage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Serialize the whole list under [`WORKOUTS_KEY`], replacing what was stored before.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), MaptyError> {
        let records: Vec<WorkoutRecord> = workouts.iter().map(WorkoutRecord::from).collect();
        let content = serde_json::to_string(&records)
            .map_err(|e| MaptyError::StorageSerializeError { source: e })?;
        self.store.set(WORKOUTS_KEY, &content)?;
        debug!("Saved {} workouts", workouts.len());
        Ok(())
    }

    /// Load the stored list. Never fails: a missing, unreadable or malformed
    /// store yields an empty list, and entries that cannot be rebuilt are skipped.
    pub fn load(&self) -> Vec<Workout> {
        let content = match self.store.get(WORKOUTS_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Could not read stored workouts: {}", e);
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                let error = MaptyError::StorageDecodeError { source: e };
                warn!("{}, starting with an empty list: {:?}", error, error);
                return Vec::new();
            }
        };

        let mut workouts = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let restored = serde_json::from_value::<WorkoutRecord>(entry)
                .map_err(|e| MaptyError::StorageDecodeError { source: e })
                .and_then(Workout::try_from);
            match restored {
                Ok(workout) => workouts.push(workout),
                Err(e) => warn!("Skipping stored workout #{}: {}", index, e),
            }
        }
        debug!("Loaded {} workouts", workouts.len());
        workouts
    }

    /// Forget every stored workout.
    pub fn reset(&mut self) -> Result<(), MaptyError> {
        self.store.remove(WORKOUTS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::workout::{Activity, Coords};
    use proptest::prelude::*;

    fn storage_with(content: &str) -> WorkoutStorage {
        let mut store = MemoryStore::new();
        store.set(WORKOUTS_KEY, content).unwrap();
        WorkoutStorage::new(store)
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let storage = WorkoutStorage::new(MemoryStore::new());
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_malformed_content_loads_empty() {
        assert!(storage_with("{not json").load().is_empty());
        assert!(storage_with("{\"workouts\": 1}").load().is_empty());
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let content = r#"[
            {"id": "1", "date": "2024-04-14T09:30:00Z", "coords": [1, 2], "distance": 5,
             "duration": 25, "type": "running", "cadence": 170},
            {"id": "2", "type": "swimming"},
            {"id": "3", "date": "2024-04-14T09:30:00Z", "coords": [1, 2], "distance": 0,
             "duration": 25, "type": "running", "cadence": 170}
        ]"#;
        let workouts = storage_with(content).load();

        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].id(), "1");
    }

    #[test]
    fn test_save_overwrites_previous_list() {
        let mut storage = WorkoutStorage::new(MemoryStore::new());
        let first = Workout::running(Coords::new(1.0, 1.0), 5.0, 25.0, 178.0).unwrap();
        let second = Workout::cycling(Coords::new(2.0, 2.0), 20.0, 60.0, 300.0).unwrap();

        storage.save(&[first.clone(), second]).unwrap();
        storage.save(std::slice::from_ref(&first)).unwrap();

        assert_eq!(storage.load(), vec![first]);
    }

    #[test]
    fn test_reset_clears_store() {
        let mut storage = WorkoutStorage::new(MemoryStore::new());
        let workout = Workout::running(Coords::new(1.0, 1.0), 5.0, 25.0, 178.0).unwrap();
        storage.save(&[workout]).unwrap();

        storage.reset().unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_running_round_trip_keeps_cadence() {
        let mut storage = WorkoutStorage::new(MemoryStore::new());
        let workout = Workout::running(Coords::new(40.0, -3.0), 5.0, 25.0, 178.0).unwrap();
        storage.save(std::slice::from_ref(&workout)).unwrap();

        let loaded = storage.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            *loaded[0].activity(),
            Activity::Running {
                cadence: 178.0,
                pace: 5.0
            }
        );
    }

    #[test]
    fn test_every_accepted_elevation_survives_reload() {
        let mut storage = WorkoutStorage::new(MemoryStore::new());
        let coords = Coords::new(1.0, 2.0);
        let workouts = [0.0, -35.5, f64::MAX]
            .into_iter()
            .map(|elevation| Workout::cycling(coords, 20.0, 60.0, elevation).unwrap())
            .collect::<Vec<_>>();
        storage.save(&workouts).unwrap();

        assert_eq!(storage.load(), workouts);

        // values that cannot be written back never make it into a workout
        assert!(Workout::cycling(coords, 20.0, 60.0, f64::INFINITY).is_err());
        assert!(Workout::cycling(coords, 20.0, 60.0, f64::NAN).is_err());
    }

    fn arb_workout() -> impl Strategy<Value = Workout> {
        (
            -90.0f64..90.0,
            -180.0f64..180.0,
            0.01f64..300.0,
            0.01f64..600.0,
            0.01f64..5000.0,
            any::<bool>(),
        )
            .prop_map(|(lat, lng, distance, duration, extra, running)| {
                let coords = Coords::new(lat, lng);
                if running {
                    Workout::running(coords, distance, duration, extra).unwrap()
                } else {
                    Workout::cycling(coords, distance, duration, extra).unwrap()
                }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_load_after_save_returns_same_workouts(
            workouts in prop::collection::vec(arb_workout(), 1..8)
        ) {
            let mut storage = WorkoutStorage::new(MemoryStore::new());
            storage.save(&workouts).unwrap();
            prop_assert_eq!(storage.load(), workouts);
        }
    }
}
