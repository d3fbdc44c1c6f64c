// Integration test for the workout log backed by the file store

use std::fs;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};

use mapty::{
    Activity, AppConfig, AppEvent, Coords, FileStore, KeyValueStore, MapSurface, MarkerId,
    PanAnimation, PopupOptions, WorkoutKind, WorkoutLog, WorkoutStorage,
};
use tempfile::TempDir;

/// Map surface that only remembers markers and popups
#[derive(Default)]
struct SketchMap {
    center: Option<Coords>,
    markers: Vec<Coords>,
    popups: Vec<(MarkerId, String, String)>,
}

impl MapSurface for SketchMap {
    fn create_map(&mut self, center: Coords, _zoom: u8) {
        self.center = Some(center);
    }

    fn add_tile_layer(&mut self, _url_template: &str, _attribution: &str) {}

    fn add_marker(&mut self, coords: Coords) -> MarkerId {
        self.markers.push(coords);
        self.markers.len() - 1
    }

    fn bind_popup(&mut self, marker: MarkerId, options: PopupOptions, content: String) {
        self.popups.push((marker, options.class_name, content));
    }

    fn open_popup(&mut self, _marker: MarkerId) {}

    fn set_view(&mut self, center: Coords, _zoom: u8, _animation: PanAnimation) {
        self.center = Some(center);
    }
}

fn open_log(dir: &TempDir) -> WorkoutLog<SketchMap> {
    let store = FileStore::new(dir.path().to_path_buf()).unwrap();
    WorkoutLog::new(SketchMap::default(), WorkoutStorage::new(store), &AppConfig::default())
}

fn log_workout(
    log: &mut WorkoutLog<SketchMap>,
    at: Coords,
    kind: WorkoutKind,
    values: [&str; 3],
    created_at: DateTime<Local>,
    now: Instant,
) {
    log.handle(AppEvent::MapClicked(at), now);
    log.handle(AppEvent::KindChanged(kind), now);
    let inputs = log.form_mut().inputs_mut();
    inputs.distance = values[0].to_string();
    inputs.duration = values[1].to_string();
    match kind {
        WorkoutKind::Running => inputs.cadence = values[2].to_string(),
        WorkoutKind::Cycling => inputs.elevation = values[2].to_string(),
    }
    log.handle(AppEvent::FormSubmitted(created_at), now);
}

fn morning_of(day: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 4, day, 9, 30, 0).unwrap()
}

#[test]
fn test_workouts_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let home = Coords::new(40.0, -3.0);

    {
        let start = Instant::now();
        let mut log = open_log(&temp_dir);
        log.handle(AppEvent::PositionResolved(Ok(home)), start);

        log_workout(
            &mut log,
            home,
            WorkoutKind::Running,
            ["5", "25", "178"],
            morning_of(14),
            start,
        );
        assert_eq!(log.alert(), None);
        assert_eq!(log.map().surface().markers, vec![home]);
        assert_eq!(log.list().len(), 1);
        let (_, class, content) = &log.map().surface().popups[0];
        assert_eq!(class, "running-popup");
        assert_eq!(content, "🏃‍♂️ Running on April 14");

        // still inside the reopen delay
        log_workout(
            &mut log,
            Coords::new(41.0, -4.0),
            WorkoutKind::Cycling,
            ["20", "60", "300"],
            morning_of(15),
            start + Duration::from_millis(3),
        );
        assert_eq!(log.workouts().len(), 1);

        let later = start + Duration::from_secs(2);
        log_workout(
            &mut log,
            Coords::new(41.0, -4.0),
            WorkoutKind::Cycling,
            ["20", "60", "300"],
            morning_of(15),
            later,
        );
        assert_eq!(log.workouts().len(), 2);
    }

    assert!(temp_dir.path().join("workouts.json").exists());

    let mut log = open_log(&temp_dir);
    assert_eq!(log.list().len(), 2);
    assert_eq!(log.list()[0].kind, WorkoutKind::Running);
    assert_eq!(log.list()[1].title, "Cycling on April 15");
    assert_eq!(
        *log.workouts()[0].activity(),
        Activity::Running {
            cadence: 178.0,
            pace: 5.0
        }
    );
    assert_eq!(
        *log.workouts()[1].activity(),
        Activity::Cycling {
            elevation_gain: 300.0,
            speed: 20.0
        }
    );

    // stored workouts only reach the map once it is loaded
    assert!(log.map().surface().markers.is_empty());
    log.handle(AppEvent::PositionResolved(Ok(home)), Instant::now());
    assert_eq!(
        log.map().surface().markers,
        vec![home, Coords::new(41.0, -4.0)]
    );

    let id = log.workouts()[1].id().to_string();
    log.handle(AppEvent::ListEntryActivated(id), Instant::now());
    assert_eq!(log.map().surface().center, Some(Coords::new(41.0, -4.0)));
}

#[test]
fn test_rejected_input_is_not_stored() {
    let temp_dir = TempDir::new().unwrap();
    let mut log = open_log(&temp_dir);
    log.handle(
        AppEvent::PositionResolved(Ok(Coords::new(0.0, 0.0))),
        Instant::now(),
    );

    log_workout(
        &mut log,
        Coords::new(1.0, 1.0),
        WorkoutKind::Running,
        ["5", "-25", "178"],
        morning_of(14),
        Instant::now(),
    );

    assert_eq!(log.alert(), Some("Inputs have to be positive numbers!"));
    assert!(log.workouts().is_empty());
    assert!(log.map().surface().markers.is_empty());
    assert!(!temp_dir.path().join("workouts.json").exists());
}

#[test]
fn test_malformed_store_file_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("workouts.json"), "{not json").unwrap();

    let log = open_log(&temp_dir);
    assert!(log.workouts().is_empty());
    assert!(log.list().is_empty());
    assert_eq!(log.alert(), None);
}

#[test]
fn test_reset_clears_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path().to_path_buf()).unwrap();
    store.set("workouts", "[]").unwrap();

    let mut storage = WorkoutStorage::new(store);
    storage.reset().unwrap();

    assert!(storage.load().is_empty());
    assert!(!temp_dir.path().join("workouts.json").exists());
}
