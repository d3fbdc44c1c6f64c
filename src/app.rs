// Application state of the workout log and the events that drive it

use std::time::Instant;

use chrono::{DateTime, Local};
use itertools::Itertools;
use log::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::errors::MaptyError;
use crate::form::{FormController, ListEntry, list_entry};
use crate::map::{MapController, MapSettings, MapSurface};
use crate::storage::WorkoutStorage;
use crate::workout::{Coords, Workout, WorkoutKind};

/// Discrete things that can happen to the workout log
#[derive(Debug)]
pub enum AppEvent {
    PositionResolved(Result<Coords, MaptyError>),
    MapClicked(Coords),
    KindChanged(WorkoutKind),
    /// Carries the creation time of the workout
    FormSubmitted(DateTime<Local>),
    ListEntryActivated(String),
    AlertDismissed,
}

/// Owns the workouts of the session together with the map, the form and the store.
///
/// # Fields
///
/// * `workouts` - Workouts in creation order, loaded ones first.
/// * `list` - One list entry per workout, same order.
/// * `alert` - Message the user has to acknowledge before going on.
pub struct WorkoutLog<S: MapSurface> {
    workouts: Vec<Workout>,
    list: Vec<ListEntry>,
    map: MapController<S>,
    form: FormController,
    storage: WorkoutStorage,
    alert: Option<String>,
}

impl<S: MapSurface> WorkoutLog<S> {
    /// Build the log and restore the stored workouts into the list. Markers for
    /// them are added once the map is loaded.
    pub fn new(surface: S, storage: WorkoutStorage, config: &AppConfig) -> Self {
        let workouts = storage.load();
        let list = workouts.iter().map(list_entry).collect_vec();
        info!("Restored {} workouts", workouts.len());

        Self {
            workouts,
            list,
            map: MapController::new(surface, MapSettings::from(config)),
            form: FormController::new(config.form_reopen_delay()),
            storage,
            alert: None,
        }
    }

    pub fn handle(&mut self, event: AppEvent, now: Instant) {
        debug!("Handling {:?}", event);
        match event {
            AppEvent::PositionResolved(result) => self.on_position_resolved(result),
            AppEvent::MapClicked(coords) => self.on_map_clicked(coords),
            AppEvent::KindChanged(kind) => self.form.on_kind_changed(kind),
            AppEvent::FormSubmitted(created_at) => self.on_submit(now, created_at),
            AppEvent::ListEntryActivated(id) => self.on_list_entry_activated(&id),
            AppEvent::AlertDismissed => self.alert = None,
        }
    }

    fn on_position_resolved(&mut self, result: Result<Coords, MaptyError>) {
        match result {
            Ok(position) => self.map.load(position, &self.workouts),
            Err(e) => {
                warn!("Map not loaded: {}", e);
                self.raise(&e);
            }
        }
    }

    fn on_map_clicked(&mut self, coords: Coords) {
        if self.map.handle_click(coords) {
            self.form.show_form();
        }
    }

    fn on_submit(&mut self, now: Instant, created_at: DateTime<Local>) {
        if !self.form.is_interactive(now) {
            debug!("Form not accepting input, submission ignored");
            return;
        }
        let Some(location) = self.map.pending_location() else {
            self.raise(&MaptyError::MissingLocation);
            return;
        };

        let workout = match self.form.build_workout(location, created_at) {
            Ok(workout) => workout,
            Err(e) => {
                debug!("Rejected workout input: {}", e);
                self.raise(&e);
                return;
            }
        };

        self.map.render_marker(&workout);
        self.list.push(list_entry(&workout));
        self.workouts.push(workout);
        self.form.hide(now);
        self.map.clear_pending_location();

        if let Err(e) = self.storage.save(&self.workouts) {
            error!("Error while saving workouts: {}", e);
        }
    }

    fn on_list_entry_activated(&mut self, id: &str) {
        match self.workouts.iter().find(|w| w.id() == id) {
            Some(workout) => {
                let coords = workout.coords();
                self.map.recenter(coords);
            }
            None => debug!("No workout with id {}", id),
        }
    }

    fn raise(&mut self, error: &MaptyError) {
        self.alert = Some(error.alert_message());
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn list(&self) -> &[ListEntry] {
        &self.list
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn map(&self) -> &MapController<S> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapController<S> {
        &mut self.map
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub fn storage(&self) -> &WorkoutStorage {
        &self.storage
    }
}
