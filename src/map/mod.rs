// Map controller: owns the map surface, turns clicks into pending workout
// locations and renders workouts as markers

pub mod tiles;

use std::time::Duration;

use log::{debug, warn};

use crate::config::AppConfig;
use crate::workout::{Coords, Workout, WorkoutKind};

const POPUP_MAX_WIDTH: f32 = 250.;
const POPUP_MIN_WIDTH: f32 = 100.;

pub type MarkerId = usize;

/// Display options for a marker popup
#[derive(Debug, Clone, PartialEq)]
pub struct PopupOptions {
    pub max_width: f32,
    pub min_width: f32,
    /// Close other popups when this one opens
    pub auto_close: bool,
    /// Close this popup when the map is clicked
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupOptions {
    /// Popups for workouts stay open and carry the style class of their kind.
    pub fn for_kind(kind: WorkoutKind) -> Self {
        Self {
            max_width: POPUP_MAX_WIDTH,
            min_width: POPUP_MIN_WIDTH,
            auto_close: false,
            close_on_click: false,
            class_name: kind.style_class().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanAnimation {
    pub animate: bool,
    pub duration: Duration,
}

/// Interactive map collaborator. Clicks are not delivered through this trait:
/// whoever owns the event loop reports them to [`MapController::handle_click`].
pub trait MapSurface {
    fn create_map(&mut self, center: Coords, zoom: u8);
    fn add_tile_layer(&mut self, url_template: &str, attribution: &str);
    fn add_marker(&mut self, coords: Coords) -> MarkerId;
    fn bind_popup(&mut self, marker: MarkerId, options: PopupOptions, content: String);
    fn open_popup(&mut self, marker: MarkerId);
    fn set_view(&mut self, center: Coords, zoom: u8, animation: PanAnimation);
}

#[derive(Debug, Clone)]
pub struct MapSettings {
    pub zoom: u8,
    pub tile_url_template: String,
    pub tile_attribution: String,
    pub pan_duration: Duration,
}

impl From<&AppConfig> for MapSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            zoom: config.map_zoom_level,
            tile_url_template: config.tile_url_template.clone(),
            tile_attribution: config.tile_attribution.clone(),
            pan_duration: config.pan_duration(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapState {
    Uninitialized,
    Ready { center: Coords },
}

pub struct MapController<S: MapSurface> {
    surface: S,
    settings: MapSettings,
    state: MapState,
    pending_location: Option<Coords>,
}

impl<S: MapSurface> MapController<S> {
    pub fn new(surface: S, settings: MapSettings) -> Self {
        Self {
            surface,
            settings,
            state: MapState::Uninitialized,
            pending_location: None,
        }
    }

    /// Create the map around `position` and replay `workouts` as markers.
    /// Only the first call has any effect.
    pub fn load(&mut self, position: Coords, workouts: &[Workout]) {
        if self.is_ready() {
            warn!("Map already loaded, ignoring position {}", position);
            return;
        }

        self.surface.create_map(position, self.settings.zoom);
        self.surface
            .add_tile_layer(&self.settings.tile_url_template, &self.settings.tile_attribution);
        self.state = MapState::Ready { center: position };

        for workout in workouts {
            self.render_marker(workout);
        }
        debug!("Map ready at {} with {} workouts", position, workouts.len());
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, MapState::Ready { .. })
    }

    /// Remember where the map was clicked. Returns false, and remembers
    /// nothing, while the map is not loaded.
    pub fn handle_click(&mut self, coords: Coords) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.pending_location = Some(coords);
        true
    }

    pub fn pending_location(&self) -> Option<Coords> {
        self.pending_location
    }

    pub fn clear_pending_location(&mut self) {
        self.pending_location = None;
    }

    /// Add a marker with an open popup for `workout`. Each call adds a new marker.
    pub fn render_marker(&mut self, workout: &Workout) -> MarkerId {
        let kind = workout.kind();
        let marker = self.surface.add_marker(workout.coords());
        self.surface.bind_popup(
            marker,
            PopupOptions::for_kind(kind),
            format!("{} {}", kind.emoji(), workout.description()),
        );
        self.surface.open_popup(marker);
        marker
    }

    /// Pan to `coords` at the map zoom level.
    pub fn recenter(&mut self, coords: Coords) {
        self.surface.set_view(
            coords,
            self.settings.zoom,
            PanAnimation {
                animate: true,
                duration: self.settings.pan_duration,
            },
        );
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }
}
