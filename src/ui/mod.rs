mod sidebar;
pub(crate) mod tile_map;

use std::time::{Duration, Instant};

use egui::{Align2, Color32, Order, RichText, Visuals, style::Widgets};

use mapty::geolocation::GeolocationRequest;
use mapty::{AppEvent, WorkoutLog};
use tile_map::TileMap;

pub(crate) const PALETTE_RUNNING: Color32 = Color32::from_rgb(0, 196, 106);
pub(crate) const PALETTE_CYCLING: Color32 = Color32::from_rgb(255, 181, 69);
pub(crate) const PALETTE_DARK: Color32 = Color32::from_rgb(45, 52, 57);
pub(crate) const PALETTE_DARK_ALT: Color32 = Color32::from_rgb(66, 72, 77);
pub(crate) const PALETTE_LIGHT: Color32 = Color32::from_rgb(236, 236, 236);

const SIDEBAR_WIDTH: f32 = 380.;
const IDLE_REPAINT_MS: u64 = 100;

/// `MaptyApp` is the desktop shell of the workout log.
///
/// It turns geolocation results and widget interactions into [`AppEvent`]s
/// and hands them to the [`WorkoutLog`] once per frame.
pub struct MaptyApp {
    log: WorkoutLog<TileMap>,
    geolocation: GeolocationRequest,
}

impl MaptyApp {
    pub fn new(
        log: WorkoutLog<TileMap>,
        geolocation: GeolocationRequest,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_RUNNING,
            faint_bg_color: PALETTE_DARK_ALT,
            extreme_bg_color: PALETTE_DARK_ALT,
            panel_fill: PALETTE_DARK,
            window_fill: PALETTE_DARK,
            widgets: Widgets::dark(),
            striped: false,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);
        egui_extras::install_image_loaders(&cc.egui_ctx);

        Self { log, geolocation }
    }

    fn alert_window(&self, ctx: &egui::Context, events: &mut Vec<AppEvent>) {
        let Some(message) = self.log.alert() else {
            return;
        };
        egui::Window::new("mapty")
            .collapsible(false)
            .resizable(false)
            .order(Order::Foreground)
            .anchor(Align2::CENTER_CENTER, [0., 0.])
            .show(ctx, |ui| {
                ui.label(RichText::new(message).color(Color32::WHITE));
                ui.add_space(8.);
                if ui.button("OK").clicked() {
                    events.push(AppEvent::AlertDismissed);
                }
            });
    }
}

impl eframe::App for MaptyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let mut events = Vec::new();

        if let Some(result) = self.geolocation.poll() {
            events.push(AppEvent::PositionResolved(result));
        }

        let enabled = self.log.alert().is_none();
        egui::SidePanel::left("workouts")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    self.workouts_panel(ui, now, &mut events);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                let map = self.log.map_mut().surface_mut();
                if map.is_created() {
                    if let Some(coords) = map.show(ui) {
                        events.push(AppEvent::MapClicked(coords));
                    }
                } else if self.geolocation.is_pending() {
                    ui.centered_and_justified(|ui| ui.label("Waiting for your position…"));
                } else {
                    ui.centered_and_justified(|ui| ui.label("Map unavailable"));
                }
            });
        });

        self.alert_window(ctx, &mut events);

        for event in events {
            self.log.handle(event, now);
        }

        // keep polling while the position or the form reopen delay is outstanding
        if self.geolocation.is_pending()
            || (self.log.form().is_visible() && !self.log.form().is_interactive(now))
        {
            ctx.request_repaint_after(Duration::from_millis(IDLE_REPAINT_MS));
        }
    }
}
