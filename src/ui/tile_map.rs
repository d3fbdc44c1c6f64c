// Raster tile map drawn in an egui_plot plot, in Web Mercator world space

use std::time::{Duration, Instant};

use egui::load::{SizeHint, TexturePoll};
use egui::{
    Align, Align2, Color32, Frame, Id, Layout, Pos2, Stroke, TextStyle, TextureOptions, Ui, Vec2,
};
use egui_plot::{Plot, PlotBounds, PlotImage, PlotPoint, PlotPoints, Points};
use log::{debug, trace};

use mapty::map::tiles::{self, MAX_ZOOM, WorldPoint};
use mapty::{Coords, MapSurface, MarkerId, PanAnimation, PopupOptions, WorkoutKind};

use super::{PALETTE_CYCLING, PALETTE_DARK, PALETTE_LIGHT, PALETTE_RUNNING};

const MARKER_RADIUS: f32 = 7.;
const POPUP_OFFSET: f32 = 12.;
// more tiles than this means the view is far too zoomed out for the tile zoom
const MAX_VISIBLE_TILES: usize = 64;

struct Popup {
    options: PopupOptions,
    content: String,
    open: bool,
}

struct MapMarker {
    coords: Coords,
    popup: Option<Popup>,
}

/// Pending change of the visible area, applied on the next frame(s)
enum ViewChange {
    Jump {
        center: WorldPoint,
        zoom: u8,
    },
    Pan {
        from: WorldPoint,
        to: WorldPoint,
        zoom: u8,
        started: Instant,
        duration: Duration,
    },
}

pub(crate) struct TileMap {
    created: bool,
    tile_url_template: Option<String>,
    attribution: Option<String>,
    attribution_url: String,
    markers: Vec<MapMarker>,
    view_change: Option<ViewChange>,
    last_center: WorldPoint,
}

impl TileMap {
    pub(crate) fn new(attribution_url: String) -> Self {
        Self {
            created: false,
            tile_url_template: None,
            attribution: None,
            attribution_url,
            markers: Vec::new(),
            view_change: None,
            last_center: WorldPoint { x: 0.5, y: 0.5 },
        }
    }

    pub(crate) fn is_created(&self) -> bool {
        self.created
    }

    /// Draw the map and return the position of a click on it, if any.
    pub(crate) fn show(&mut self, ui: &mut Ui) -> Option<Coords> {
        let attribution_height = match self.attribution {
            Some(_) => ui.text_style_height(&TextStyle::Body) + ui.spacing().item_spacing.y,
            None => 0.,
        };
        let size = ui.available_size() - Vec2::new(0., attribution_height);
        let requested_bounds = self.requested_bounds(size, Instant::now());
        if self.view_change.is_some() {
            ui.ctx().request_repaint();
        }

        let tile_url_template = self.tile_url_template.clone();
        let markers = &self.markers;
        let plot_response = Plot::new("map")
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .show_background(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .width(size.x)
            .height(size.y)
            .show(ui, |plot_ui| {
                if let Some(bounds) = requested_bounds {
                    plot_ui.set_plot_bounds(bounds);
                }
                let bounds = plot_ui.plot_bounds();

                if let Some(template) = &tile_url_template {
                    let zoom = tiles::zoom_for_span(bounds.width(), f64::from(size.x))
                        .round()
                        .clamp(0., f64::from(MAX_ZOOM)) as u8;
                    let min = from_plot(PlotPoint::new(bounds.min()[0], bounds.max()[1]));
                    let max = from_plot(PlotPoint::new(bounds.max()[0], bounds.min()[1]));
                    let visible = tiles::covering_tiles(min, max, zoom);
                    if visible.len() <= MAX_VISIBLE_TILES {
                        for tile in visible {
                            let url = tile.url(template);
                            match plot_ui.ctx().try_load_texture(
                                &url,
                                TextureOptions::LINEAR,
                                SizeHint::default(),
                            ) {
                                Ok(TexturePoll::Ready { texture }) => {
                                    let (tile_min, tile_max) = tile.bounds();
                                    let side = (tile_max.x - tile_min.x) as f32;
                                    let center = to_plot(WorldPoint {
                                        x: (tile_min.x + tile_max.x) / 2.,
                                        y: (tile_min.y + tile_max.y) / 2.,
                                    });
                                    plot_ui.image(PlotImage::new(
                                        url,
                                        texture.id,
                                        center,
                                        Vec2::splat(side),
                                    ));
                                }
                                Ok(TexturePoll::Pending { .. }) => {}
                                Err(e) => trace!("Tile {} not available: {}", url, e),
                            }
                        }
                    }
                }

                for kind in WorkoutKind::ALL {
                    let points = markers
                        .iter()
                        .filter(|m| marker_kind(m) == Some(kind))
                        .map(|m| {
                            let point = to_plot(tiles::project(m.coords));
                            [point.x, point.y]
                        })
                        .collect::<Vec<_>>();
                    plot_ui.points(
                        Points::new(kind.label(), PlotPoints::new(points))
                            .color(kind_color(kind))
                            .radius(MARKER_RADIUS)
                            .filled(true),
                    );
                }
                let plain = markers
                    .iter()
                    .filter(|m| marker_kind(m).is_none())
                    .map(|m| {
                        let point = to_plot(tiles::project(m.coords));
                        [point.x, point.y]
                    })
                    .collect::<Vec<_>>();
                plot_ui.points(
                    Points::new("Marker", PlotPoints::new(plain))
                        .color(PALETTE_LIGHT)
                        .radius(MARKER_RADIUS)
                        .filled(true),
                );

                bounds.center()
            });
        self.last_center = from_plot(plot_response.inner);

        // popups are drawn over the plot in screen space so they can honor width bounds
        let plot_rect = plot_response.response.rect;
        for (index, marker) in self.markers.iter().enumerate() {
            let Some(popup) = marker.popup.as_ref().filter(|p| p.open) else {
                continue;
            };
            let anchor = plot_response
                .transform
                .position_from_point(&to_plot(tiles::project(marker.coords)));
            if !plot_rect.contains(anchor) {
                continue;
            }
            show_popup(ui.ctx(), Id::new(("map-popup", index)), anchor, popup);
        }

        if let Some(attribution) = &self.attribution {
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.hyperlink_to(attribution.as_str(), self.attribution_url.as_str());
            });
        }

        if plot_response.response.clicked()
            && let Some(mouse_pos) = plot_response.response.interact_pointer_pos()
        {
            let coords = tiles::unproject(from_plot(
                plot_response.transform.value_from_position(mouse_pos),
            ));
            for marker in &mut self.markers {
                if let Some(popup) = &mut marker.popup
                    && popup.options.close_on_click
                {
                    popup.open = false;
                }
            }
            debug!("Map clicked at {}", coords);
            return Some(coords);
        }
        None
    }

    /// Bounds to force on the plot this frame, advancing any pan animation.
    fn requested_bounds(&mut self, size: Vec2, now: Instant) -> Option<PlotBounds> {
        match self.view_change.take()? {
            ViewChange::Jump { center, zoom } => Some(bounds_around(center, zoom, size)),
            ViewChange::Pan {
                from,
                to,
                zoom,
                started,
                duration,
            } => {
                let progress = if duration.is_zero() {
                    1.
                } else {
                    (now.duration_since(started).as_secs_f64() / duration.as_secs_f64()).min(1.)
                };
                // ease out
                let t = 1. - (1. - progress).powi(3);
                let center = WorldPoint {
                    x: from.x + (to.x - from.x) * t,
                    y: from.y + (to.y - from.y) * t,
                };
                if progress < 1. {
                    self.view_change = Some(ViewChange::Pan {
                        from,
                        to,
                        zoom,
                        started,
                        duration,
                    });
                }
                Some(bounds_around(center, zoom, size))
            }
        }
    }
}

impl MapSurface for TileMap {
    fn create_map(&mut self, center: Coords, zoom: u8) {
        self.created = true;
        self.view_change = Some(ViewChange::Jump {
            center: tiles::project(center),
            zoom,
        });
    }

    fn add_tile_layer(&mut self, url_template: &str, attribution: &str) {
        self.tile_url_template = Some(url_template.to_string());
        self.attribution = Some(attribution.to_string());
    }

    fn add_marker(&mut self, coords: Coords) -> MarkerId {
        self.markers.push(MapMarker {
            coords,
            popup: None,
        });
        self.markers.len() - 1
    }

    fn bind_popup(&mut self, marker: MarkerId, options: PopupOptions, content: String) {
        if let Some(marker) = self.markers.get_mut(marker) {
            marker.popup = Some(Popup {
                options,
                content,
                open: false,
            });
        }
    }

    fn open_popup(&mut self, marker: MarkerId) {
        let auto_close = match self.markers.get(marker).and_then(|m| m.popup.as_ref()) {
            Some(popup) => popup.options.auto_close,
            None => return,
        };
        for (index, other) in self.markers.iter_mut().enumerate() {
            if let Some(popup) = &mut other.popup {
                if index == marker {
                    popup.open = true;
                } else if auto_close {
                    popup.open = false;
                }
            }
        }
    }

    fn set_view(&mut self, center: Coords, zoom: u8, animation: PanAnimation) {
        let to = tiles::project(center);
        self.view_change = Some(if animation.animate {
            ViewChange::Pan {
                from: self.last_center,
                to,
                zoom,
                started: Instant::now(),
                duration: animation.duration,
            }
        } else {
            ViewChange::Jump { center: to, zoom }
        });
    }
}

fn show_popup(ctx: &egui::Context, id: Id, anchor: Pos2, popup: &Popup) {
    let accent = match popup.options.class_name.as_str() {
        "running-popup" => PALETTE_RUNNING,
        "cycling-popup" => PALETTE_CYCLING,
        _ => PALETTE_LIGHT,
    };
    egui::Area::new(id)
        .fixed_pos(anchor - Vec2::new(0., POPUP_OFFSET))
        .pivot(Align2::CENTER_BOTTOM)
        .interactable(false)
        .show(ctx, |ui| {
            Frame::popup(ui.style())
                .fill(PALETTE_DARK)
                .stroke(Stroke::new(2., accent))
                .show(ui, |ui| {
                    ui.set_min_width(popup.options.min_width);
                    ui.set_max_width(popup.options.max_width);
                    ui.label(egui::RichText::new(&popup.content).color(Color32::WHITE));
                });
        });
}

fn marker_kind(marker: &MapMarker) -> Option<WorkoutKind> {
    let class_name = &marker.popup.as_ref()?.options.class_name;
    WorkoutKind::ALL
        .into_iter()
        .find(|kind| kind.style_class() == class_name)
}

fn kind_color(kind: WorkoutKind) -> Color32 {
    match kind {
        WorkoutKind::Running => PALETTE_RUNNING,
        WorkoutKind::Cycling => PALETTE_CYCLING,
    }
}

// plot y grows upwards, world y grows southwards
fn to_plot(point: WorldPoint) -> PlotPoint {
    PlotPoint::new(point.x, -point.y)
}

fn from_plot(point: PlotPoint) -> WorldPoint {
    WorldPoint {
        x: point.x,
        y: -point.y,
    }
}

fn bounds_around(center: WorldPoint, zoom: u8, size: Vec2) -> PlotBounds {
    let half_width = tiles::world_span(f64::from(zoom), f64::from(size.x)) / 2.;
    let half_height = tiles::world_span(f64::from(zoom), f64::from(size.y)) / 2.;
    let center = to_plot(center);
    PlotBounds::from_min_max(
        [center.x - half_width, center.y - half_height],
        [center.x + half_width, center.y + half_height],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_conversion_flips_y() {
        let point = WorldPoint { x: 0.25, y: 0.75 };
        assert_eq!(to_plot(point), PlotPoint::new(0.25, -0.75));
        assert_eq!(from_plot(to_plot(point)), point);
    }

    #[test]
    fn test_bounds_around_center() {
        let bounds = bounds_around(WorldPoint { x: 0.5, y: 0.5 }, 0, Vec2::new(256., 256.));
        assert_eq!(bounds.min(), [0., -1.]);
        assert_eq!(bounds.max(), [1., 0.]);
    }

    #[test]
    fn test_open_popup_respects_auto_close() {
        let mut map = TileMap::new(String::new());
        let first = map.add_marker(Coords::new(0., 0.));
        let second = map.add_marker(Coords::new(1., 1.));
        map.bind_popup(first, PopupOptions::for_kind(WorkoutKind::Running), "a".into());
        map.bind_popup(second, PopupOptions::for_kind(WorkoutKind::Cycling), "b".into());

        map.open_popup(first);
        map.open_popup(second);
        assert!(map.markers.iter().all(|m| m.popup.as_ref().unwrap().open));

        let mut closing = PopupOptions::for_kind(WorkoutKind::Running);
        closing.auto_close = true;
        let third = map.add_marker(Coords::new(2., 2.));
        map.bind_popup(third, closing, "c".into());
        map.open_popup(third);
        let open: Vec<bool> = map
            .markers
            .iter()
            .map(|m| m.popup.as_ref().unwrap().open)
            .collect();
        assert_eq!(open, vec![false, false, true]);
    }

    #[test]
    fn test_pan_finishes_on_target() {
        let mut map = TileMap::new(String::new());
        map.set_view(
            Coords::new(0., 0.),
            0,
            PanAnimation {
                animate: true,
                duration: Duration::from_millis(10),
            },
        );
        let later = Instant::now() + Duration::from_secs(1);
        let bounds = map.requested_bounds(Vec2::new(256., 256.), later).unwrap();

        assert_eq!(bounds.center(), PlotPoint::new(0.5, -0.5));
        assert!(map.view_change.is_none());
    }
}
