use std::time::Instant;

use chrono::Local;
use egui::{Color32, ComboBox, Frame, Key, Response, RichText, Sense, Stroke, TextEdit, Ui};
use itertools::Itertools;

use mapty::form::ListEntry;
use mapty::{AppEvent, WorkoutKind};

use super::{MaptyApp, PALETTE_CYCLING, PALETTE_DARK_ALT, PALETTE_LIGHT, PALETTE_RUNNING};

const INPUT_WIDTH: f32 = 90.;

impl MaptyApp {
    pub(crate) fn workouts_panel(&mut self, ui: &mut Ui, now: Instant, events: &mut Vec<AppEvent>) {
        ui.add_space(10.);
        ui.heading(RichText::new("mapty").color(PALETTE_LIGHT).strong());
        ui.add_space(10.);

        if self.log.form().is_interactive(now) {
            self.workout_form(ui, events);
            ui.add_space(10.);
        } else if self.log.list().is_empty() {
            ui.label("Click on the map to log a workout.");
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            // newest first
            for entry in self.log.list().iter().rev() {
                if list_item(ui, entry).clicked() {
                    events.push(AppEvent::ListEntryActivated(entry.id.clone()));
                }
                ui.add_space(6.);
            }
        });
    }

    fn workout_form(&mut self, ui: &mut Ui, events: &mut Vec<AppEvent>) {
        let form = self.log.form_mut();
        let focus_distance = form.take_focus_request();
        let mut kind = form.kind();
        let mut submitted = false;

        Frame::group(ui.style()).fill(PALETTE_DARK_ALT).show(ui, |ui| {
            egui::Grid::new("workout_form")
                .num_columns(4)
                .spacing([10., 8.])
                .show(ui, |ui| {
                    ui.label("Type");
                    ComboBox::from_id_salt("workout_kind")
                        .selected_text(kind.label())
                        .width(INPUT_WIDTH)
                        .show_ui(ui, |ui| {
                            for option in WorkoutKind::ALL {
                                ui.selectable_value(&mut kind, option, option.label());
                            }
                        });

                    let inputs = form.inputs_mut();
                    ui.label("Distance");
                    let distance = form_input(ui, &mut inputs.distance, "km");
                    if focus_distance {
                        distance.request_focus();
                    }
                    submitted |= enter_pressed(ui, &distance);
                    ui.end_row();

                    ui.label("Duration");
                    let duration = form_input(ui, &mut inputs.duration, "min");
                    submitted |= enter_pressed(ui, &duration);

                    // only the field of the current kind is shown
                    let extra = match kind {
                        WorkoutKind::Running => {
                            ui.label("Cadence");
                            form_input(ui, &mut inputs.cadence, "step/min")
                        }
                        WorkoutKind::Cycling => {
                            ui.label("Elev Gain");
                            form_input(ui, &mut inputs.elevation, "meters")
                        }
                    };
                    submitted |= enter_pressed(ui, &extra);
                    ui.end_row();
                });

            ui.add_space(4.);
            submitted |= ui.button("OK").clicked();
        });

        if kind != self.log.form().kind() {
            events.push(AppEvent::KindChanged(kind));
        }
        if submitted {
            events.push(AppEvent::FormSubmitted(Local::now()));
        }
    }
}

fn form_input(ui: &mut Ui, value: &mut String, hint: &str) -> Response {
    ui.add(
        TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(INPUT_WIDTH),
    )
}

fn enter_pressed(ui: &Ui, response: &Response) -> bool {
    response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter))
}

fn list_item(ui: &mut Ui, entry: &ListEntry) -> Response {
    let accent = match entry.kind {
        WorkoutKind::Running => PALETTE_RUNNING,
        WorkoutKind::Cycling => PALETTE_CYCLING,
    };

    Frame::group(ui.style())
        .fill(PALETTE_DARK_ALT)
        .stroke(Stroke::new(2., accent))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(&entry.title).color(Color32::WHITE).strong());
            ui.label(
                entry
                    .details
                    .iter()
                    .map(|d| format!("{} {} {}", d.icon, d.value, d.unit))
                    .join("   "),
            );
        })
        .response
        .interact(Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
}
