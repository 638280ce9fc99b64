use eframe::egui::{self, Key, Response, Ui};
use tracing::info;

use crate::engine::{ForceIntegrator, ForceKey, ForceSettings, apply_setting};

use super::super::ViewModel;

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

fn default_slider_key_step(min: f32, max: f32) -> f32 {
    ((max - min) / 200.0).max(0.0005)
}

fn force_hint(key: ForceKey) -> &'static str {
    match key {
        ForceKey::ChargeStrength => "Many-body repulsion between all nodes. More negative pushes harder.",
        ForceKey::LinkDistance => "Rest length of every edge spring.",
        ForceKey::CenterForce => "How strongly the whole graph is kept around the hub.",
        ForceKey::CollisionRadius => "Minimum spacing radius between node centres.",
        ForceKey::PolygonRadius => "Distance from the hub to each cluster anchor.",
    }
}

fn apply_slider_arrow_acceleration(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    min: f32,
    max: f32,
    step: f32,
) -> bool {
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHoldState::default()));
        return false;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    if increase_down {
        hold_state.positive_secs += delta_time;
    } else {
        hold_state.positive_secs = 0.0;
    }

    if decrease_down {
        hold_state.negative_secs += delta_time;
    } else {
        hold_state.negative_secs = 0.0;
    }

    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);
    let delta = direction as f32 * step * speed * delta_time;

    let old_value = *value;
    *value = (*value + delta).clamp(min, max);
    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        let now = ui.input(|input| input.time);

        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search")
            .on_hover_text("Centres the view on the first node whose label matches.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.changed() {
            self.search_missed = false;
        }
        let submitted =
            search_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
        ui.horizontal(|ui| {
            if ui.button("Find").clicked() || submitted {
                self.run_search(now);
            }
            if self.search_missed {
                ui.weak("No match");
            }
        });

        ui.separator();

        ui.horizontal_wrapped(|ui| {
            if ui.button("Zoom in").clicked() {
                self.camera.zoom_in(now);
            }
            if ui.button("Zoom out").clicked() {
                self.camera.zoom_out(now);
            }
            if ui.button("Reset view").on_hover_text("Fit every node in the canvas.").clicked() {
                self.request_reset_view();
            }
        });

        let bloom_label = if self.controller.snapshot().expanded {
            "Collapse"
        } else {
            "Bloom"
        };
        if ui.button(bloom_label).on_hover_text("Same as clicking the sun.").clicked() {
            self.toggle_bloom(now);
        }

        ui.separator();

        ui.checkbox(&mut self.night_mode, "Night mode")
            .on_hover_text("Switch to the dark palette.");
        ui.checkbox(&mut self.show_labels, "Show labels")
            .on_hover_text("Draw node labels when zoom and weight allow it.");
        ui.checkbox(&mut self.paused, "Pause simulation")
            .on_hover_text("Freeze node positions. Camera and animations keep running.");

        let pinned = self.simulation.pinned_count();
        let unpin = ui.add_enabled(pinned > 0, egui::Button::new(format!("Unpin all ({pinned})")));
        if unpin
            .on_hover_text("Release every node fixed with a right click.")
            .clicked()
        {
            let released = self.simulation.release_all();
            self.simulation.reheat();
            info!(released, "unpinned all nodes");
        }

        ui.collapsing("Forces", |ui| {
            for key in ForceKey::ALL {
                let range = key.range();
                let (min, max) = (*range.start(), *range.end());
                let value = self.settings.get_mut(key);
                let slider = ui
                    .add(
                        egui::Slider::new(value, range)
                            .text(key.label())
                            .clamping(egui::SliderClamping::Always),
                    )
                    .on_hover_text(force_hint(key));
                if slider.hovered() {
                    slider.request_focus();
                }
                let mut changed = slider.changed();
                changed |= apply_slider_arrow_acceleration(
                    ui,
                    &slider,
                    self.settings.get_mut(key),
                    min,
                    max,
                    default_slider_key_step(min, max),
                );
                if changed {
                    apply_setting(
                        &mut self.simulation,
                        &self.graph,
                        &self.settings,
                        key,
                        &mut self.controller,
                    );
                }
            }

            let defaults = ForceSettings::default();
            let changed = self.settings.changed_keys(&defaults);
            if ui
                .add_enabled(!changed.is_empty(), egui::Button::new("Reset forces"))
                .clicked()
            {
                self.settings = defaults;
                for key in changed {
                    apply_setting(
                        &mut self.simulation,
                        &self.graph,
                        &self.settings,
                        key,
                        &mut self.controller,
                    );
                }
            }
        });
    }
}
