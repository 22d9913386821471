//! Top toolbar: view selection, navigation, display ranges and actions.

use eframe::egui;
use pmtdisplay_render::{Colormap, ViewKind};

use crate::app::DisplayApp;
use crate::ui::theme::{accent, form_label, primary_button, ThemeColors};

const FIELD_WIDTH: f32 = 64.0;

impl DisplayApp {
    /// Render the toolbar panel.
    pub(crate) fn render_toolbar(&mut self, ctx: &egui::Context) {
        let colors = ThemeColors::from_ctx(ctx);

        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::none()
                    .fill(colors.bg_header)
                    .inner_margin(egui::Margin {
                        left: 16.0,
                        right: 16.0,
                        top: 8.0,
                        bottom: 8.0,
                    }),
            )
            .show(ctx, |ui| {
                ui.set_min_height(36.0);
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(10.0, 0.0);
                    self.render_view_buttons(ui);
                    ui.separator();
                    self.render_navigation(ui);
                    ui.separator();
                    self.render_range_fields(ui);
                    ui.separator();
                    self.render_actions(ui);
                });
            });
    }

    fn render_view_buttons(&mut self, ui: &mut egui::Ui) {
        for view in ViewKind::ALL {
            let selected = self.view == view;
            let text = egui::RichText::new(view.short_label()).strong();
            let text = if selected { text.color(accent::BLUE) } else { text };
            if ui
                .selectable_label(selected, text)
                .on_hover_text(view.to_string())
                .clicked()
            {
                self.select_view(view);
            }
        }
    }

    fn render_navigation(&mut self, ui: &mut egui::Ui) {
        ui.label(form_label("Event"));
        let entry = ui.add(
            egui::TextEdit::singleline(&mut self.ui_state.event_entry).desired_width(FIELD_WIDTH),
        );
        let submitted = entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if ui.button("Prev Event").clicked() {
            self.prev_event();
        }
        if ui.add(primary_button("Next Event")).clicked() || submitted {
            self.next_event();
        }
    }

    fn render_range_fields(&mut self, ui: &mut egui::Ui) {
        let state = &mut self.ui_state;
        let mut submitted = false;
        let mut field = |ui: &mut egui::Ui, label: &str, text: &mut String| {
            ui.label(form_label(label));
            let response = ui.add(egui::TextEdit::singleline(text).desired_width(FIELD_WIDTH));
            submitted |= response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        };

        field(ui, "zmin", &mut state.zmin);
        field(ui, "zmax", &mut state.zmax);
        if self.view == ViewKind::ChargeVsTime {
            field(ui, "tmin", &mut state.tmin);
            field(ui, "tmax", &mut state.tmax);
        }

        if ui.button("Apply zrange").clicked() || submitted {
            self.apply_range();
        }
    }

    fn render_actions(&mut self, ui: &mut egui::Ui) {
        let previous = self.colormap;
        egui::ComboBox::from_id_salt("colormap_select")
            .selected_text(self.colormap.to_string())
            .show_ui(ui, |ui| {
                for cmap in Colormap::ALL {
                    ui.selectable_value(&mut self.colormap, cmap, cmap.to_string());
                }
            });
        if self.colormap != previous {
            self.texture = None;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
            let can_save = self.can_save();
            if ui
                .add_enabled(can_save, egui::Button::new("Save PNG"))
                .on_disabled_hover_text("Only the Q, T and QT displays can be saved")
                .clicked()
            {
                self.save_png();
            }
        });
    }
}
