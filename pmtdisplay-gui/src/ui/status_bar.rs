//! Bottom status bar.

use eframe::egui;

use crate::app::DisplayApp;
use crate::state::NoticeLevel;
use crate::ui::theme::{accent, ThemeColors};
use crate::util::format_value;

impl DisplayApp {
    /// Render the bottom status bar.
    pub(crate) fn render_status_bar(&self, ctx: &egui::Context) {
        let colors = ThemeColors::from_ctx(ctx);

        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                egui::Frame::none()
                    .fill(colors.bg_header)
                    .inner_margin(egui::Margin {
                        left: 16.0,
                        right: 16.0,
                        top: 6.0,
                        bottom: 6.0,
                    }),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let colors = ThemeColors::from_ui(ui);
                    self.render_notice(ui);
                    ui.separator();

                    let event = self.session.event();
                    ui.label(
                        egui::RichText::new(format!(
                            "Event {} of {} | {} hits | {} tracks",
                            self.session.index(),
                            self.session.len(),
                            event.len(),
                            event.tracks().len()
                        ))
                        .size(11.0)
                        .color(colors.text_muted),
                    );

                    if let Some([x, y]) = self.ui_state.cursor {
                        ui.separator();
                        ui.label(
                            egui::RichText::new(format!(
                                "x {}  y {}",
                                format_value(x),
                                format_value(y)
                            ))
                            .size(11.0)
                            .color(colors.text_muted),
                        );
                    }
                });
            });
    }

    fn render_notice(&self, ui: &mut egui::Ui) {
        let (color, text) = match &self.notice {
            Some(notice) => {
                let color = match notice.level {
                    NoticeLevel::Info => accent::BLUE,
                    NoticeLevel::Warning => accent::AMBER,
                    NoticeLevel::Error => accent::RED,
                };
                (color, notice.text.as_str())
            }
            None => (accent::GREEN, "Ready"),
        };
        ui.label(egui::RichText::new("●").size(11.0).color(color));
        ui.label(egui::RichText::new(text).size(11.0).color(color));
    }
}
