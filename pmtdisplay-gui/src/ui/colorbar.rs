//! Colour scale beside the main view.

use eframe::egui::{self, Color32, Rect, Stroke};
use pmtdisplay_core::Quantity;
use pmtdisplay_render::{Colormap, Frame, ViewKind};

use crate::app::DisplayApp;
use crate::ui::theme::{form_label, ThemeColors};
use crate::util::{format_value, usize_to_f32, usize_to_f64};

const BAR_STEPS: usize = 128;
const BAR_WIDTH: f32 = 18.0;

/// Colour bounds and caption of a frame.
pub(crate) fn colour_scale(view: ViewKind, frame: &Frame) -> (f64, f64, &'static str) {
    match frame {
        Frame::Image(image) => {
            let (lo, hi) = image.bounds();
            (lo, hi, view.z_quantity().axis_label())
        }
        Frame::Histogram(hist) => {
            #[allow(clippy::cast_precision_loss)]
            let max = hist.max_count() as f64;
            (0.0, max, "Hits")
        }
        Frame::Scatter(scatter) => {
            let (lo, hi) = scatter.time_bounds();
            (lo, hi, Quantity::Time.axis_label())
        }
    }
}

impl DisplayApp {
    /// Render the colour bar panel on the right.
    pub(crate) fn render_colorbar(&self, ctx: &egui::Context) {
        let Some(frame) = &self.frame else {
            return;
        };
        let (lo, hi, caption) = colour_scale(self.view, frame);

        egui::SidePanel::right("colorbar")
            .resizable(false)
            .exact_width(96.0)
            .show(ctx, |ui| {
                let colors = ThemeColors::from_ui(ui);
                ui.add_space(8.0);
                ui.label(form_label(caption));
                ui.label(egui::RichText::new(format_value(hi)).color(colors.text_primary));

                let height = (ui.available_height() - 32.0).max(40.0);
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(BAR_WIDTH, height), egui::Sense::hover());
                paint_gradient(ui.painter(), rect, self.colormap);
                ui.painter()
                    .rect_stroke(rect, 0.0, Stroke::new(1.0, colors.border));

                ui.label(egui::RichText::new(format_value(lo)).color(colors.text_primary));
            });
    }
}

/// Fills `rect` with the colormap, high values at the top.
fn paint_gradient(painter: &egui::Painter, rect: Rect, colormap: Colormap) {
    let step = rect.height() / usize_to_f32(BAR_STEPS);
    for i in 0..BAR_STEPS {
        let value = 1.0 - (usize_to_f64(i) + 0.5) / usize_to_f64(BAR_STEPS);
        let [r, g, b, _] = colormap.apply(value);
        let top = rect.top() + step * usize_to_f32(i);
        let cell = Rect::from_min_max(
            egui::pos2(rect.left(), top),
            egui::pos2(rect.right(), top + step + 0.5),
        );
        painter.rect_filled(cell, 0.0, Color32::from_rgb(r, g, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmtdisplay_render::{ChargeTimeHistogram, FlatImage};

    #[test]
    fn test_scale_of_empty_image() {
        let frame = Frame::Image(FlatImage::new(2, 2));
        let (lo, hi, caption) = colour_scale(ViewKind::Time, &frame);
        assert_eq!((lo, hi), (0.0, 0.0));
        assert_eq!(caption, "Time (ns)");
    }

    #[test]
    fn test_scale_of_histogram_is_counts() {
        let mut hist = ChargeTimeHistogram::new(2, 2, (0.0, 1.0), (0.0, 1.0));
        hist.fill(0.2, 0.2);
        hist.fill(0.2, 0.3);
        let (lo, hi, caption) = colour_scale(ViewKind::ChargeVsTime, &Frame::Histogram(hist));
        assert_eq!((lo, hi), (0.0, 2.0));
        assert_eq!(caption, "Hits");
    }
}
