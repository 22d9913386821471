//! Main view (central panel) rendering.

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Stroke};
use egui_plot::{Plot, PlotImage, PlotPoint};
use pmtdisplay_core::Quantity;
use pmtdisplay_render::image::{X_AXIS_LABEL, Y_AXIS_LABEL};
use pmtdisplay_render::{Frame, Scatter3D, IMAGE_EXTENT};

use crate::app::DisplayApp;
use crate::ui::theme::ThemeColors;
use crate::util::f64_to_f32;
use crate::viewer::Projector;

/// Zoom factor per scrolled point.
const SCROLL_ZOOM: f32 = 0.005;

fn to_pos(x: f64, y: f64) -> Pos2 {
    Pos2::new(f64_to_f32(x), f64_to_f32(y))
}

fn rgba(c: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

impl DisplayApp {
    /// Render the central panel with the active display.
    pub(crate) fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(self.view.title(self.session.index()));
            });
            match self.frame {
                Some(Frame::Image(_)) => self.render_image_plot(ui),
                Some(Frame::Histogram(_)) => self.render_histogram_plot(ui),
                Some(Frame::Scatter(_)) => self.render_scatter(ui),
                None => {
                    ui.centered_and_justified(|ui| ui.label("No Data"));
                }
            }
        });
    }

    fn render_image_plot(&mut self, ui: &mut egui::Ui) {
        let Some(tex) = &self.texture else {
            return;
        };
        let [x0, x1, y0, y1] = IMAGE_EXTENT;
        let image = PlotImage::new(
            tex,
            PlotPoint::new((x0 + x1) / 2.0, (y0 + y1) / 2.0),
            [f64_to_f32(x1 - x0), f64_to_f32(y1 - y0)],
        );
        let response = Plot::new(("frame_plot", self.view))
            .data_aspect(1.0)
            .x_axis_label(X_AXIS_LABEL)
            .y_axis_label(Y_AXIS_LABEL)
            .show(ui, |plot_ui| {
                plot_ui.image(image);
                plot_ui.pointer_coordinate()
            });
        self.ui_state.cursor = response.inner.map(|p| [p.x, p.y]);
    }

    fn render_histogram_plot(&mut self, ui: &mut egui::Ui) {
        let (Some(tex), Some(Frame::Histogram(hist))) = (&self.texture, &self.frame) else {
            return;
        };
        let (t0, t1) = hist.time_range();
        let (q0, q1) = hist.charge_range();
        let image = PlotImage::new(
            tex,
            PlotPoint::new((t0 + t1) / 2.0, (q0 + q1) / 2.0),
            [f64_to_f32(t1 - t0), f64_to_f32(q1 - q0)],
        );
        let response = Plot::new(("frame_plot", self.view))
            .x_axis_label(Quantity::Time.axis_label())
            .y_axis_label(Quantity::Charge.axis_label())
            .show(ui, |plot_ui| {
                plot_ui.image(image);
                plot_ui.pointer_coordinate()
            });
        self.ui_state.cursor = response.inner.map(|p| [p.x, p.y]);
    }

    fn render_scatter(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, ThemeColors::from_ui(ui).bg_dark);

        if response.dragged() {
            let delta = response.drag_delta();
            self.camera.drag(f64::from(delta.x), f64::from(delta.y));
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.zoom_by(f64::from((scroll * SCROLL_ZOOM).exp()));
            }
        }
        if response.double_clicked() {
            self.camera = crate::viewer::Camera::default();
        }
        self.ui_state.cursor = None;

        let Some(Frame::Scatter(scatter)) = &self.frame else {
            return;
        };
        let projector = Projector::new(
            &self.camera,
            &self.scene,
            (f64::from(rect.center().x), f64::from(rect.center().y)),
            (f64::from(rect.width()), f64::from(rect.height())),
        );
        paint_scatter(&painter, &projector, scatter, self.colormap);
    }
}

/// Draws hit markers far to near, then the track overlays.
fn paint_scatter(
    painter: &egui::Painter,
    projector: &Projector,
    scatter: &Scatter3D,
    colormap: pmtdisplay_render::Colormap,
) {
    let mut markers: Vec<_> = scatter
        .points()
        .iter()
        .map(|point| {
            let p = projector.project(&point.position);
            let radius = (point.marker_size.sqrt() / 2.0).max(1.0);
            (p, radius, rgba(scatter.color_of(point, colormap)))
        })
        .collect();
    markers.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

    for (p, radius, color) in markers {
        painter.circle_filled(to_pos(p.x, p.y), f64_to_f32(radius), color);
    }

    for track in scatter.tracks() {
        let [r, g, b] = track.species.color();
        let color = Color32::from_rgb(r, g, b);
        let start = projector.project(&track.start);
        let stop = projector.project(&track.stop);
        let start = to_pos(start.x, start.y);
        painter.line_segment([start, to_pos(stop.x, stop.y)], Stroke::new(2.0, color));
        painter.text(
            start,
            Align2::LEFT_BOTTOM,
            &track.label,
            FontId::proportional(12.0),
            color,
        );
    }
}
