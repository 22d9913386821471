//! Main application state and logic.
//!
//! Contains the `DisplayApp` struct which owns the renderer, the event
//! session and the view settings, and reacts to toolbar actions.

use std::path::Path;

use anyhow::{anyhow, Context};
use eframe::egui;
use pmtdisplay_core::{EventSource, Navigation, Session};
use pmtdisplay_render::{Colormap, Frame, RenderConfig, Renderer, ViewKind, ViewRanges};
use rfd::FileDialog;

use crate::state::{parse_event, parse_range, range_text, Notice, UiState};
use crate::viewer::{frame_image, frame_rgba, Camera, SceneBounds};

/// Main application state.
pub struct DisplayApp {
    /// Geometry, flat map and render settings for the run.
    pub(crate) renderer: Renderer,
    /// Event archive and the event on display.
    pub(crate) session: Session<Box<dyn EventSource>>,

    /// Active display.
    pub(crate) view: ViewKind,
    /// Applied display ranges.
    pub(crate) ranges: ViewRanges,
    /// Current colormap selection.
    pub(crate) colormap: Colormap,
    /// Toolbar text fields.
    pub(crate) ui_state: UiState,

    /// Rendered frame for the current event and view.
    pub(crate) frame: Option<Frame>,
    /// Set when the frame must be rendered again.
    pub(crate) stale: bool,
    /// Cached texture of a 2D frame.
    pub(crate) texture: Option<egui::TextureHandle>,

    /// 3D view orientation.
    pub(crate) camera: Camera,
    /// Bounding sphere of the detector.
    pub(crate) scene: SceneBounds,

    /// Status bar message.
    pub(crate) notice: Option<Notice>,
}

impl DisplayApp {
    /// Reads the geometry and opens the event archive on `event`.
    ///
    /// # Errors
    /// Returns an error if either archive cannot be read or holds no events.
    pub fn load(geometry_path: &Path, events_path: &Path, event: usize) -> anyhow::Result<Self> {
        let geometry = pmtdisplay_io::read_geometry(geometry_path)
            .with_context(|| format!("reading geometry {}", geometry_path.display()))?;
        let source = pmtdisplay_io::open_event_archive(events_path)
            .with_context(|| format!("opening events {}", events_path.display()))?;
        let session = Session::open(source, event)
            .with_context(|| format!("loading event {event} of {}", events_path.display()))?;

        let notice = (session.index() != event).then(|| {
            Notice::warning(format!(
                "Event {event} is beyond the {} events in the file; showing event {}",
                session.len(),
                session.index()
            ))
        });

        let config = RenderConfig::default();
        let colormap = config.colormap;
        let scene = SceneBounds::from_geometry(&geometry);
        let renderer = Renderer::new(geometry, config);
        log::info!(
            "display ready: {} elements, {} events",
            renderer.geometry().len(),
            session.len()
        );

        Ok(Self {
            renderer,
            ui_state: UiState::new(session.index()),
            session,
            view: ViewKind::default(),
            ranges: ViewRanges::default(),
            colormap,
            frame: None,
            stale: true,
            texture: None,
            camera: Camera::default(),
            scene,
            notice,
        })
    }

    /// Drops the cached frame and texture.
    pub(crate) fn invalidate(&mut self) {
        self.stale = true;
        self.texture = None;
    }

    /// Switches the display and shows that view's range in the fields.
    pub(crate) fn select_view(&mut self, view: ViewKind) {
        if view == self.view {
            return;
        }
        self.view = view;
        (self.ui_state.zmin, self.ui_state.zmax) = range_text(self.ranges.get(view.z_quantity()));
        (self.ui_state.tmin, self.ui_state.tmax) = range_text(self.ranges.time);
        self.invalidate();
    }

    /// "Next Event": the typed event if it is new and not the last one,
    /// otherwise the following one.
    pub(crate) fn next_event(&mut self) {
        let requested = match parse_event(&self.ui_state.event_entry) {
            Ok(requested) => requested,
            Err(message) => {
                log::warn!("{message}");
                None
            }
        };
        let outcome = self.session.advance(requested);
        self.after_navigation(outcome, "At end of file, no more events to load");
    }

    /// "Prev Event".
    pub(crate) fn prev_event(&mut self) {
        let outcome = self.session.prev();
        self.after_navigation(outcome, "At start of file, no earlier events to load");
    }

    fn after_navigation(
        &mut self,
        outcome: pmtdisplay_core::Result<Navigation>,
        unchanged: &str,
    ) {
        match outcome {
            Ok(Navigation::Moved { .. }) => {
                self.notice = None;
                self.invalidate();
            }
            Ok(Navigation::Unchanged) => self.notice = Some(Notice::info(unchanged)),
            Err(err) => {
                log::error!("event load failed: {err}");
                self.notice = Some(Notice::error(format!("Event load failed: {err}")));
            }
        }
        self.ui_state.event_entry = self.session.index().to_string();
    }

    /// "Apply zrange": stores the typed ranges for the active view.
    pub(crate) fn apply_range(&mut self) {
        let z = match parse_range(&self.ui_state.zmin, &self.ui_state.zmax) {
            Ok(range) => range,
            Err(message) => {
                self.notice = Some(Notice::warning(message));
                return;
            }
        };
        if self.view == ViewKind::ChargeVsTime {
            match parse_range(&self.ui_state.tmin, &self.ui_state.tmax) {
                Ok(range) => self.ranges.time = range,
                Err(message) => {
                    self.notice = Some(Notice::warning(message));
                    return;
                }
            }
        }
        *self.ranges.get_mut(self.view.z_quantity()) = z;
        log::info!("{} range set to {z}", self.view.z_quantity());
        self.notice = None;
        self.invalidate();
    }

    /// Renders the current event if needed and refreshes the texture.
    pub(crate) fn ensure_frame(&mut self, ctx: &egui::Context) {
        if self.stale {
            self.stale = false;
            match self
                .renderer
                .render(self.view, self.session.event(), &self.ranges)
            {
                Ok(frame) => self.frame = Some(frame),
                Err(err) => {
                    log::error!("render failed: {err}");
                    self.notice = Some(Notice::error(format!("Render failed: {err}")));
                    self.frame = None;
                }
            }
        }
        if self.texture.is_none() {
            let max_side = ctx.input(|i| i.max_texture_side);
            if let Some(img) = self
                .frame
                .as_ref()
                .and_then(|frame| frame_image(frame, self.colormap, max_side))
            {
                self.texture = Some(ctx.load_texture("frame", img, egui::TextureOptions::NEAREST));
            }
        }
    }

    /// Whether the current frame can be written as a PNG.
    pub(crate) fn can_save(&self) -> bool {
        matches!(self.frame, Some(Frame::Image(_) | Frame::Histogram(_)))
    }

    /// Asks for a file name and writes the current 2D frame.
    pub(crate) fn save_png(&mut self) {
        let Some((size, pixels)) = self
            .frame
            .as_ref()
            .and_then(|frame| frame_rgba(frame, self.colormap))
        else {
            return;
        };
        let name = format!(
            "event{}_{}.png",
            self.session.index(),
            self.view.short_label().to_lowercase()
        );
        let Some(path) = FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(name)
            .save_file()
        else {
            return;
        };
        self.notice = Some(match write_png(&path, size, pixels) {
            Ok(()) => Notice::info(format!("Saved {}", path.display())),
            Err(err) => {
                log::error!("{err:#}");
                Notice::error(format!("{err:#}"))
            }
        });
    }
}

fn write_png(path: &Path, size: [usize; 2], pixels: Vec<u8>) -> anyhow::Result<()> {
    let width = u32::try_from(size[0])?;
    let height = u32::try_from(size[1])?;
    let img = image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| anyhow!("frame of {width}x{height} has the wrong pixel count"))?;
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

impl eframe::App for DisplayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        crate::ui::theme::apply_system_theme(ctx);
        self.ensure_frame(ctx);
        self.render_toolbar(ctx);
        self.render_status_bar(ctx);
        self.render_colorbar(ctx);
        self.render_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmtdisplay_core::{DisplayRange, Event, Geometry};

    fn app(n_events: u32) -> DisplayApp {
        let geometry = Geometry::from_arrays(
            &[1, 2, 3],
            &[[0.0, 800.0, 0.0], [1000.0, 0.0, 0.0], [0.0, 0.0, 1000.0]],
        )
        .unwrap();
        let events: Vec<Event> = (0..n_events)
            .map(|i| Event::new(vec![i % 3], vec![1.0], vec![f64::from(i)]).unwrap())
            .collect();
        let source: Box<dyn EventSource> = Box::new(events);
        let session = Session::open(source, 0).unwrap();
        DisplayApp {
            scene: SceneBounds::from_geometry(&geometry),
            renderer: Renderer::new(geometry, RenderConfig::default()),
            ui_state: UiState::new(0),
            session,
            view: ViewKind::Charge,
            ranges: ViewRanges::default(),
            colormap: Colormap::default(),
            frame: None,
            stale: true,
            texture: None,
            camera: Camera::default(),
            notice: None,
        }
    }

    #[test]
    fn test_next_event_uses_typed_number() {
        let mut app = app(5);
        app.ui_state.event_entry = "3".into();
        app.next_event();
        assert_eq!(app.session.index(), 3);
        assert_eq!(app.ui_state.event_entry, "3");
        assert!(app.stale);
    }

    #[test]
    fn test_typed_last_event_steps_forward() {
        let mut app = app(5);
        app.ui_state.event_entry = "4".into();
        app.next_event();
        assert_eq!(app.session.index(), 1);
        assert_eq!(app.ui_state.event_entry, "1");
    }

    #[test]
    fn test_next_event_at_end_sets_notice() {
        let mut app = app(2);
        app.next_event();
        assert_eq!(app.session.index(), 1);
        app.stale = false;
        app.next_event();
        assert_eq!(app.session.index(), 1);
        assert!(!app.stale);
        let notice = app.notice.unwrap();
        assert_eq!(notice.text, "At end of file, no more events to load");
    }

    #[test]
    fn test_bad_event_entry_advances() {
        let mut app = app(3);
        app.ui_state.event_entry = "abc".into();
        app.next_event();
        assert_eq!(app.session.index(), 1);
    }

    #[test]
    fn test_apply_range_per_view() {
        let mut app = app(1);
        app.ui_state.zmin = "1".into();
        app.ui_state.zmax = "4".into();
        app.apply_range();
        assert_eq!(app.ranges.charge, DisplayRange::new(1.0, 4.0));
        assert!(app.ranges.time.is_auto());

        app.select_view(ViewKind::ChargeVsTime);
        assert_eq!(app.ui_state.zmin, "1");
        app.ui_state.tmin = "-5".into();
        app.ui_state.tmax = "5".into();
        app.apply_range();
        assert_eq!(app.ranges.time, DisplayRange::new(-5.0, 5.0));

        app.select_view(ViewKind::Scatter3D);
        assert_eq!(app.ui_state.zmin, "-5");
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let mut app = app(1);
        app.ui_state.zmin = "9".into();
        app.ui_state.zmax = "1".into();
        app.apply_range();
        assert!(app.ranges.charge.is_auto());
        assert!(app.notice.is_some());
    }

    #[test]
    fn test_save_only_for_2d_frames() {
        let mut app = app(1);
        let ctx = egui::Context::default();
        app.ensure_frame(&ctx);
        assert!(app.can_save());
        assert!(app.texture.is_some());

        app.select_view(ViewKind::Scatter3D);
        app.ensure_frame(&ctx);
        assert!(!app.can_save());
        assert!(app.texture.is_none());
    }

    #[test]
    fn test_flat_image_texture_fits_context_limit() {
        let mut app = app(2);
        let ctx = egui::Context::default();
        let max_side = ctx.input(|i| i.max_texture_side);
        app.ensure_frame(&ctx);

        let size = app.texture.as_ref().unwrap().size();
        assert!(size[0] <= max_side && size[1] <= max_side);
        let config = app.renderer.config();
        assert!(config.image_cols > max_side || config.image_rows > max_side);
    }
}
