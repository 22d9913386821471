//! pmtdisplay GUI entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod state;
mod ui;
mod util;
mod viewer;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use app::DisplayApp;
use clap::Parser;
use eframe::egui;
use rfd::FileDialog;

/// Interactive PMT event display.
#[derive(Parser, Debug)]
#[command(name = "pmtdisplay-gui", version, about)]
struct Args {
    /// Geometry archive (.npz, .h5); asked for if omitted.
    geometry: Option<PathBuf>,

    /// Event archive (.npz, .h5); asked for if omitted.
    events: Option<PathBuf>,

    /// Event to show first.
    #[arg(default_value_t = 0)]
    event: usize,
}

fn pick_file(title: &str) -> Option<PathBuf> {
    FileDialog::new()
        .set_title(title)
        .add_filter("Archives", &["npz", "h5", "hdf5"])
        .pick_file()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let geometry = args
        .geometry
        .or_else(|| pick_file("Open geometry file"))
        .context("no geometry file selected")?;
    let events = args
        .events
        .or_else(|| pick_file("Open event file"))
        .context("no event file selected")?;
    let app = DisplayApp::load(&geometry, &events, args.event)?;

    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native(
        "pmtdisplay",
        opts,
        Box::new(|cc| {
            ui::theme::configure_style(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow!("display window failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_positional() {
        let args = Args::try_parse_from(["pmtdisplay-gui", "geo.npz", "ev.npz", "7"]).unwrap();
        assert_eq!(args.geometry, Some(PathBuf::from("geo.npz")));
        assert_eq!(args.event, 7);

        let args = Args::try_parse_from(["pmtdisplay-gui"]).unwrap();
        assert!(args.events.is_none());
        assert_eq!(args.event, 0);
    }
}
