//! pmtdisplay CLI.
//!
//! Inspects geometry and event archives and exports rendered frames.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand, ValueEnum};

use pmtdisplay_core::{DisplayRange, EventSource, Quantity, Session};
use pmtdisplay_render::{
    Colormap, Frame, Geometry, Region, RenderConfig, Renderer, ViewKind, ViewRanges,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] pmtdisplay_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] pmtdisplay_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// View selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    /// Flat image of hit charges
    Q,
    /// Flat image of hit times
    T,
    /// Charge versus time histogram
    Qt,
    /// 3D hit positions (exported as JSON)
    #[value(name = "3d")]
    Scatter,
}

impl From<View> for ViewKind {
    fn from(view: View) -> Self {
        match view {
            View::Q => ViewKind::Charge,
            View::T => ViewKind::Time,
            View::Qt => ViewKind::ChargeVsTime,
            View::Scatter => ViewKind::Scatter3D,
        }
    }
}

/// Colormap selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColormapArg {
    /// Reversed cubehelix
    Cubehelix,
    /// Viridis
    Viridis,
    /// Hot (thermal)
    Hot,
    /// Grayscale
    Grayscale,
}

impl From<ColormapArg> for Colormap {
    fn from(arg: ColormapArg) -> Self {
        match arg {
            ColormapArg::Cubehelix => Colormap::CubehelixReversed,
            ColormapArg::Viridis => Colormap::Viridis,
            ColormapArg::Hot => Colormap::Hot,
            ColormapArg::Grayscale => Colormap::Grayscale,
        }
    }
}

/// PMT event display: archive inspection and frame export.
#[derive(Parser)]
#[command(name = "pmtdisplay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a geometry archive and optionally an event archive
    Info {
        /// Geometry archive (.npz, .h5)
        geometry: PathBuf,

        /// Event archive (.npz, .h5)
        events: Option<PathBuf>,
    },

    /// Render one event and export it
    Render {
        /// Geometry archive (.npz, .h5)
        geometry: PathBuf,

        /// Event archive (.npz, .h5)
        events: PathBuf,

        /// Event number (clamped to the last event)
        #[arg(short, long, default_value = "0")]
        event: usize,

        /// View to render
        #[arg(long, value_enum, default_value = "q")]
        view: View,

        /// Charge display range; equal values mean auto
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
        charge_range: Option<Vec<f64>>,

        /// Time display range; equal values mean auto
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
        time_range: Option<Vec<f64>>,

        /// Colormap for PNG output
        #[arg(long, value_enum)]
        colormap: Option<ColormapArg>,

        /// Render configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file (.png for Q/T/QT, .json for 3D)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn display_range(values: Option<Vec<f64>>) -> Result<DisplayRange> {
    match values.as_deref() {
        None => Ok(DisplayRange::AUTO),
        Some(&[min, max]) if min <= max => Ok(DisplayRange::new(min, max)),
        Some(&[min, max]) => Err(CliError::InvalidArgument(format!(
            "range minimum {min} exceeds maximum {max}"
        ))),
        Some(other) => Err(CliError::InvalidArgument(format!(
            "expected two range values, got {}",
            other.len()
        ))),
    }
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let file = File::open(path)?;
    let config = serde_json::from_reader(file)?;
    log::info!("render configuration loaded from {}", path.display());
    Ok(config)
}

fn print_geometry(path: &Path, geometry: &Geometry, renderer: &Renderer) {
    let mut top = 0usize;
    let mut bottom = 0usize;
    let mut barrel = 0usize;
    for element in geometry.elements() {
        match Region::of(&element.position) {
            Region::TopCap => top += 1,
            Region::BottomCap => bottom += 1,
            Region::Barrel => barrel += 1,
        }
    }
    println!("Geometry: {}", path.display());
    println!("Elements: {}", geometry.len());
    println!("  top cap: {}", top);
    println!("  barrel: {}", barrel);
    println!("  bottom cap: {}", bottom);
    println!("Barrel radius: {:.1} cm", geometry.barrel_radius());
    if let Some(extent) = renderer.flat_map().extent() {
        println!(
            "Flat extent: x {} - {}, y {} - {}",
            extent.min_x, extent.max_x, extent.min_y, extent.max_y
        );
        let config = renderer.config();
        if extent.min_x < 0
            || extent.min_y < 0
            || usize::try_from(extent.max_x).is_ok_and(|x| x >= config.image_cols)
            || usize::try_from(extent.max_y).is_ok_and(|y| y >= config.image_rows)
        {
            println!(
                "Warning: flat extent exceeds the {}x{} image grid",
                config.image_rows, config.image_cols
            );
        }
    }
}

fn print_events(path: &Path, source: &dyn EventSource) -> Result<()> {
    let mut total_hits = 0usize;
    let mut total_tracks = 0usize;
    let mut largest = 0usize;
    for index in 0..source.len() {
        let event = source.load(index)?;
        total_hits += event.len();
        total_tracks += event.tracks().len();
        largest = largest.max(event.len());
    }
    println!("Events: {} ({})", source.len(), path.display());
    println!("Total hits: {}", total_hits);
    println!("Largest event: {} hits", largest);
    println!("Total tracks: {}", total_tracks);
    Ok(())
}

fn write_png(path: &Path, width: usize, height: usize, rgba: Vec<u8>) -> Result<()> {
    let too_large = || CliError::InvalidArgument(format!("frame {width}x{height} has invalid dimensions"));
    let width = u32::try_from(width).map_err(|_| too_large())?;
    let height = u32::try_from(height).map_err(|_| too_large())?;
    let img = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(too_large)?;
    img.save(path)?;
    Ok(())
}

fn export_frame(frame: &Frame, colormap: Colormap, output: &Path) -> Result<()> {
    match frame {
        Frame::Image(image) => write_png(output, image.cols(), image.rows(), image.to_rgba(colormap)),
        Frame::Histogram(hs) => write_png(
            output,
            hs.n_time_bins(),
            hs.n_charge_bins(),
            hs.to_rgba(colormap),
        ),
        Frame::Scatter(scatter) => {
            let writer = BufWriter::new(File::create(output)?);
            serde_json::to_writer_pretty(writer, scatter)?;
            Ok(())
        }
    }
}

fn describe_frame(title: &str, frame: &Frame) {
    println!("{}", title);
    match frame {
        Frame::Image(image) => {
            let (vmin, vmax) = image.bounds();
            println!("Painted hits: {}", image.painted_hits());
            println!("Colour bounds: {} - {}", vmin, vmax);
            if image.clipped_cells() > 0 {
                println!("Clipped cells: {}", image.clipped_cells());
            }
        }
        Frame::Histogram(hs) => {
            let (t0, t1) = hs.time_range();
            let (q0, q1) = hs.charge_range();
            println!("{}: {} - {}", Quantity::Time.axis_label(), t0, t1);
            println!("{}: {} - {}", Quantity::Charge.axis_label(), q0, q1);
            println!("Entries: {} (max bin {})", hs.total(), hs.max_count());
        }
        Frame::Scatter(scatter) => {
            let (t0, t1) = scatter.time_bounds();
            println!("Points: {}", scatter.points().len());
            println!("Time bounds: {} - {}", t0, t1);
            for track in scatter.tracks() {
                println!("  {} track: {}", track.species, track.label);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { geometry, events } => {
            let geo = pmtdisplay_io::read_geometry(&geometry)?;
            let renderer = Renderer::new(geo.clone(), RenderConfig::default());
            print_geometry(&geometry, &geo, &renderer);
            if let Some(events) = events {
                let source = pmtdisplay_io::open_event_archive(&events)?;
                print_events(&events, source.as_ref())?;
            }
        }

        Commands::Render {
            geometry,
            events,
            event,
            view,
            charge_range,
            time_range,
            colormap,
            config,
            output,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(colormap) = colormap {
                config.colormap = colormap.into();
            }
            let ranges = ViewRanges {
                charge: display_range(charge_range)?,
                time: display_range(time_range)?,
            };
            let view = ViewKind::from(view);

            let renderer = Renderer::new(pmtdisplay_io::read_geometry(&geometry)?, config);
            let source = pmtdisplay_io::open_event_archive(&events)?;
            let session = Session::open(source, event)?;

            let frame = renderer.render(view, session.event(), &ranges)?;
            describe_frame(&view.title(session.index()), &frame);

            if let Some(output) = output {
                export_frame(&frame, renderer.config().colormap, &output)?;
                println!("Wrote {}", output.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_range_parsing() {
        assert!(display_range(None).unwrap().is_auto());
        assert_eq!(
            display_range(Some(vec![-5.0, 20.0])).unwrap(),
            DisplayRange::new(-5.0, 20.0)
        );
        assert!(display_range(Some(vec![3.0, 3.0])).unwrap().is_auto());
        assert!(display_range(Some(vec![4.0, 1.0])).is_err());
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "pmtdisplay",
            "render",
            "geo.npz",
            "ev.npz",
            "--view",
            "3d",
            "--time-range",
            "-10",
            "50",
            "-e",
            "4",
        ])
        .unwrap();
        let Commands::Render {
            view,
            time_range,
            event,
            ..
        } = cli.command
        else {
            panic!("expected render");
        };
        assert!(matches!(view, View::Scatter));
        assert_eq!(time_range, Some(vec![-10.0, 50.0]));
        assert_eq!(event, 4);
    }

    #[test]
    fn test_png_export_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.png");
        write_png(&path, 3, 2, vec![255; 3 * 2 * 4]).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert!(write_png(&path, 3, 3, vec![0; 4]).is_err());
    }
}
