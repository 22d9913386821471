//! pmtdisplay-render: Flat mapping and frame rendering.
//!
//! This crate provides:
//! - **Flat map** - unrolls the cylindrical detector onto a 2D pixel layout
//! - **Image** - per-hit intensity blocks on the flat layout
//! - **Histogram** - charge versus time
//! - **Scatter** - hits at their 3D tube positions with track overlays
//!
#![warn(missing_docs)]

pub mod colormap;
mod config;
pub mod flat_map;
pub mod histogram;
pub mod image;
pub mod scatter;
mod view;

pub use colormap::Colormap;
pub use config::RenderConfig;
pub use flat_map::{project, FlatCoord, FlatExtent, FlatMap, Region};
pub use histogram::{render_histogram, ChargeTimeHistogram};
pub use image::{render_image, FlatImage, IMAGE_EXTENT};
pub use scatter::{render_scatter, select_tracks, Scatter3D, ScatterPoint, Species, TrackSegment};
pub use view::{Frame, Renderer, ViewKind, ViewRanges};

// Re-export the core model used in rendering signatures
pub use pmtdisplay_core::{DisplayRange, Event, Geometry, Quantity};
