//! pmtdisplay-core: Core types for PMT event display.
//!
//! This crate provides the detector geometry model, per-event hit storage,
//! display ranges and the navigation session shared by the renderer, the
//! archive readers and the front-ends.
//!

pub mod element;
pub mod error;
pub mod event;
pub mod range;
pub mod session;

pub use element::{DetectorElement, ElementIndex, Geometry, Position};
pub use error::{Error, Result};
pub use event::{Event, HitRecord, ParticleTrack, Quantity};
pub use range::{data_bounds, DisplayRange};
pub use session::{EventSource, Navigation, Session};
