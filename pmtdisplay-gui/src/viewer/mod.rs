//! Visualization helpers: textures for 2D frames and the 3D camera.

mod camera;
mod texture;

pub use camera::{Camera, Projector, SceneBounds};
pub use texture::{downsample_rgba, frame_image, frame_rgba};
