//! Orbit camera for the 3D hit view.
//!
//! The detector axis (y) points up on screen at zero pitch. Dragging
//! horizontally spins the scene around y, vertically tilts it around the
//! screen x axis. Projection is orthographic.

use nalgebra::{Rotation3, Vector3};
use pmtdisplay_core::{Geometry, Position};
use std::f64::consts::FRAC_PI_2;

/// Radians per dragged pixel.
const DRAG_SENSITIVITY: f64 = 0.01;

/// Orientation and zoom of the 3D view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Rotation around the detector axis.
    pub yaw: f64,
    /// Tilt towards the viewer, limited to +-90 degrees.
    pub pitch: f64,
    /// Magnification relative to fitting the detector in the viewport.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: -0.6,
            pitch: 0.35,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// World-to-view rotation.
    #[must_use]
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw)
    }

    /// Applies a pointer drag in screen pixels.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.yaw += dx * DRAG_SENSITIVITY;
        self.pitch = (self.pitch + dy * DRAG_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Multiplies the zoom, within `[0.1, 20]`.
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(0.1, 20.0);
    }
}

/// Centre and radius of the scene, taken from the detector so the view
/// stays put between events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub center: Vector3<f64>,
    pub radius: f64,
}

impl SceneBounds {
    /// Bounding sphere of all detector elements.
    #[must_use]
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let mut lo = Vector3::repeat(f64::INFINITY);
        let mut hi = Vector3::repeat(f64::NEG_INFINITY);
        for element in geometry.elements() {
            let p = to_vector(&element.position);
            lo = lo.inf(&p);
            hi = hi.sup(&p);
        }
        if geometry.is_empty() {
            return Self {
                center: Vector3::zeros(),
                radius: 1.0,
            };
        }
        let center = (lo + hi) / 2.0;
        let radius = ((hi - lo).norm() / 2.0).max(1.0);
        Self { center, radius }
    }
}

fn to_vector(p: &Position) -> Vector3<f64> {
    Vector3::new(p.x, p.y, p.z)
}

/// A point projected to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Screen x, growing right.
    pub x: f64,
    /// Screen y, growing down.
    pub y: f64,
    /// Distance along the view direction; larger is farther.
    pub depth: f64,
}

/// Maps detector positions to screen pixels for one frame.
#[derive(Debug, Clone)]
pub struct Projector {
    rotation: Rotation3<f64>,
    center: Vector3<f64>,
    scale: f64,
    origin: (f64, f64),
}

impl Projector {
    /// Fits the scene into a viewport of `size` pixels centred at `origin`.
    #[must_use]
    pub fn new(camera: &Camera, bounds: &SceneBounds, origin: (f64, f64), size: (f64, f64)) -> Self {
        let fit = size.0.min(size.1) / 2.0 / bounds.radius;
        Self {
            rotation: camera.rotation(),
            center: bounds.center,
            scale: fit * camera.zoom,
            origin,
        }
    }

    /// Projects one position.
    #[must_use]
    pub fn project(&self, position: &Position) -> Projected {
        let view = self.rotation * (to_vector(position) - self.center);
        Projected {
            x: self.origin.0 + view.x * self.scale,
            y: self.origin.1 - view.y * self.scale,
            depth: -view.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_camera() -> Camera {
        Camera {
            yaw: 0.0,
            pitch: 0.0,
            zoom: 1.0,
        }
    }

    fn bounds() -> SceneBounds {
        SceneBounds {
            center: Vector3::zeros(),
            radius: 100.0,
        }
    }

    #[test]
    fn test_front_view_projection() {
        let projector = Projector::new(&flat_camera(), &bounds(), (200.0, 100.0), (400.0, 200.0));
        // One unit of radius fills half the shorter viewport side.
        let right = projector.project(&Position::new(100.0, 0.0, 0.0));
        assert_relative_eq!(right.x, 300.0);
        assert_relative_eq!(right.y, 100.0);
        let up = projector.project(&Position::new(0.0, 50.0, 0.0));
        assert_relative_eq!(up.y, 50.0);
    }

    #[test]
    fn test_depth_orders_near_and_far() {
        let projector = Projector::new(&flat_camera(), &bounds(), (0.0, 0.0), (200.0, 200.0));
        let near = projector.project(&Position::new(0.0, 0.0, 50.0));
        let far = projector.project(&Position::new(0.0, 0.0, -50.0));
        assert!(near.depth < far.depth);
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let camera = Camera {
            yaw: FRAC_PI_2,
            ..flat_camera()
        };
        let projector = Projector::new(&camera, &bounds(), (0.0, 0.0), (200.0, 200.0));
        // +z swings onto screen x after a quarter turn around y.
        let p = projector.project(&Position::new(0.0, 0.0, 100.0));
        assert_relative_eq!(p.x, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_drag_limits_pitch() {
        let mut camera = Camera::default();
        camera.drag(0.0, 10_000.0);
        assert_relative_eq!(camera.pitch, FRAC_PI_2);
        camera.zoom_by(1e6);
        assert_relative_eq!(camera.zoom, 20.0);
    }

    #[test]
    fn test_scene_bounds() {
        let geo = Geometry::from_arrays(&[1, 2], &[[-10.0, 0.0, 0.0], [10.0, 0.0, 0.0]]).unwrap();
        let scene = SceneBounds::from_geometry(&geo);
        assert_relative_eq!(scene.radius, 10.0);
        assert_relative_eq!(scene.center.x, 0.0);
    }
}
