use approx::assert_relative_eq;
use pmtdisplay_render::flat_map::{BARREL_Y_OFFSET, BOTTOM_CAP_Y_OFFSET, TOP_CAP_Y_OFFSET, X_OFFSET};
use pmtdisplay_render::{
    project, render_histogram, render_image, DisplayRange, FlatMap, Geometry, Region,
    RenderConfig,
};
use std::f64::consts::PI;

const RADIUS: f64 = 1000.0;

/// Small cylinder: 36 barrel tubes on three rings plus one tube on each cap.
fn cylinder() -> Geometry {
    let mut positions = Vec::new();
    for ring in [-300.0, 0.0, 300.0] {
        for step in 0..36 {
            let theta = f64::from(step) * 2.0 * PI / 36.0;
            positions.push([RADIUS * theta.cos(), ring, RADIUS * theta.sin()]);
        }
    }
    positions.push([120.0, 600.0, -80.0]);
    positions.push([-40.0, -600.0, 250.0]);
    let numbers: Vec<i64> = (1..=i64::try_from(positions.len()).unwrap()).collect();
    Geometry::from_arrays(&numbers, &positions).unwrap()
}

#[test]
fn test_cap_projection_before_rounding() {
    let geo = cylinder();
    let radius = geo.barrel_radius();
    for element in geo.elements() {
        let p = element.position;
        let (x, y, region) = project(&p, radius);
        match region {
            Region::TopCap => {
                assert_relative_eq!(x, p.x + X_OFFSET);
                assert_relative_eq!(y, TOP_CAP_Y_OFFSET + p.z);
            }
            Region::BottomCap => {
                assert_relative_eq!(x, p.x + X_OFFSET);
                assert_relative_eq!(y, BOTTOM_CAP_Y_OFFSET + p.z);
            }
            Region::Barrel => assert_relative_eq!(y, p.y + BARREL_Y_OFFSET),
        }
    }
}

#[test]
fn test_barrel_x_increases_with_angle() {
    let mut last = f64::NEG_INFINITY;
    for step in -17..=17 {
        let theta = f64::from(step) * PI / 18.0;
        let p = pmtdisplay_core::Position::new(RADIUS * theta.cos(), 0.0, RADIUS * theta.sin());
        let (x, _, region) = project(&p, RADIUS);
        assert_eq!(region, Region::Barrel);
        assert!(x > last, "x not increasing at step {step}");
        last = x;
    }
}

#[test]
fn test_every_element_is_mapped() {
    let geo = cylinder();
    assert_relative_eq!(geo.barrel_radius(), RADIUS, epsilon = 1e-9);
    let map = FlatMap::from_geometry(&geo);
    assert_eq!(map.len(), geo.len());
    for element in geo.elements() {
        assert!(map.get(element.index).is_ok());
    }
}

#[test]
fn test_last_hit_on_a_pixel_wins() {
    let geo = cylinder();
    let map = FlatMap::from_geometry(&geo);
    let config = RenderConfig::default();
    let image = render_image(&map, &[5, 5], &[10.0, 20.0], DisplayRange::AUTO, &config).unwrap();
    let coord = map.get(pmtdisplay_core::ElementIndex(5)).unwrap();
    let row = usize::try_from(coord.y).unwrap();
    let col = usize::try_from(coord.x).unwrap();
    assert_eq!(image.get(row, col), Some(20.0));
    assert_eq!(image.bounds(), (10.0, 20.0));
    assert_eq!(image.painted_hits(), 2);
}

#[test]
fn test_zero_width_range_is_auto() {
    let geo = cylinder();
    let map = FlatMap::from_geometry(&geo);
    let config = RenderConfig::default();
    let image = render_image(
        &map,
        &[0, 1, 2],
        &[1.0, 3.0, 9.0],
        DisplayRange::new(3.0, 3.0),
        &config,
    )
    .unwrap();
    assert_eq!(image.painted_hits(), 3);
    assert_eq!(image.bounds(), (1.0, 9.0));
}

#[test]
fn test_explicit_range_drops_hits() {
    let geo = cylinder();
    let map = FlatMap::from_geometry(&geo);
    let image = render_image(
        &map,
        &[0, 1, 2],
        &[1.0, 3.0, 9.0],
        DisplayRange::new(2.0, 5.0),
        &RenderConfig::default(),
    )
    .unwrap();
    assert_eq!(image.painted_hits(), 1);
    assert_eq!(image.bounds(), (2.0, 5.0));
}

#[test]
fn test_empty_event_histogram_is_zero_filled() {
    let hs = render_histogram(
        &[],
        &[],
        DisplayRange::AUTO,
        DisplayRange::AUTO,
        &RenderConfig::default(),
    )
    .unwrap();
    assert_eq!(hs.n_time_bins(), 100);
    assert_eq!(hs.n_charge_bins(), 100);
    assert_eq!(hs.counts().len(), 100 * 100);
    assert_eq!(hs.total(), 0);
    assert_eq!(hs.time_range(), (-0.5, 0.5));
}

#[test]
fn test_histogram_time_range_alone_drops_hits() {
    let times = [1.0, 5.0, 9.0, 20.0, -3.0];
    let charges = [2.0, 4.0, 6.0, 8.0, 10.0];
    let hs = render_histogram(
        &times,
        &charges,
        DisplayRange::new(0.0, 10.0),
        DisplayRange::AUTO,
        &RenderConfig::default(),
    )
    .unwrap();
    assert_eq!(hs.time_range(), (0.0, 10.0));
    // Charge axis stays on the bounds of every hit, dropped ones included.
    assert_eq!(hs.charge_range(), (2.0, 10.0));
    assert_eq!(hs.total(), 3);
    assert_eq!(hs.get(50, 25), Some(1));
}

#[test]
fn test_empty_event_image_is_blank() {
    let map = FlatMap::from_geometry(&cylinder());
    let image = render_image(&map, &[], &[], DisplayRange::AUTO, &RenderConfig::default()).unwrap();
    assert_eq!(image.rows(), 2506);
    assert_eq!(image.cols(), 2317);
    assert!(image.data().iter().all(|&v| v == 0.0));
    assert_eq!(image.bounds(), (0.0, 0.0));
}
