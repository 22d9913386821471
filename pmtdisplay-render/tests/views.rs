use pmtdisplay_core::{ParticleTrack, Position};
use pmtdisplay_render::{
    DisplayRange, Event, Frame, Geometry, RenderConfig, Renderer, Species, ViewKind, ViewRanges,
};

fn renderer() -> Renderer {
    let positions = [
        [1000.0, 0.0, 0.0],
        [0.0, 0.0, 1000.0],
        [-1000.0, 0.0, 0.0],
        [0.0, 600.0, 0.0],
        [0.0, -600.0, 0.0],
    ];
    let geometry = Geometry::from_arrays(&[1, 2, 3, 4, 5], &positions).unwrap();
    Renderer::new(geometry, RenderConfig::default())
}

fn event() -> Event {
    let track = |pid, energy| ParticleTrack {
        pid,
        energy,
        start: Position::default(),
        stop: Position::new(0.0, 0.0, 500.0),
    };
    Event::new(
        vec![0, 1, 3, 4],
        vec![1.5, 4.0, 2.0, 0.5],
        vec![10.0, 12.0, 30.0, 55.0],
    )
    .unwrap()
    .with_tracks(vec![track(13, 500.0), track(11, 7.34), track(2212, 900.0)])
}

#[test]
fn test_charge_view_uses_charge_bounds() {
    let frame = renderer()
        .render(ViewKind::Charge, &event(), &ViewRanges::default())
        .unwrap();
    let Frame::Image(image) = frame else {
        panic!("expected an image");
    };
    assert_eq!(image.bounds(), (0.5, 4.0));
    assert_eq!(image.painted_hits(), 4);
}

#[test]
fn test_time_view_applies_time_range() {
    let ranges = ViewRanges {
        charge: DisplayRange::AUTO,
        time: DisplayRange::new(0.0, 20.0),
    };
    let Frame::Image(image) = renderer().render(ViewKind::Time, &event(), &ranges).unwrap() else {
        panic!("expected an image");
    };
    assert_eq!(image.painted_hits(), 2);
    assert_eq!(image.bounds(), (0.0, 20.0));
}

#[test]
fn test_charge_vs_time_counts_every_hit() {
    let Frame::Histogram(hs) = renderer()
        .render(ViewKind::ChargeVsTime, &event(), &ViewRanges::default())
        .unwrap()
    else {
        panic!("expected a histogram");
    };
    assert_eq!(hs.total(), 4);
    assert_eq!(hs.time_range(), (10.0, 55.0));
    assert_eq!(hs.charge_range(), (0.5, 4.0));
    // Latest, lowest-charge hit sits in the last time bin and the first charge bin.
    assert_eq!(hs.get(99, 0), Some(1));
}

#[test]
fn test_charge_vs_time_with_time_range_only() {
    let ranges = ViewRanges {
        charge: DisplayRange::AUTO,
        time: DisplayRange::new(11.0, 40.0),
    };
    let Frame::Histogram(hs) = renderer()
        .render(ViewKind::ChargeVsTime, &event(), &ranges)
        .unwrap()
    else {
        panic!("expected a histogram");
    };
    // Hits at t=10 and t=55 fall outside the time axis.
    assert_eq!(hs.total(), 2);
    assert_eq!(hs.time_range(), (11.0, 40.0));
    assert_eq!(hs.charge_range(), (0.5, 4.0));
}

#[test]
fn test_scatter_view_sizes_and_tracks() {
    let Frame::Scatter(scatter) = renderer()
        .render(ViewKind::Scatter3D, &event(), &ViewRanges::default())
        .unwrap()
    else {
        panic!("expected a scatter");
    };
    assert_eq!(scatter.points().len(), 4);
    assert_eq!(scatter.points()[1].marker_size, 12.0);
    assert_eq!(scatter.points()[2].position, Position::new(0.0, 600.0, 0.0));
    assert_eq!(scatter.time_bounds(), (10.0, 55.0));
    assert_eq!(scatter.tracks().len(), 1);
    assert_eq!(scatter.tracks()[0].species, Species::Electron);
    assert_eq!(scatter.tracks()[0].label, "7.3 MeV");
}

#[test]
fn test_unknown_element_is_an_error() {
    let bad = Event::new(vec![42], vec![1.0], vec![1.0]).unwrap();
    for view in ViewKind::ALL {
        let result = renderer().render(view, &bad, &ViewRanges::default());
        match view {
            ViewKind::ChargeVsTime => assert!(result.is_ok()),
            _ => assert!(result.is_err(), "{view} accepted an unknown element"),
        }
    }
}
