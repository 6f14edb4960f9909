use super::waypoints::{ArrivalThresholds, NavigationError, WaypointSequencer};
use crate::flight_control::common::{GeoPoint, Navigator};
use itertools::Itertools;

const THRESHOLDS: ArrivalThresholds =
    ArrivalThresholds { reached: 20.0, in_range: 100.0, min_in_range_samples: 2 };

fn diagonal(value: f64) -> GeoPoint { GeoPoint::surface(value, value) }

fn sequencer(thresholds: ArrivalThresholds) -> WaypointSequencer {
    WaypointSequencer::new(
        vec![diagonal(1.0), diagonal(2.0)],
        vec![diagonal(3.0), diagonal(4.0)],
        GeoPoint::surface(40.0, -105.0),
        thresholds,
        Navigator::default(),
    )
}

#[test]
fn test_lead_in_consumed_once() {
    let mut waypoints = sequencer(THRESHOLDS);
    let indices = (0..10)
        .map(|_| {
            let index = waypoints.index();
            waypoints.advance();
            index
        })
        .collect_vec();
    assert_eq!(indices, [0, 1, 2, 3, 2, 3, 2, 3, 2, 3]);
}

#[test]
fn test_current_follows_index() {
    let mut waypoints = sequencer(THRESHOLDS);
    assert_eq!(waypoints.current(), diagonal(1.0));
    waypoints.advance();
    assert_eq!(waypoints.current(), diagonal(2.0));
    waypoints.advance();
    for _ in 0..5 {
        assert_eq!(waypoints.current(), diagonal(3.0));
        waypoints.advance();
        assert_eq!(waypoints.current(), diagonal(4.0));
        waypoints.advance();
    }
}

#[test]
fn test_no_lead_in_cycles_from_start() {
    let mut waypoints = WaypointSequencer::new(
        Vec::new(),
        vec![diagonal(3.0), diagonal(4.0), diagonal(5.0)],
        diagonal(0.0),
        THRESHOLDS,
        Navigator::default(),
    );
    let seen = (0..7)
        .map(|_| {
            let lat = waypoints.current().latitude();
            waypoints.advance();
            lat
        })
        .collect_vec();
    assert_eq!(seen, [3.0, 4.0, 5.0, 3.0, 4.0, 5.0, 3.0]);
}

#[test]
fn test_empty_route_falls_back() {
    let fallback = GeoPoint::surface(40.0, -105.0);
    let mut waypoints =
        WaypointSequencer::new(vec![diagonal(1.0)], Vec::new(), fallback, THRESHOLDS, Navigator::default());
    assert_eq!(waypoints.try_current(), Ok(diagonal(1.0)));
    waypoints.advance();
    assert_eq!(waypoints.try_current(), Err(NavigationError::WaypointIndexInvalid));
    assert_eq!(waypoints.current(), fallback);
}

#[test]
fn test_reached_and_closest_approach() {
    let mut waypoints = sequencer(THRESHOLDS);
    assert!(!waypoints.arrived(&GeoPoint::surface(0.0, 0.0)));
    assert!(!waypoints.arrived(&GeoPoint::surface(40.0, -105.0)));
    assert!(!waypoints.is_in_range());

    // about 63 m out, then closing in
    assert!(!waypoints.arrived(&diagonal(0.9996)));
    assert!(waypoints.is_in_range());
    assert!(!waypoints.arrived(&diagonal(0.9997)));
    assert!(!waypoints.arrived(&diagonal(0.9998)));
    // receding after the closest approach
    assert!(waypoints.arrived(&diagonal(0.9996)));

    waypoints.advance();
    assert!(!waypoints.is_in_range());
    assert!((waypoints.previous_distance() - 1_000_000.0).abs() < f64::EPSILON);
    assert!(!waypoints.arrived(&diagonal(1.9996)));
    // about 16 m out is within the reached distance
    assert!(waypoints.arrived(&diagonal(1.9999)));
}

#[test]
fn test_single_in_range_sample_is_not_an_arrival() {
    let mut waypoints = sequencer(THRESHOLDS);
    assert!(!waypoints.arrived(&diagonal(0.9996)));
    // a single noisy fix inside the in-range distance, then moving away
    assert!(!waypoints.arrived(&diagonal(0.9995)));
    assert!(waypoints.arrived(&diagonal(0.9990)));

    let mut single = sequencer(ArrivalThresholds { min_in_range_samples: 1, ..THRESHOLDS });
    assert!(!single.arrived(&diagonal(0.9996)));
    assert!(single.arrived(&diagonal(0.9995)));
}

#[test]
fn test_far_away_never_arrives() {
    let mut waypoints = sequencer(THRESHOLDS);
    // moving away outside the in-range distance is not a closest approach
    for step in 0..20 {
        assert!(!waypoints.arrived(&diagonal(0.99 - f64::from(step) * 0.001)));
    }
    assert!(!waypoints.is_in_range());
}

#[test]
fn test_update_advances_on_arrival() {
    let mut waypoints = sequencer(THRESHOLDS);
    assert!(!waypoints.update(&diagonal(0.5)));
    assert_eq!(waypoints.index(), 0);
    assert!(waypoints.update(&diagonal(1.0)));
    assert_eq!(waypoints.index(), 1);
    assert_eq!(waypoints.current(), diagonal(2.0));
}
