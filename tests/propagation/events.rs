extern crate nyx_pointing as nyx;

use nyx::md::prelude::*;
use nyx::propagators::PropagationError;
use nyx::EventError;
use rstest::*;
use std::fmt;

use crate::leo_spacecraft;

/// Stops when the orbit radius crosses the provided value.
struct RadiusCrossing {
    radius_km: f64,
}

impl fmt::Display for RadiusCrossing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "radius crossing {} km", self.radius_km)
    }
}

impl EventEvaluator for RadiusCrossing {
    fn eval(&self, state: &Spacecraft) -> Result<f64, EventError> {
        Ok(state.orbit.rmag_km() - self.radius_km)
    }

    fn max_check_interval(&self) -> Duration {
        5 * Unit::Minute
    }

    fn max_iterations(&self) -> usize {
        50
    }

    fn threshold(&self) -> Duration {
        1 * Unit::Millisecond
    }
}

/// Custom event whose settings are never checked on construction.
struct NegativeThreshold;

impl fmt::Display for NegativeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "event with a negative threshold")
    }
}

impl EventEvaluator for NegativeThreshold {
    fn eval(&self, _state: &Spacecraft) -> Result<f64, EventError> {
        Ok(1.0)
    }

    fn max_check_interval(&self) -> Duration {
        1 * Unit::Minute
    }

    fn max_iterations(&self) -> usize {
        10
    }

    fn threshold(&self) -> Duration {
        -1 * Unit::Millisecond
    }
}

#[fixture]
fn leo() -> Spacecraft {
    let _ = pretty_env_logger::try_init();
    leo_spacecraft()
}

#[rstest]
#[case(35 * Unit::Minute, 2 * Unit::Hour)]
#[case(-35 * Unit::Minute, -2 * Unit::Hour)]
fn stop_at_date(leo: Spacecraft, #[case] offset: Duration, #[case] duration: Duration) {
    let target = leo.epoch() + offset;
    let mut instance = KeplerianPropagator::new(leo)
        .unwrap()
        .instance()
        .unwrap()
        .with_event(DateEvent::new(target))
        .unwrap();

    let outcome = instance.for_duration(duration).unwrap();
    let stop = outcome.stop.clone().unwrap();
    assert_eq!(stop.index, 0);
    assert_eq!(stop.action, EventAction::Stop);
    assert_eq!(stop.edge, EventEdge::Rising);
    assert_eq!(instance.history().len(), 1);
    assert_eq!(instance.state, outcome.state);

    let threshold = Convergence::default().threshold;
    assert!((outcome.state.epoch() - target).abs() <= threshold);
    // The stop state is on the far side of the crossing
    if duration.is_negative() {
        assert!(outcome.state.epoch() <= target);
    } else {
        assert!(outcome.state.epoch() >= target);
    }

    // Resuming never triggers the same crossing again
    let resumed = instance.for_duration(duration).unwrap();
    assert!(resumed.stop.is_none());
    assert_eq!(instance.history().len(), 1);
}

#[rstest]
fn simultaneous_events_in_registration_order(leo: Spacecraft) {
    let target = leo.epoch() + 20 * Unit::Minute;
    let earlier = leo.epoch() + 19 * Unit::Minute;
    let mut instance = KeplerianPropagator::new(leo)
        .unwrap()
        .instance()
        .unwrap()
        .with_event(DateEvent::new(target).with_action(EventAction::Continue))
        .unwrap()
        .with_event(DateEvent::new(target).with_action(EventAction::Continue))
        .unwrap()
        .with_event(DateEvent::new(earlier).with_action(EventAction::Continue))
        .unwrap();

    let outcome = instance.for_duration(1 * Unit::Hour).unwrap();
    assert!(outcome.stop.is_none());
    assert_eq!(outcome.state.epoch(), leo.epoch() + 1 * Unit::Hour);

    let order: Vec<usize> = instance.history().iter().map(|e| e.index).collect();
    assert_eq!(order, vec![2, 0, 1]);
    for details in instance.history() {
        assert_eq!(details.action, EventAction::Continue);
    }
}

#[rstest]
fn reset_event_triggers_once(leo: Spacecraft) {
    let target = leo.epoch() + 42 * Unit::Minute;
    let mut instance = KeplerianPropagator::new(leo)
        .unwrap()
        .instance()
        .unwrap()
        .with_event(DateEvent::new(target).with_action(EventAction::ResetState))
        .unwrap();

    let outcome = instance.for_duration(3 * Unit::Hour).unwrap();
    assert!(outcome.stop.is_none());
    assert_eq!(instance.history().len(), 1);
    // The model restarted from the state at the event
    let restart = instance.model().initial_state().epoch();
    assert!((restart - target).abs() <= 1 * Unit::Microsecond);

    // An identity reset does not change the trajectory
    let unperturbed = KeplerianPropagator::new(leo)
        .unwrap()
        .at(outcome.state.epoch())
        .unwrap();
    let (dr_km, dv_km_s, dm_kg) = outcome.state.rss(&unperturbed);
    assert!(dr_km < 1e-6);
    assert!(dv_km_s < 1e-9);
    assert_eq!(dm_kg, 0.0);
}

#[rstest]
fn apsides_over_one_period(leo: Spacecraft) {
    let period = leo.orbit.period().unwrap();
    let apsis = ApsisEvent::from_orbit(&leo.orbit)
        .unwrap()
        .with_action(EventAction::Continue);
    let mut instance = KeplerianPropagator::new(leo)
        .unwrap()
        .instance()
        .unwrap()
        .with_event(apsis)
        .unwrap();

    instance.for_duration(period).unwrap();
    let history = instance.history();
    assert_eq!(history.len(), 2);

    let sma = leo.orbit.sma_km().unwrap();
    let ecc = leo.orbit.ecc().unwrap();

    // Starting after periapsis, the apoapsis comes first
    assert_eq!(history[0].edge, EventEdge::Falling);
    assert!((history[0].state.orbit.rmag_km() - sma * (1.0 + ecc)).abs() < 1e-5);
    assert_eq!(history[1].edge, EventEdge::Rising);
    assert!((history[1].state.orbit.rmag_km() - sma * (1.0 - ecc)).abs() < 1e-5);
    assert!(history[0].state.epoch() < history[1].state.epoch());
}

#[rstest]
fn custom_event_stops_by_default(leo: Spacecraft) {
    let radius_km = 7000.0;
    let mut instance = KeplerianPropagator::new(leo)
        .unwrap()
        .instance()
        .unwrap()
        .with_event(RadiusCrossing { radius_km })
        .unwrap();

    let outcome = instance.for_duration(1 * Unit::Day).unwrap();
    let stop = outcome.stop.unwrap();
    assert_eq!(stop.action, EventAction::Stop);
    assert_eq!(stop.repr, "radius crossing 7000 km");
    // Within one millisecond of the crossing, at a radial velocity under 1 km/s
    assert!((outcome.state.orbit.rmag_km() - radius_km).abs() < 1e-3);
    assert!(outcome.state.orbit.rmag_km() >= radius_km);
}

#[rstest]
fn root_not_found_is_an_error(leo: Spacecraft) {
    let period = leo.orbit.period().unwrap();
    let convergence = Convergence::builder()
        .max_check_interval(period / 3)
        .max_iterations(1)
        .threshold(1 * Unit::Nanosecond)
        .build();
    let mut instance = KeplerianPropagator::new(leo)
        .unwrap()
        .instance()
        .unwrap()
        .with_event(ApsisEvent::default().with_convergence(convergence).unwrap())
        .unwrap();

    match instance.for_duration(period) {
        Err(PropagationError::RootNotFound {
            event, iterations, ..
        }) => {
            assert_eq!(iterations, 1);
            assert_eq!(event, "apsis trigger");
        }
        other => panic!("expected a root finding failure, got {other:?}"),
    }
    assert!(instance.history().is_empty());
}

#[rstest]
fn invalid_convergence_is_rejected(leo: Spacecraft) {
    let negative_threshold = Convergence::builder()
        .threshold(-1 * Unit::Millisecond)
        .build();
    let target = leo.epoch() + 10 * Unit::Minute;
    assert!(DateEvent::new(target)
        .with_convergence(negative_threshold)
        .is_err());

    let instance = KeplerianPropagator::new(leo).unwrap().instance().unwrap();
    assert!(matches!(
        instance.with_event(NegativeThreshold),
        Err(PropagationError::PropConfigError { .. })
    ));
}
