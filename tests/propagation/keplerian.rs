extern crate nyx_pointing as nyx;

use nyx::attitude::{AttitudeError, AttitudeProvider, LofOffset};
use nyx::cosmic::{assert_orbit_eq_or_abs, EquinoctialElements, LocalFrame, Orbit};
use nyx::md::prelude::*;
use nyx::propagators::PropagationError;
use nyx::utils::normalize_angle;
use rstest::*;
use std::sync::Arc;

use crate::leo_spacecraft;

/// Always fails, as a ground pointing law would when the axis misses the body.
#[derive(Debug)]
struct AlwaysMisses;

impl AttitudeProvider for AlwaysMisses {
    fn attitude(&self, orbit: &Orbit) -> Result<nyx::attitude::Attitude, AttitudeError> {
        Err(AttitudeError::PointingMiss { epoch: orbit.epoch })
    }
}

#[fixture]
fn leo() -> Spacecraft {
    let _ = pretty_env_logger::try_init();
    leo_spacecraft()
}

#[rstest]
fn identity_at_initial_epoch(leo: Spacecraft) {
    let prop = KeplerianPropagator::new(leo).unwrap();
    let state = prop.at(leo.orbit.epoch).unwrap();
    assert_eq!(state.orbit.radius_km, leo.orbit.radius_km);
    assert_eq!(state.orbit.velocity_km_s, leo.orbit.velocity_km_s);
    assert_eq!(state.mass_kg, leo.mass_kg);

    let instance = prop.instance().unwrap();
    assert_eq!(instance.state, leo);
}

#[rstest]
#[case(1 * Unit::Minute)]
#[case(97 * Unit::Minute)]
#[case(1 * Unit::Day)]
fn forward_backward_round_trip(leo: Spacecraft, #[case] duration: Duration) {
    let prop = KeplerianPropagator::new(leo).unwrap();
    let initial = EquinoctialElements::from_orbit(&leo.orbit).unwrap();
    let mean_motion_rad_s = prop.mean_motion_rad_s();

    let mut instance = prop.instance().unwrap();
    let forward = instance.for_duration(duration).unwrap();
    assert_eq!(forward.state.epoch(), leo.epoch() + duration);
    assert!(forward.stop.is_none());

    let propagated = EquinoctialElements::from_orbit(&forward.state.orbit).unwrap();
    let expected_dl = mean_motion_rad_s * duration.to_seconds();
    assert!(
        normalize_angle(
            propagated.mean_longitude_rad - initial.mean_longitude_rad - expected_dl,
            0.0
        )
        .abs()
            < 1e-9
    );
    // All other elements are constant
    assert!((propagated.sma_km - initial.sma_km).abs() < 1e-6);
    assert!((propagated.ex - initial.ex).abs() < 1e-10);
    assert!((propagated.hy - initial.hy).abs() < 1e-10);

    let backward = instance.for_duration(-duration).unwrap();
    assert_eq!(backward.state.epoch(), leo.epoch());
    assert_orbit_eq_or_abs(&backward.state.orbit, &leo.orbit, 1e-6, "round trip");
}

#[rstest]
fn parallel_queries_match_sequential(leo: Spacecraft) {
    let prop = KeplerianPropagator::new(leo)
        .unwrap()
        .with_attitude_provider(Arc::new(LofOffset::new(LocalFrame::VVLH)));
    let epochs: Vec<Epoch> = (0..50_i64)
        .map(|i| leo.epoch() + (i * 7 - 100) * Unit::Minute)
        .collect();
    let states = prop.states_at(&epochs).unwrap();
    assert_eq!(states.len(), epochs.len());
    for (epoch, state) in epochs.iter().zip(states.iter()) {
        let sequential = prop.at(*epoch).unwrap();
        assert_eq!(state.epoch(), *epoch);
        assert_eq!(*state, sequential);
        assert_eq!(state.attitude, sequential.attitude);
    }
}

#[rstest]
fn attitude_failure_policy(leo: Spacecraft) {
    let strict = KeplerianPropagator::new(leo)
        .unwrap()
        .with_attitude_provider(Arc::new(AlwaysMisses));
    assert_eq!(strict.attitude_policy(), AttitudePolicy::Required);
    let later = leo.epoch() + 10 * Unit::Minute;
    assert!(matches!(
        strict.at(later),
        Err(PropagationError::PropAttitude {
            source: AttitudeError::PointingMiss { .. }
        })
    ));

    let lenient = strict.with_attitude_policy(AttitudePolicy::OmitOnFailure);
    let state = lenient.at(later).unwrap();
    assert!(state.attitude.is_none());
    assert_eq!(state.epoch(), later);
}

#[rstest]
fn reconfiguration_returns_new_propagator(leo: Spacecraft) {
    let identity = KeplerianPropagator::new(leo).unwrap();
    let vvlh = identity
        .clone()
        .with_attitude_provider(Arc::new(LofOffset::new(LocalFrame::VVLH)));
    let epoch = leo.epoch() + 5 * Unit::Minute;

    let att_identity = identity.at(epoch).unwrap().attitude.unwrap();
    let att_vvlh = vvlh.at(epoch).unwrap().attitude.unwrap();
    assert!(att_identity.rotation.angle() < f64::EPSILON);
    assert!(att_vvlh.rotation.angle() > 0.1);

    // Resetting keeps the attitude configuration
    let reset = vvlh.reset(vvlh.at(epoch).unwrap()).unwrap();
    assert_eq!(reset.initial_state().epoch(), epoch);
    assert_eq!(
        reset.at(epoch).unwrap().attitude.unwrap().rotation,
        att_vvlh.rotation
    );
}
