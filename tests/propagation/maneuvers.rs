extern crate nyx_pointing as nyx;

use nyx::attitude::LofOffset;
use nyx::cosmic::{LocalFrame, STD_GRAVITY};
use nyx::dynamics::guidance::ImpulseManeuverRepr;
use nyx::linalg::Vector3;
use nyx::md::prelude::*;
use rstest::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{circular_equatorial, leo_spacecraft, reference_epoch};

#[fixture]
fn circular() -> Spacecraft {
    let _ = pretty_env_logger::try_init();
    Spacecraft::new(circular_equatorial(reference_epoch()), 1000.0)
}

fn vnc_propagator(sc: Spacecraft) -> KeplerianPropagator {
    KeplerianPropagator::new(sc)
        .unwrap()
        .with_attitude_provider(Arc::new(LofOffset::new(LocalFrame::VNC)))
}

#[rstest]
fn half_period_maneuver(circular: Spacecraft) {
    let period = circular.orbit.period().unwrap();
    let trigger_epoch = circular.epoch() + period * 0.5;
    let dv_km_s = Vector3::new(0.1, 0.0, 0.0);
    let mnvr = ImpulseManeuver::new(DateEvent::new(trigger_epoch), dv_km_s, 300.0).unwrap();

    let unperturbed = vnc_propagator(circular);
    let mut instance = unperturbed
        .clone()
        .instance()
        .unwrap()
        .with_event(mnvr)
        .unwrap();
    let outcome = instance.for_duration(period).unwrap();

    // A maneuver never stops the propagation
    assert!(outcome.stop.is_none());
    assert_eq!(outcome.state.epoch(), circular.epoch() + period);
    assert_eq!(instance.history().len(), 1);
    let details = &instance.history()[0];
    assert_eq!(details.action, EventAction::ResetState);
    assert!((details.state.epoch() - trigger_epoch).abs() <= 1 * Unit::Microsecond);

    let expected_mass = 1000.0 * (-100.0 / (STD_GRAVITY * 300.0)).exp();
    assert!((outcome.state.mass_kg - expected_mass).abs() < 1e-9);

    // At the maneuver, only the velocity changed, by the delta-v rotated along the velocity (VNC X axis)
    let reset = instance.model().initial_state();
    let nominal = unperturbed.at(reset.epoch()).unwrap();
    let rotated_dv = dv_km_s.x * nominal.orbit.velocity_km_s / nominal.orbit.vmag_km_s();
    assert!((reset.orbit.radius_km - nominal.orbit.radius_km).norm() < 1e-9);
    assert!((reset.orbit.velocity_km_s - nominal.orbit.velocity_km_s - rotated_dv).norm() < 1e-12);
    assert!((reset.mass_kg - expected_mass).abs() < 1e-9);

    // The orbit is raised: the maneuver point is now the periapsis
    assert!(outcome.state.orbit.sma_km().unwrap() > circular.orbit.sma_km().unwrap());
    assert!(
        (outcome.state.orbit.rmag_km() - circular.orbit.rmag_km()).abs() > 1.0,
        "after half a period the vehicle is near its new apoapsis"
    );
}

#[rstest]
fn zero_delta_v_changes_nothing(circular: Spacecraft) {
    let trigger_epoch = circular.epoch() + 30 * Unit::Minute;
    let mnvr =
        ImpulseManeuver::new(DateEvent::new(trigger_epoch), Vector3::zeros(), 300.0).unwrap();
    let prop = vnc_propagator(circular);
    let mut instance = prop.clone().instance().unwrap().with_event(mnvr).unwrap();
    let outcome = instance.for_duration(2 * Unit::Hour).unwrap();

    assert_eq!(instance.history().len(), 1);
    assert_eq!(outcome.state.mass_kg, circular.mass_kg);
    let nominal = prop.at(outcome.state.epoch()).unwrap();
    let (dr_km, dv_km_s, _) = outcome.state.rss(&nominal);
    assert!(dr_km < 1e-6);
    assert!(dv_km_s < 1e-9);
}

#[rstest]
fn mass_decreases_with_delta_v(circular: Spacecraft) {
    let trigger_epoch = circular.epoch() + 10 * Unit::Minute;
    let mut prev_mass = circular.mass_kg;
    for dv in [1e-4, 1e-2, 0.1, 1.0, 10.0, 100.0] {
        let mnvr = ImpulseManeuver::new(
            DateEvent::new(trigger_epoch),
            Vector3::new(0.0, dv, 0.0),
            250.0,
        )
        .unwrap();
        let mut instance = vnc_propagator(circular)
            .instance()
            .unwrap()
            .with_event(mnvr)
            .unwrap();
        let outcome = instance.until_epoch(trigger_epoch + 1 * Unit::Second);
        match outcome {
            Ok(outcome) => {
                let mass = outcome.state.mass_kg;
                assert!(mass > 0.0);
                assert!(mass < prev_mass, "{dv} km/s: {mass} kg >= {prev_mass} kg");
                prev_mass = mass;
            }
            // Large maneuvers are out of plane and may escape, which the Keplerian propagator refuses
            Err(e) => assert!(dv >= 10.0, "{dv} km/s failed: {e}"),
        }
    }
}

#[rstest]
fn maneuver_without_attitude_fails(circular: Spacecraft) {
    let mnvr = ImpulseManeuver::new(
        DateEvent::new(circular.epoch() + 10 * Unit::Minute),
        Vector3::new(0.1, 0.0, 0.0),
        300.0,
    )
    .unwrap();
    let mut instance = KeplerianPropagator::new(circular)
        .unwrap()
        .with_attitude_provider(Arc::new(NoAttitude))
        .with_attitude_policy(AttitudePolicy::OmitOnFailure)
        .instance()
        .unwrap()
        .with_event(mnvr)
        .unwrap();
    assert!(instance.for_duration(1 * Unit::Hour).is_err());
}

/// Never provides an attitude.
#[derive(Debug)]
pub struct NoAttitude;

impl AttitudeProvider for NoAttitude {
    fn attitude(
        &self,
        orbit: &Orbit,
    ) -> Result<nyx::attitude::Attitude, nyx::attitude::AttitudeError> {
        Err(nyx::attitude::AttitudeError::PointingMiss { epoch: orbit.epoch })
    }
}

#[test]
fn maneuvers_from_yaml() {
    let _ = pretty_env_logger::try_init();
    let path: PathBuf = [
        env!("CARGO_MANIFEST_DIR"),
        "data",
        "tests",
        "config",
        "impulse_maneuvers.yaml",
    ]
    .iter()
    .collect();

    let reprs = ImpulseManeuverRepr::load_many(path).unwrap();
    assert_eq!(reprs.len(), 2);

    let mut instance = vnc_propagator(leo_spacecraft()).instance().unwrap();
    for repr in reprs {
        let mnvr = ImpulseManeuver::<Trigger>::from_config(repr.clone()).unwrap();
        assert_eq!(mnvr.to_config().unwrap().trigger, repr.trigger);
        instance.add_event(mnvr).unwrap();
    }

    instance.for_duration(3 * Unit::Hour).unwrap();
    let history = instance.history();
    // The date maneuver first, then the apsis maneuver at each of the apsides
    assert!(history.len() >= 3, "{history:?}");
    assert!(history
        .iter()
        .all(|details| details.action == EventAction::ResetState));
    assert_eq!(history[0].index, 0);
}
