extern crate nyx_pointing as nyx;

use approx::assert_abs_diff_eq;
use nyx::attitude::{AttitudeError, GroundPointing, LofOffset};
use nyx::cosmic::{
    BodyEllipsoid, ConstantRotation, IdentityTransformer, LocalFrame, Orbit, EARTH_GM_KM3_S2,
    EARTH_J2000, IAU_EARTH_FRAME,
};
use nyx::linalg::Vector3;
use nyx::time::Unit;
use rstest::*;
use std::sync::Arc;

use crate::{circular_equatorial, eme2k, reference_epoch};

const EARTH_RADIUS_KM: f64 = 6378.0;
const EARTH_ROTATION_RAD_S: f64 = 7.292115e-5;

fn earth_rotation() -> ConstantRotation {
    ConstantRotation {
        parent: EARTH_J2000,
        body: IAU_EARTH_FRAME,
        reference_epoch: reference_epoch(),
        angle_rad: 0.0,
        rate_rad_s: EARTH_ROTATION_RAD_S,
    }
}

/// Nadir pointing over a spherical Earth, in the rotating Earth frame.
fn nadir_law(radius_km: f64, sat_pointing: Vector3<f64>) -> GroundPointing<LofOffset> {
    let _ = pretty_env_logger::try_init();
    GroundPointing::new(
        LofOffset::new(LocalFrame::VVLH),
        Arc::new(BodyEllipsoid::sphere(IAU_EARTH_FRAME, radius_km)),
        Arc::new(earth_rotation()),
        sat_pointing,
    )
    .unwrap()
}

/// Polar position, moving along the X axis
fn over_the_pole() -> Orbit {
    let v = (EARTH_GM_KM3_S2 / 7000.0).sqrt();
    Orbit::cartesian(0.0, 0.0, 7000.0, v, 0.0, 0.0, reference_epoch(), eme2k())
}

#[test]
fn nadir_over_the_pole() {
    let orbit = over_the_pole();
    let gp = nadir_law(EARTH_RADIUS_KM, Vector3::z())
        .observed_ground_point(&orbit)
        .unwrap();

    assert_eq!(gp.frame, eme2k());
    assert_eq!(gp.epoch, orbit.epoch);
    assert_abs_diff_eq!(
        gp.position_km,
        Vector3::new(0.0, 0.0, EARTH_RADIUS_KM),
        epsilon = 1e-9
    );
    let expected_speed = EARTH_RADIUS_KM * orbit.vmag_km_s() / 7000.0;
    assert_abs_diff_eq!(
        gp.velocity_km_s,
        Vector3::new(expected_speed, 0.0, 0.0),
        epsilon = 1e-8
    );
}

#[rstest]
#[case::off_nadir_small_body(100.0, 1000.0)]
#[case::behind_the_vehicle(170.0, EARTH_RADIUS_KM)]
fn pointing_misses(#[case] off_nadir_deg: f64, #[case] radius_km: f64) {
    let angle = off_nadir_deg.to_radians();
    // Tilt the nadir axis towards the velocity direction (VVLH X axis)
    let sat_pointing = Vector3::new(angle.sin(), 0.0, angle.cos());
    let orbit = over_the_pole();
    let law = nadir_law(radius_km, sat_pointing);

    assert_eq!(
        law.intersection_point(&orbit),
        Err(AttitudeError::PointingMiss { epoch: orbit.epoch })
    );
    assert_eq!(
        law.observed_ground_point(&orbit),
        Err(AttitudeError::PointingMiss { epoch: orbit.epoch })
    );
}

#[test]
fn slightly_off_nadir_still_hits() {
    let angle = 20.0_f64.to_radians();
    let law = nadir_law(EARTH_RADIUS_KM, Vector3::new(angle.sin(), 0.0, angle.cos()));
    let orbit = over_the_pole();
    let point = law.intersection_point(&orbit).unwrap();
    assert_abs_diff_eq!(point.norm(), EARTH_RADIUS_KM, epsilon = 1e-9);
    // Looking ahead of the vehicle
    assert!(point.x > 0.0);
    assert!(point.z < 7000.0);
}

/// Error of the ground point velocity, with the provided finite difference step, for an inertial sphere.
fn fd_velocity_error(step_s: f64) -> f64 {
    let orbit = circular_equatorial(reference_epoch());
    let law = GroundPointing::new(
        LofOffset::new(LocalFrame::VVLH),
        Arc::new(BodyEllipsoid::sphere(EARTH_J2000, EARTH_RADIUS_KM)),
        Arc::new(IdentityTransformer),
        Vector3::z(),
    )
    .unwrap()
    .with_fd_step(step_s * Unit::Second)
    .unwrap();

    let gp = law.observed_ground_point(&orbit).unwrap();
    let expected = orbit.velocity_km_s * EARTH_RADIUS_KM / orbit.rmag_km();
    (gp.velocity_km_s - expected).norm()
}

#[test]
fn finite_difference_is_fourth_order() {
    let coarse = fd_velocity_error(100.0);
    let fine = fd_velocity_error(50.0);
    let ratio = coarse / fine;
    // Halving the step divides the error by about 2^4
    assert!(ratio > 14.0 && ratio < 18.0, "ratio = {ratio}");

    assert!(fd_velocity_error(0.05) < 1e-8);
}

#[test]
fn target_in_rotating_frame() {
    let orbit = circular_equatorial(reference_epoch());
    let law = nadir_law(EARTH_RADIUS_KM, Vector3::z());

    let gp = law.target_in_body_frame(&orbit).unwrap();
    assert_eq!(gp.frame, IAU_EARTH_FRAME);
    assert_abs_diff_eq!(
        gp.position_km,
        Vector3::new(EARTH_RADIUS_KM, 0.0, 0.0),
        epsilon = 1e-9
    );
    let ground_speed =
        EARTH_RADIUS_KM * (orbit.vmag_km_s() / orbit.rmag_km() - EARTH_ROTATION_RAD_S);
    assert_abs_diff_eq!(
        gp.velocity_km_s,
        Vector3::new(0.0, ground_speed, 0.0),
        epsilon = 1e-8
    );
}
