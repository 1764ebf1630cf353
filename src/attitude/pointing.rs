/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{
    Attitude, AttitudeError, AttitudeFrameSnafu, AttitudeModifier, AttitudeProvider,
    PointingMissSnafu,
};
use crate::cosmic::{BodyShape, Frame, FrameTransformer, Line, LinearShift, Orbit};
use crate::io::ConfigError;
use crate::linalg::{Unit, Vector3};
use crate::time::{Duration, Epoch, Unit as TimeUnit};
use snafu::prelude::*;
use std::fmt;
use std::sync::Arc;

/// A point on the surface of a body, with its instantaneous velocity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GroundPoint {
    pub epoch: Epoch,
    pub frame: Frame,
    pub position_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
}

impl fmt::Display for GroundPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] {}\tposition = [{:.6}, {:.6}, {:.6}] km\tvelocity = [{:.6}, {:.6}, {:.6}] km/s",
            self.frame,
            self.epoch,
            self.position_km.x,
            self.position_km.y,
            self.position_km.z,
            self.velocity_km_s.x,
            self.velocity_km_s.y,
            self.velocity_km_s.z
        )
    }
}

/// Ground pointing law: finds where a body fixed axis of the vehicle, oriented by the underlying attitude law,
/// intersects the shape of a celestial body, and how fast that intersection point moves.
///
/// The attitude itself is the one of the underlying law, this modifier only adds the ground point computations.
#[derive(Clone, Debug)]
pub struct GroundPointing<A: AttitudeProvider> {
    underlying: A,
    shape: Arc<dyn BodyShape>,
    frames: Arc<dyn FrameTransformer>,
    sat_pointing: Unit<Vector3<f64>>,
    fd_step: Duration,
}

impl<A: AttitudeProvider> GroundPointing<A> {
    /// Builds a new ground pointing law where `sat_pointing` is the pointing axis, in the vehicle body frame.
    pub fn new(
        underlying: A,
        shape: Arc<dyn BodyShape>,
        frames: Arc<dyn FrameTransformer>,
        sat_pointing: Vector3<f64>,
    ) -> Result<Self, ConfigError> {
        let sat_pointing = Unit::try_new(sat_pointing, f64::EPSILON).ok_or_else(|| {
            ConfigError::InvalidConfig {
                msg: "satellite pointing axis must be a non-zero vector".to_string(),
            }
        })?;
        Ok(Self {
            underlying,
            shape,
            frames,
            sat_pointing,
            fd_step: 0.05 * TimeUnit::Second,
        })
    }

    /// Returns a copy of this law with another finite difference step. The default step is 0.05 seconds.
    pub fn with_fd_step(self, fd_step: Duration) -> Result<Self, ConfigError> {
        ensure!(
            fd_step > Duration::ZERO,
            crate::io::InvalidConfigSnafu {
                msg: format!("finite difference step must be strictly positive, got {fd_step}")
            }
        );
        let mut me = self;
        me.fd_step = fd_step;
        Ok(me)
    }

    pub fn fd_step(&self) -> Duration {
        self.fd_step
    }

    pub fn sat_pointing(&self) -> Vector3<f64> {
        self.sat_pointing.into_inner()
    }

    /// Computes the intersection of the pointing axis with the body shape, expressed in the frame of the orbit.
    ///
    /// Fails with `PointingMiss` if the axis does not intersect the shape, or if the intersection is behind the vehicle.
    pub fn intersection_point(&self, orbit: &Orbit) -> Result<Vector3<f64>, AttitudeError> {
        let attitude = self.underlying.attitude(orbit)?;
        let body_frame = self.shape.body_frame();

        let to_body = self
            .frames
            .transform(orbit.frame, body_frame, orbit.epoch)
            .context(AttitudeFrameSnafu)?;
        let pointing = self.pointing_in(&attitude, body_frame)?;
        let position = to_body.transform_position(&orbit.radius_km);

        let line = Line::new(position, pointing);
        let intersection = self
            .shape
            .intersection(&line, &position, body_frame, orbit.epoch)
            .context(AttitudeFrameSnafu)?
            .context(PointingMissSnafu {
                epoch: orbit.epoch,
            })?;

        ensure!(
            line.abscissa(&intersection) >= 0.0,
            PointingMissSnafu {
                epoch: orbit.epoch
            }
        );

        Ok(to_body.inverse().transform_position(&intersection))
    }

    /// Computes the observed ground point in the frame of the orbit.
    ///
    /// The velocity is estimated with a fourth order centered finite difference of the intersection point, on
    /// orbits linearly shifted by -2h, -h, +h and +2h. If any of these evaluations misses the body, the whole call fails.
    pub fn observed_ground_point(&self, orbit: &Orbit) -> Result<GroundPoint, AttitudeError> {
        let h_s = self.fd_step.to_seconds();
        let shifted = |steps: f64| orbit.linear_shift_by(steps * h_s * TimeUnit::Second);

        let position_km = self.intersection_point(orbit)?;
        let p_m2h = self.intersection_point(&shifted(-2.0))?;
        let p_m1h = self.intersection_point(&shifted(-1.0))?;
        let p_p1h = self.intersection_point(&shifted(1.0))?;
        let p_p2h = self.intersection_point(&shifted(2.0))?;

        let s2 = 1.0 / (12.0 * h_s);
        let s1 = 8.0 * s2;
        let velocity_km_s = s2 * (p_m2h - p_p2h) + s1 * (p_p1h - p_m1h);

        Ok(GroundPoint {
            epoch: orbit.epoch,
            frame: orbit.frame,
            position_km,
            velocity_km_s,
        })
    }

    /// Computes the observed ground point, expressed in the body frame of the shape.
    pub fn target_in_body_frame(&self, orbit: &Orbit) -> Result<GroundPoint, AttitudeError> {
        let observed = self.observed_ground_point(orbit)?;
        let body_frame = self.shape.body_frame();
        let to_body = self
            .frames
            .transform(orbit.frame, body_frame, orbit.epoch)
            .context(AttitudeFrameSnafu)?;
        Ok(GroundPoint {
            epoch: observed.epoch,
            frame: body_frame,
            position_km: to_body.transform_position(&observed.position_km),
            velocity_km_s: to_body
                .transform_velocity(&observed.position_km, &observed.velocity_km_s),
        })
    }

    /// Pointing axis expressed in the requested frame.
    fn pointing_in(
        &self,
        attitude: &Attitude,
        frame: Frame,
    ) -> Result<Unit<Vector3<f64>>, AttitudeError> {
        let pointing_ref = attitude.from_body(&self.sat_pointing);
        let to_frame = self
            .frames
            .transform(attitude.frame, frame, attitude.epoch)
            .context(AttitudeFrameSnafu)?;
        Ok(Unit::new_normalize(to_frame.transform_vector(&pointing_ref)))
    }
}

impl<A: AttitudeProvider> AttitudeProvider for GroundPointing<A> {
    fn attitude(&self, orbit: &Orbit) -> Result<Attitude, AttitudeError> {
        self.underlying.attitude(orbit)
    }
}

impl<A: AttitudeProvider> AttitudeModifier for GroundPointing<A> {
    fn underlying(&self) -> &dyn AttitudeProvider {
        &self.underlying
    }
}
