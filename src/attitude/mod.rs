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

use crate::cosmic::{AstroError, AstroPhysicsSnafu, Frame, FrameError, LocalFrame, Orbit};
use crate::linalg::{Rotation3, Unit, UnitQuaternion, Vector3};
use crate::time::Epoch;
use snafu::prelude::*;
use std::fmt;
use std::sync::Arc;

mod pointing;
pub use pointing::{GroundPoint, GroundPointing};

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AttitudeError {
    #[snafu(display("pointing axis misses the target body at {epoch}"))]
    PointingMiss { epoch: Epoch },
    #[snafu(display("attitude frame error: {source}"))]
    AttitudeFrame { source: FrameError },
    #[snafu(display("attitude computation failed: {source}"))]
    AttitudeAstro { source: AstroError },
}

/// Attitude of a vehicle at a given epoch.
///
/// The rotation converts coordinates from the reference frame to the body frame, i.e. `v_body = rotation * v_ref`.
/// The angular velocity of the body with respect to the reference frame is expressed in the body frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Attitude {
    pub epoch: Epoch,
    pub frame: Frame,
    pub rotation: UnitQuaternion<f64>,
    pub angular_velocity_rad_s: Vector3<f64>,
}

impl Attitude {
    /// Body frame aligned with the reference frame, without any rotation rate.
    pub fn identity(epoch: Epoch, frame: Frame) -> Self {
        Self {
            epoch,
            frame,
            rotation: UnitQuaternion::identity(),
            angular_velocity_rad_s: Vector3::zeros(),
        }
    }

    /// Expresses a vector of the reference frame in the body frame
    pub fn to_body(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Expresses a vector of the body frame in the reference frame
    pub fn from_body(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse() * vector
    }
}

impl fmt::Display for Attitude {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rotation.axis() {
            Some(axis) => write!(
                f,
                "[{}] {}\trotation of {:.6} deg about [{:.6}, {:.6}, {:.6}]",
                self.frame,
                self.epoch,
                self.rotation.angle().to_degrees(),
                axis.x,
                axis.y,
                axis.z
            ),
            None => write!(f, "[{}] {}\tno rotation", self.frame, self.epoch),
        }
    }
}

/// An attitude provider computes the attitude of a vehicle on the provided orbit.
///
/// Providers are shared between propagators and pointing laws, so they must be immutable once built.
pub trait AttitudeProvider: Send + Sync + fmt::Debug {
    /// Computes the attitude at the epoch of the orbit, with respect to the frame of the orbit.
    fn attitude(&self, orbit: &Orbit) -> Result<Attitude, AttitudeError>;
}

/// An attitude provider which wraps another provider, and forwards whatever it does not alter.
pub trait AttitudeModifier: AttitudeProvider {
    /// The wrapped attitude law
    fn underlying(&self) -> &dyn AttitudeProvider;
}

impl<A: AttitudeProvider + ?Sized> AttitudeProvider for Arc<A> {
    fn attitude(&self, orbit: &Orbit) -> Result<Attitude, AttitudeError> {
        self.as_ref().attitude(orbit)
    }
}

/// Body frame always aligned with the reference frame.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityAttitude;

impl AttitudeProvider for IdentityAttitude {
    fn attitude(&self, orbit: &Orbit) -> Result<Attitude, AttitudeError> {
        Ok(Attitude::identity(orbit.epoch, orbit.frame))
    }
}

/// Attitude aligned with a local orbital frame, with an optional fixed offset rotation from that frame to the body.
#[derive(Copy, Clone, Debug)]
pub struct LofOffset {
    pub lof: LocalFrame,
    /// Converts coordinates from the local orbital frame to the body frame
    pub offset: UnitQuaternion<f64>,
}

impl LofOffset {
    pub fn new(lof: LocalFrame) -> Self {
        Self {
            lof,
            offset: UnitQuaternion::identity(),
        }
    }

    pub fn with_offset(self, offset: UnitQuaternion<f64>) -> Self {
        let mut me = self;
        me.offset = offset;
        me
    }
}

impl AttitudeProvider for LofOffset {
    fn attitude(&self, orbit: &Orbit) -> Result<Attitude, AttitudeError> {
        let dcm = self
            .lof
            .dcm_to_inertial(*orbit)
            .context(AttitudeAstroSnafu)?
            .rot_mat;
        let lof_rot =
            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(dcm.transpose()));
        let rotation = self.offset * lof_rot;

        let omega_inertial = match self.lof {
            LocalFrame::Inertial => Vector3::zeros(),
            _ => {
                orbit
                    .hvec()
                    .context(AstroPhysicsSnafu)
                    .context(AttitudeAstroSnafu)?
                    / orbit.rmag_km().powi(2)
            }
        };

        Ok(Attitude {
            epoch: orbit.epoch,
            frame: orbit.frame,
            rotation,
            angular_velocity_rad_s: rotation * omega_inertial,
        })
    }
}

/// Adds a constant spin about a body axis on top of an underlying attitude law.
#[derive(Clone, Debug)]
pub struct SpinStabilized<A: AttitudeProvider> {
    underlying: A,
    /// Epoch at which the spin angle is zero
    pub start: Epoch,
    pub rate_rad_s: f64,
    pub axis: Unit<Vector3<f64>>,
}

impl<A: AttitudeProvider> SpinStabilized<A> {
    pub fn new(underlying: A, start: Epoch, rate_rad_s: f64, axis: Unit<Vector3<f64>>) -> Self {
        Self {
            underlying,
            start,
            rate_rad_s,
            axis,
        }
    }
}

impl<A: AttitudeProvider> AttitudeProvider for SpinStabilized<A> {
    fn attitude(&self, orbit: &Orbit) -> Result<Attitude, AttitudeError> {
        let base = self.underlying.attitude(orbit)?;
        let angle = self.rate_rad_s * (orbit.epoch - self.start).to_seconds();
        // Body rotated by `angle` about the spin axis of the base body frame
        let spin = UnitQuaternion::from_axis_angle(&self.axis, -angle);
        Ok(Attitude {
            epoch: base.epoch,
            frame: base.frame,
            rotation: spin * base.rotation,
            angular_velocity_rad_s: spin * base.angular_velocity_rad_s
                + self.axis.into_inner() * self.rate_rad_s,
        })
    }
}

impl<A: AttitudeProvider> AttitudeModifier for SpinStabilized<A> {
    fn underlying(&self) -> &dyn AttitudeProvider {
        &self.underlying
    }
}
