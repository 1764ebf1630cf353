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

use super::{AstroError, AstroPhysicsSnafu, Frame, NonPositiveMuSnafu};
use crate::linalg::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use crate::time::Epoch;
use crate::utils::r3;
use snafu::prelude::*;
use std::fmt;

pub use anise::constants::frames::{EARTH_J2000, IAU_EARTH_FRAME};

/// Gravitational parameter of the Earth in km^3/s^2 (GMAT value)
pub const EARTH_GM_KM3_S2: f64 = 398_600.441_5;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FrameError {
    #[snafu(display("no transform available from {from} to {to} at {epoch}"))]
    NoTransform { from: Frame, to: Frame, epoch: Epoch },
}

/// Returns whether both frames share the same center and orientation, regardless of the constants they carry.
pub fn same_frame(a: &Frame, b: &Frame) -> bool {
    a.ephemeris_id == b.ephemeris_id && a.orientation_id == b.orientation_id
}

/// Returns the gravitational parameter of the center of this frame, which must be set and strictly positive.
pub fn frame_mu_km3_s2(frame: &Frame) -> Result<f64, AstroError> {
    let mu_km3_s2 = frame.mu_km3_s2().context(AstroPhysicsSnafu)?;
    ensure!(mu_km3_s2 > 0.0, NonPositiveMuSnafu { mu_km3_s2 });
    Ok(mu_km3_s2)
}

/// A transform between two co-centered frames, valid at a given epoch.
///
/// The rotation converts coordinates: `v_to = rotation * v_from`. The angular velocity is the rate of the
/// destination frame with respect to the source frame, expressed in the source frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub from: Frame,
    pub to: Frame,
    pub epoch: Epoch,
    pub rotation: UnitQuaternion<f64>,
    pub angular_velocity_rad_s: Vector3<f64>,
}

impl Transform {
    /// Identity transform from a frame onto itself.
    pub fn identity(frame: Frame, epoch: Epoch) -> Self {
        Self {
            from: frame,
            to: frame,
            epoch,
            rotation: UnitQuaternion::identity(),
            angular_velocity_rad_s: Vector3::zeros(),
        }
    }

    /// Builds a transform from a direction cosine matrix which converts coordinates from `from` to `to`.
    pub fn from_dcm(
        from: Frame,
        to: Frame,
        epoch: Epoch,
        dcm: Matrix3<f64>,
        angular_velocity_rad_s: Vector3<f64>,
    ) -> Self {
        Self {
            from,
            to,
            epoch,
            rotation: UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(dcm)),
            angular_velocity_rad_s,
        }
    }

    pub fn transform_position(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * position
    }

    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Transforms a velocity by applying the transport theorem.
    pub fn transform_velocity(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> Vector3<f64> {
        self.rotation * (velocity - self.angular_velocity_rad_s.cross(position))
    }

    /// Returns the inverse transform, from `to` onto `from`.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            epoch: self.epoch,
            rotation: self.rotation.inverse(),
            angular_velocity_rad_s: -(self.rotation * self.angular_velocity_rad_s),
        }
    }
}

/// Provides the transforms between frames, e.g. from an ephemeris and orientation toolkit.
pub trait FrameTransformer: Send + Sync + fmt::Debug {
    /// Returns the transform converting coordinates from `from` to `to` at the provided epoch.
    fn transform(&self, from: Frame, to: Frame, epoch: Epoch) -> Result<Transform, FrameError>;
}

/// Only knows how to transform a frame onto itself.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityTransformer;

impl FrameTransformer for IdentityTransformer {
    fn transform(&self, from: Frame, to: Frame, epoch: Epoch) -> Result<Transform, FrameError> {
        ensure!(same_frame(&from, &to), NoTransformSnafu { from, to, epoch });
        Ok(Transform::identity(from, epoch))
    }
}

/// A body frame spinning at a constant rate about the Z axis of its parent frame, e.g. a simplified Earth fixed frame.
#[derive(Copy, Clone, Debug)]
pub struct ConstantRotation {
    pub parent: Frame,
    pub body: Frame,
    /// Epoch at which the body frame is rotated by `angle_rad` from its parent
    pub reference_epoch: Epoch,
    pub angle_rad: f64,
    pub rate_rad_s: f64,
}

impl ConstantRotation {
    /// Angle of the body frame with respect to the parent frame at the provided epoch, in radians
    pub fn angle_at(&self, epoch: Epoch) -> f64 {
        self.angle_rad + self.rate_rad_s * (epoch - self.reference_epoch).to_seconds()
    }

    fn parent_to_body(&self, epoch: Epoch) -> Transform {
        Transform::from_dcm(
            self.parent,
            self.body,
            epoch,
            r3(self.angle_at(epoch)),
            Vector3::new(0.0, 0.0, self.rate_rad_s),
        )
    }
}

impl FrameTransformer for ConstantRotation {
    fn transform(&self, from: Frame, to: Frame, epoch: Epoch) -> Result<Transform, FrameError> {
        if same_frame(&from, &to) {
            Ok(Transform::identity(from, epoch))
        } else if same_frame(&from, &self.parent) && same_frame(&to, &self.body) {
            Ok(self.parent_to_body(epoch))
        } else if same_frame(&from, &self.body) && same_frame(&to, &self.parent) {
            Ok(self.parent_to_body(epoch).inverse())
        } else {
            Err(FrameError::NoTransform { from, to, epoch })
        }
    }
}
