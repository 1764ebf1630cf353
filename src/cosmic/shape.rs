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

use super::{same_frame, Frame, FrameError};
use crate::linalg::{Unit, Vector3};
use crate::time::Epoch;
use std::fmt;

pub use anise::structure::planetocentric::ellipsoid::Ellipsoid;

/// An oriented line, defined by its origin and a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line {
    pub origin: Vector3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl Line {
    pub fn new(origin: Vector3<f64>, direction: Unit<Vector3<f64>>) -> Self {
        Self { origin, direction }
    }

    /// Returns the point located at the provided signed abscissa from the origin
    pub fn point_at(&self, abscissa: f64) -> Vector3<f64> {
        self.origin + abscissa * self.direction.into_inner()
    }

    /// Returns the abscissa of the projection of the provided point onto this line
    pub fn abscissa(&self, point: &Vector3<f64>) -> f64 {
        (point - self.origin).dot(&self.direction)
    }
}

/// A body shape only needs to know how to intersect a line.
pub trait BodyShape: Send + Sync + fmt::Debug {
    /// Frame attached to the body, in which the shape is defined
    fn body_frame(&self) -> Frame;

    /// Returns the intersection of the line with the shape which is closest to `close_km`, expressed in the body frame.
    ///
    /// The line and the close point must be expressed in `frame` at `epoch`. Returns `None` if the line misses the shape.
    fn intersection(
        &self,
        line: &Line,
        close_km: &Vector3<f64>,
        frame: Frame,
        epoch: Epoch,
    ) -> Result<Option<Vector3<f64>>, FrameError>;
}

/// A tri-axial ellipsoid centered on the origin of its body frame, with semi axes along the X, Y and Z axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyEllipsoid {
    pub frame: Frame,
    pub ellipsoid: Ellipsoid,
}

impl BodyEllipsoid {
    pub fn new(frame: Frame, ellipsoid: Ellipsoid) -> Self {
        Self { frame, ellipsoid }
    }

    /// Sphere of the provided radius
    pub fn sphere(frame: Frame, radius_km: f64) -> Self {
        Self::new(frame, Ellipsoid::from_sphere(radius_km))
    }

    /// Oblate (or prolate) spheroid of revolution about the Z axis
    pub fn spheroid(frame: Frame, equatorial_radius_km: f64, polar_radius_km: f64) -> Self {
        Self::new(
            frame,
            Ellipsoid::from_spheroid(equatorial_radius_km, polar_radius_km),
        )
    }

    /// Uses the shape carried by the frame, if any.
    pub fn from_frame(frame: Frame) -> Option<Self> {
        frame.shape.map(|ellipsoid| Self::new(frame, ellipsoid))
    }

    fn semi_axes(&self) -> Vector3<f64> {
        Vector3::new(
            self.ellipsoid.semi_major_equatorial_radius_km,
            self.ellipsoid.semi_minor_equatorial_radius_km,
            self.ellipsoid.polar_radius_km,
        )
    }
}

impl BodyShape for BodyEllipsoid {
    fn body_frame(&self) -> Frame {
        self.frame
    }

    fn intersection(
        &self,
        line: &Line,
        close_km: &Vector3<f64>,
        frame: Frame,
        epoch: Epoch,
    ) -> Result<Option<Vector3<f64>>, FrameError> {
        if !same_frame(&frame, &self.frame) {
            return Err(FrameError::NoTransform {
                from: frame,
                to: self.frame,
                epoch,
            });
        }

        // Scale the problem to the unit sphere and solve a*k^2 + 2*b*k + c = 0 for the abscissa k.
        let axes = self.semi_axes();
        let o = line.origin.component_div(&axes);
        let d = line.direction.into_inner().component_div(&axes);
        let a = d.norm_squared();
        let b = o.dot(&d);
        let c = o.norm_squared() - 1.0;

        let disc = b * b - a * c;
        if disc < 0.0 {
            return Ok(None);
        }
        let sqrt_disc = disc.sqrt();
        let k_close = line.abscissa(close_km);
        let k1 = (-b - sqrt_disc) / a;
        let k2 = (-b + sqrt_disc) / a;
        let k = if (k1 - k_close).abs() <= (k2 - k_close).abs() {
            k1
        } else {
            k2
        };
        Ok(Some(line.point_at(k)))
    }
}
