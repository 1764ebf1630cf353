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

use anise::errors::PhysicsError;
pub use anise::prelude::{Frame, Orbit};

pub use crate::attitude::Attitude;
use crate::time::{Duration, Epoch};
use snafu::Snafu;

/// A trait allowing for something to have an epoch
pub trait TimeTagged {
    /// Retrieve the Epoch
    fn epoch(&self) -> Epoch;
    /// Set the Epoch
    fn set_epoch(&mut self, epoch: Epoch);

    /// Shift this epoch by a duration (can be negative)
    fn shift_by(&mut self, duration: Duration) {
        self.set_epoch(self.epoch() + duration);
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("gravitational parameter must be strictly positive, got {mu_km3_s2} km^3/s^2"))]
    NonPositiveMu { mu_km3_s2: f64 },
    #[snafu(display("orbit is not elliptical (sma = {sma_km} km, ecc = {ecc})"))]
    NotElliptical { sma_km: f64, ecc: f64 },
    #[snafu(display("orbit has no angular momentum, local frames are undefined"))]
    NoAngularMomentum,
    #[snafu(display("equinoctial elements are singular for retrograde equatorial orbits"))]
    RetrogradeEquatorial,
    #[snafu(display("equinoctial Kepler equation did not converge after {iter} iterations"))]
    KeplerNotConverged { iter: usize },
    #[snafu(display("physics error occured during astro computation: {source}"))]
    AstroPhysics { source: PhysicsError },
}

pub fn assert_orbit_eq_or_abs(left: &Orbit, right: &Orbit, epsilon: f64, msg: &str) {
    if !left.eq_within(right, epsilon, epsilon) {
        panic!(
            r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`: {}"#,
            left, right, msg
        )
    }
}

// Re-Export frames
mod frames;
pub use self::frames::*;

// Re-Export orbit
mod orbit;
pub use self::orbit::*;

// Re-Export equinoctial elements
mod equinoctial;
pub use self::equinoctial::*;

// Re-Export shapes
mod shape;
pub use self::shape::*;

// Re-Export spacecraft
mod spacecraft;
pub use self::spacecraft::*;

/// From NIST special publication 330, 2008 edition, in meters per second squared
pub const STD_GRAVITY: f64 = 9.80665;
