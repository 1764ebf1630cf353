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

use super::{Attitude, Orbit, TimeTagged};
use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;

/// A spacecraft state: its orbit, its total mass, and optionally its attitude at the same epoch.
///
/// States are values: propagation and maneuvers return new states and never modify an existing one.
#[derive(Clone, Copy, Debug)]
pub struct Spacecraft {
    pub orbit: Orbit,
    /// Total mass in kg
    pub mass_kg: f64,
    /// Attitude of the vehicle, if an attitude law could be evaluated at this state
    pub attitude: Option<Attitude>,
}

impl Spacecraft {
    /// Initialize a spacecraft state without any attitude.
    pub fn new(orbit: Orbit, mass_kg: f64) -> Self {
        Self {
            orbit,
            mass_kg,
            attitude: None,
        }
    }

    /// Returns a copy of the state with a new orbit
    pub fn with_orbit(self, orbit: Orbit) -> Self {
        let mut me = self;
        me.orbit = orbit;
        me
    }

    /// Returns a copy of the state with a new total mass
    pub fn with_mass_kg(self, mass_kg: f64) -> Self {
        let mut me = self;
        me.mass_kg = mass_kg;
        me
    }

    /// Returns a copy of the state with the provided attitude (or none)
    pub fn with_attitude(self, attitude: Option<Attitude>) -> Self {
        let mut me = self;
        me.attitude = attitude;
        me
    }

    /// Returns a copy of the state with the provided delta-v (in km/s, in the orbit frame) applied, and the same mass
    pub fn with_dv_km_s(self, dv_km_s: Vector3<f64>) -> Self {
        let mut me = self;
        me.orbit.apply_dv_km_s(dv_km_s);
        me
    }

    /// Returns the root sum square error between this spacecraft and the other, in kilometers for the position, kilometers per second in velocity, and kilograms in mass
    pub fn rss(&self, other: &Self) -> (f64, f64, f64) {
        (
            (self.orbit.radius_km - other.orbit.radius_km).norm(),
            (self.orbit.velocity_km_s - other.orbit.velocity_km_s).norm(),
            (self.mass_kg - other.mass_kg).abs(),
        )
    }
}

impl TimeTagged for Spacecraft {
    fn epoch(&self) -> Epoch {
        self.orbit.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.orbit.epoch = epoch;
        if let Some(attitude) = self.attitude.as_mut() {
            attitude.epoch = epoch;
        }
    }
}

impl PartialEq for Spacecraft {
    fn eq(&self, other: &Self) -> bool {
        let mass_tol = 1e-6; // milligram
        self.orbit == other.orbit && (self.mass_kg - other.mass_kg).abs() < mass_tol
    }
}

#[allow(clippy::format_in_format_args)]
impl fmt::Display for Spacecraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mass_prec = f.precision().unwrap_or(3);
        let attitude = match &self.attitude {
            Some(att) => format!("{att}"),
            None => "no attitude".to_string(),
        };
        write!(
            f,
            "total mass = {} kg @  {}  ({})",
            format!("{:.*}", mass_prec, self.mass_kg),
            self.orbit,
            attitude
        )
    }
}
