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

use crate::cosmic::STD_GRAVITY;
use serde_derive::{Deserialize, Serialize};

mod impulse;
pub use impulse::{ImpulseManeuver, ImpulseManeuverRepr};

/// Defines a thruster by its specific impulse.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thruster {
    /// The Isp is to be provided in seconds
    pub isp_s: f64,
}

impl Thruster {
    /// Returns the exhaust velocity v_e in meters per second
    pub fn exhaust_velocity_m_s(&self) -> f64 {
        self.isp_s * STD_GRAVITY
    }

    /// Returns the exhaust velocity v_e in kilometers per second
    pub fn exhaust_velocity_km_s(&self) -> f64 {
        self.exhaust_velocity_m_s() * 1e-3
    }

    /// Returns the mass after a delta-v of the provided norm (in km/s), using the rocket equation.
    pub fn mass_after_dv_kg(&self, mass_kg: f64, dv_km_s: f64) -> f64 {
        mass_kg * (-dv_km_s / self.exhaust_velocity_km_s()).exp()
    }
}
