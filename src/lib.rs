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

/*! # nyx-pointing

Event driven Keplerian propagation with impulsive maneuvers, and ground pointing attitude laws.

The propagator advances a spacecraft state analytically under two-body dynamics and monitors any number of
registered events, isolating the root of each event function and applying the reset policy of the event (e.g. an
impulsive maneuver). The attitude module computes where a body-fixed pointing axis intersects a body shape, and how
fast that intersection point moves.
*/

/// Provides the Keplerian propagator and the event detection loop.
pub mod propagators;

/// Provides the guidance tools, namely impulsive maneuvers triggered by events.
pub mod dynamics;

/// Provides the orbital state, frames, body shapes and spacecraft state.
pub mod cosmic;

/// Attitude providers, including ground pointing laws and their modifiers.
pub mod attitude;

/// Utility functions shared by different modules, and which may be useful to engineers.
pub mod utils;

mod errors;
/// Nyx will (almost) never panic and functions which may fail will return an error.
pub use self::errors::{EventError, NyxError};

/// Configuration loading and serialization.
pub mod io;

/// All of the mission design tools, i.e. the event definitions.
pub mod md;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::{Rotation3, Unit, UnitQuaternion};
}

/// Re-export some useful things
pub use self::cosmic::{Frame, Orbit, Spacecraft, TimeTagged};
