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

pub mod events;
pub use events::{
    ApsisEvent, Convergence, DateEvent, EventAction, EventDetails, EventEdge, EventEvaluator,
    Trigger, TriggerRepr,
};

pub mod prelude {
    pub use super::events::*;
    pub use crate::attitude::{
        AttitudeModifier, AttitudeProvider, GroundPointing, IdentityAttitude, LofOffset,
    };
    pub use crate::cosmic::{Frame, LocalFrame, Orbit, Spacecraft, TimeTagged};
    pub use crate::dynamics::guidance::{ImpulseManeuver, Thruster};
    pub use crate::io::{ConfigRepr, Configurable};
    pub use crate::propagators::{AttitudePolicy, KeplerianPropagator, PropInstance};
    pub use crate::time::{Duration, Epoch, TimeUnits, Unit};
}
