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

use super::EventAction;
use crate::cosmic::TimeTagged;
use crate::Spacecraft;
use core::fmt;

/// Enumerates the possible edges of an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventEdge {
    /// The event function went from negative to positive
    Rising,
    /// The event function went from positive to negative
    Falling,
    /// The edge cannot be determined, e.g. if the function was exactly zero before the crossing
    Unclear,
}

impl EventEdge {
    /// Determines the edge from the values of the event function before and after the crossing.
    pub fn from_values(before: f64, after: f64) -> Self {
        if before < 0.0 && after >= 0.0 {
            Self::Rising
        } else if before > 0.0 && after <= 0.0 {
            Self::Falling
        } else {
            Self::Unclear
        }
    }

    /// Determines the edge of a crossing in increasing time order, from the value of the event function at the
    /// start of the step and at the isolated root, which lies on the far side of the crossing.
    pub fn from_crossing(start: f64, root: f64, backprop: bool) -> Self {
        if !backprop {
            Self::from_values(start, root)
        } else if root == 0.0 {
            // The root is the earlier side in time, the function came from the opposite sign of the start value
            Self::from_values(-start, start)
        } else {
            Self::from_values(root, start)
        }
    }
}

/// Details of an event found during a propagation.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDetails {
    /// The state at the event, before any reset is applied.
    pub state: Spacecraft,
    /// Evaluation of the event function at the event, near zero
    pub value: f64,
    pub edge: EventEdge,
    /// Action requested by the event when it occurred
    pub action: EventAction,
    /// Registration index of the event in the propagator
    pub index: usize,
    // Store the representation of this event as a string because we can't move or clone the event reference
    pub repr: String,
}

impl fmt::Display for EventDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} at {} is {:?} ({:?}, value = {:.6e})",
            self.index,
            self.repr,
            self.state.epoch(),
            self.edge,
            self.action,
            self.value
        )
    }
}
