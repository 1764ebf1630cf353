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

use crate::errors::EventError;
use crate::io::{duration_from_str, duration_to_str, ConfigError, InvalidConfigSnafu};
use crate::time::{Duration, Unit};
use crate::Spacecraft;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

mod details;
pub use details::*;
mod triggers;
pub use triggers::*;

/// What the propagator must do once the root of an event has been isolated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventAction {
    /// Record the event and continue propagating
    Continue,
    /// Stop the propagation at the event
    Stop,
    /// Replace the state at the event with the output of `reset_state`, and continue propagating
    ResetState,
}

/// Root finding settings of an event.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct Convergence {
    /// Maximum time between two evaluations of the event function when searching for a sign change
    #[builder(default_code = "600 * Unit::Second")]
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    pub max_check_interval: Duration,
    /// Maximum number of iterations to isolate a root
    #[builder(default = 100)]
    pub max_iterations: usize,
    /// Width of the time bracket under which a root is considered isolated
    #[builder(default_code = "1 * Unit::Microsecond")]
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    pub threshold: Duration,
}

impl Convergence {
    /// Settings currently used by the provided event
    pub fn of<E: EventEvaluator + ?Sized>(event: &E) -> Self {
        Self {
            max_check_interval: event.max_check_interval(),
            max_iterations: event.max_iterations(),
            threshold: event.threshold(),
        }
    }

    /// Ensures that all of the settings are strictly positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.max_check_interval > Duration::ZERO,
            InvalidConfigSnafu {
                msg: format!(
                    "max check interval must be strictly positive, got {}",
                    self.max_check_interval
                )
            }
        );
        ensure!(
            self.max_iterations > 0,
            InvalidConfigSnafu {
                msg: "max iterations must be strictly positive"
            }
        );
        ensure!(
            self.threshold > Duration::ZERO,
            InvalidConfigSnafu {
                msg: format!(
                    "convergence threshold must be strictly positive, got {}",
                    self.threshold
                )
            }
        );
        Ok(())
    }
}

impl Default for Convergence {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// An event evaluator is a scalar function of the spacecraft state whose zero crossings are the events.
///
/// The convergence settings drive the detection: the propagator evaluates the function at most every
/// `max_check_interval`, and isolates any sign change to within `threshold` in at most `max_iterations`.
pub trait EventEvaluator: fmt::Display + Send + Sync {
    /// Evaluation of the event function, a sign change marks the event
    fn eval(&self, state: &Spacecraft) -> Result<f64, EventError>;

    fn max_check_interval(&self) -> Duration;

    fn max_iterations(&self) -> usize;

    fn threshold(&self) -> Duration;

    /// Called once the root is isolated, at the state of the root
    fn occurred(&self, _state: &Spacecraft) -> Result<EventAction, EventError> {
        Ok(EventAction::Stop)
    }

    /// Computes the new state if `occurred` returned `ResetState`. Defaults to the unchanged state.
    fn reset_state(&self, state: Spacecraft) -> Result<Spacecraft, EventError> {
        Ok(state)
    }
}
