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

use super::{Convergence, EventAction, EventEvaluator};
use crate::cosmic::{AstroError, AstroPhysicsSnafu, Orbit, TimeTagged};
use crate::errors::EventError;
use crate::io::{epoch_from_str, epoch_to_str, ConfigError};
use crate::time::{Duration, Epoch};
use crate::Spacecraft;
use serde_derive::{Deserialize, Serialize};
use snafu::ResultExt;
use std::fmt;

/// Triggers when the propagation reaches a given epoch: g = t - t_event in seconds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DateEvent {
    pub epoch: Epoch,
    pub action: EventAction,
    pub convergence: Convergence,
}

impl DateEvent {
    /// Date trigger which stops the propagation
    pub fn new(epoch: Epoch) -> Self {
        Self {
            epoch,
            action: EventAction::Stop,
            convergence: Convergence::default(),
        }
    }

    pub fn with_action(self, action: EventAction) -> Self {
        let mut me = self;
        me.action = action;
        me
    }

    /// Returns a copy of this trigger with the provided root finding settings, which must all be strictly positive.
    pub fn with_convergence(self, convergence: Convergence) -> Result<Self, ConfigError> {
        convergence.validate()?;
        let mut me = self;
        me.convergence = convergence;
        Ok(me)
    }
}

impl fmt::Display for DateEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "date trigger at {}", self.epoch)
    }
}

impl EventEvaluator for DateEvent {
    fn eval(&self, state: &Spacecraft) -> Result<f64, EventError> {
        Ok((state.epoch() - self.epoch).to_seconds())
    }

    fn max_check_interval(&self) -> Duration {
        self.convergence.max_check_interval
    }

    fn max_iterations(&self) -> usize {
        self.convergence.max_iterations
    }

    fn threshold(&self) -> Duration {
        self.convergence.threshold
    }

    fn occurred(&self, _state: &Spacecraft) -> Result<EventAction, EventError> {
        Ok(self.action)
    }
}

/// Triggers at periapsis (rising edge) and apoapsis (falling edge): g = r . v
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ApsisEvent {
    pub action: EventAction,
    pub convergence: Convergence,
}

impl ApsisEvent {
    /// Apsis trigger which stops the propagation, checked every third of the period of the provided orbit.
    pub fn from_orbit(orbit: &Orbit) -> Result<Self, AstroError> {
        let convergence = Convergence {
            max_check_interval: orbit.period().context(AstroPhysicsSnafu)? / 3,
            ..Default::default()
        };
        Ok(Self {
            action: EventAction::Stop,
            convergence,
        })
    }

    pub fn with_action(self, action: EventAction) -> Self {
        let mut me = self;
        me.action = action;
        me
    }

    /// Returns a copy of this trigger with the provided root finding settings, which must all be strictly positive.
    pub fn with_convergence(self, convergence: Convergence) -> Result<Self, ConfigError> {
        convergence.validate()?;
        let mut me = self;
        me.convergence = convergence;
        Ok(me)
    }
}

impl Default for ApsisEvent {
    fn default() -> Self {
        Self {
            action: EventAction::Stop,
            convergence: Convergence::default(),
        }
    }
}

impl fmt::Display for ApsisEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "apsis trigger")
    }
}

impl EventEvaluator for ApsisEvent {
    fn eval(&self, state: &Spacecraft) -> Result<f64, EventError> {
        Ok(state.orbit.radius_km.dot(&state.orbit.velocity_km_s))
    }

    fn max_check_interval(&self) -> Duration {
        self.convergence.max_check_interval
    }

    fn max_iterations(&self) -> usize {
        self.convergence.max_iterations
    }

    fn threshold(&self) -> Duration {
        self.convergence.threshold
    }

    fn occurred(&self, _state: &Spacecraft) -> Result<EventAction, EventError> {
        Ok(self.action)
    }
}

/// Any of the trigger events which may be configured from a file.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Trigger {
    Date(DateEvent),
    Apsis(ApsisEvent),
}

impl Trigger {
    fn evaluator(&self) -> &dyn EventEvaluator {
        match self {
            Self::Date(event) => event,
            Self::Apsis(event) => event,
        }
    }

    /// Builds the trigger from its representation, with the provided root finding settings.
    pub fn from_repr(repr: TriggerRepr, convergence: Convergence) -> Result<Self, ConfigError> {
        Ok(match repr {
            TriggerRepr::Date { epoch } => {
                Self::Date(DateEvent::new(epoch).with_convergence(convergence)?)
            }
            TriggerRepr::Apsis => Self::Apsis(ApsisEvent::default().with_convergence(convergence)?),
        })
    }

    pub fn to_repr(&self) -> TriggerRepr {
        match self {
            Self::Date(event) => TriggerRepr::Date { epoch: event.epoch },
            Self::Apsis(_) => TriggerRepr::Apsis,
        }
    }

    pub fn convergence(&self) -> Convergence {
        match self {
            Self::Date(event) => event.convergence,
            Self::Apsis(event) => event.convergence,
        }
    }
}

impl From<DateEvent> for Trigger {
    fn from(event: DateEvent) -> Self {
        Self::Date(event)
    }
}

impl From<ApsisEvent> for Trigger {
    fn from(event: ApsisEvent) -> Self {
        Self::Apsis(event)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.evaluator())
    }
}

impl EventEvaluator for Trigger {
    fn eval(&self, state: &Spacecraft) -> Result<f64, EventError> {
        self.evaluator().eval(state)
    }

    fn max_check_interval(&self) -> Duration {
        self.evaluator().max_check_interval()
    }

    fn max_iterations(&self) -> usize {
        self.evaluator().max_iterations()
    }

    fn threshold(&self) -> Duration {
        self.evaluator().threshold()
    }

    fn occurred(&self, state: &Spacecraft) -> Result<EventAction, EventError> {
        self.evaluator().occurred(state)
    }

    fn reset_state(&self, state: Spacecraft) -> Result<Spacecraft, EventError> {
        self.evaluator().reset_state(state)
    }
}

/// Serializable representation of a trigger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerRepr {
    Date {
        #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
        epoch: Epoch,
    },
    Apsis,
}
