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

use super::Thruster;
use crate::cosmic::{same_frame, FrameTransformer, IdentityTransformer, TimeTagged};
use crate::errors::{EventError, EventFrameSnafu, MissingAttitudeSnafu};
use crate::io::{ConfigError, ConfigRepr, Configurable, InvalidConfigSnafu};
use crate::linalg::Vector3;
use crate::md::events::{Convergence, EventAction, EventEvaluator, Trigger, TriggerRepr};
use crate::time::Duration;
use crate::Spacecraft;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use std::sync::Arc;

/// An impulsive maneuver applied when its trigger event occurs.
///
/// The detection of the event is entirely delegated to the trigger: this only changes what happens when it
/// occurs, namely the state is always reset by adding the delta-v (rotated from the vehicle body frame using the
/// attitude of the state) and by decreasing the mass with the rocket equation.
#[derive(Clone)]
pub struct ImpulseManeuver<E: EventEvaluator> {
    trigger: E,
    /// Delta-v in the vehicle body frame, in km/s
    pub dv_km_s: Vector3<f64>,
    pub thruster: Thruster,
    /// Used when the attitude is expressed in another frame than the orbit
    frames: Option<Arc<dyn FrameTransformer>>,
}

impl<E: EventEvaluator> ImpulseManeuver<E> {
    /// Creates a new impulsive maneuver, the delta-v must be provided in km/s in the body frame of the vehicle.
    pub fn new(trigger: E, dv_km_s: Vector3<f64>, isp_s: f64) -> Result<Self, ConfigError> {
        ensure!(
            isp_s.is_finite() && isp_s > 0.0,
            InvalidConfigSnafu {
                msg: format!("specific impulse must be strictly positive, got {isp_s} s")
            }
        );
        ensure!(
            dv_km_s.iter().all(|dv| dv.is_finite()),
            InvalidConfigSnafu {
                msg: format!("delta-v must be finite, got {dv_km_s}")
            }
        );
        Ok(Self {
            trigger,
            dv_km_s,
            thruster: Thruster { isp_s },
            frames: None,
        })
    }

    /// Returns a copy of this maneuver which uses the provided frame transformer when the attitude frame differs from the orbit frame.
    pub fn with_frames(self, frames: Arc<dyn FrameTransformer>) -> Self {
        let mut me = self;
        me.frames = Some(frames);
        me
    }

    pub fn trigger(&self) -> &E {
        &self.trigger
    }
}

impl<E: EventEvaluator> fmt::Display for ImpulseManeuver<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "impulse of [{:.6}, {:.6}, {:.6}] km/s (isp = {} s) on {}",
            self.dv_km_s.x, self.dv_km_s.y, self.dv_km_s.z, self.thruster.isp_s, self.trigger
        )
    }
}

impl<E: EventEvaluator + fmt::Debug> fmt::Debug for ImpulseManeuver<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImpulseManeuver")
            .field("trigger", &self.trigger)
            .field("dv_km_s", &self.dv_km_s)
            .field("thruster", &self.thruster)
            .field("frames", &self.frames)
            .finish()
    }
}

impl<E: EventEvaluator> EventEvaluator for ImpulseManeuver<E> {
    fn eval(&self, state: &Spacecraft) -> Result<f64, EventError> {
        self.trigger.eval(state)
    }

    fn max_check_interval(&self) -> Duration {
        self.trigger.max_check_interval()
    }

    fn max_iterations(&self) -> usize {
        self.trigger.max_iterations()
    }

    fn threshold(&self) -> Duration {
        self.trigger.threshold()
    }

    fn occurred(&self, _state: &Spacecraft) -> Result<EventAction, EventError> {
        Ok(EventAction::ResetState)
    }

    fn reset_state(&self, state: Spacecraft) -> Result<Spacecraft, EventError> {
        let epoch = state.epoch();
        let attitude = state.attitude.context(MissingAttitudeSnafu { epoch })?;

        // Body frame to attitude reference frame, then to the orbit frame
        let dv_ref_km_s = attitude.from_body(&self.dv_km_s);
        let dv_km_s = if same_frame(&attitude.frame, &state.orbit.frame) {
            dv_ref_km_s
        } else {
            let frames: &dyn FrameTransformer = match &self.frames {
                Some(frames) => frames.as_ref(),
                None => &IdentityTransformer,
            };
            frames
                .transform(attitude.frame, state.orbit.frame, epoch)
                .context(EventFrameSnafu)?
                .transform_vector(&dv_ref_km_s)
        };

        let mass_kg = self
            .thruster
            .mass_after_dv_kg(state.mass_kg, dv_km_s.norm());

        info!(
            "{epoch}: applying {:.6} m/s impulse, mass {:.6} kg -> {:.6} kg",
            dv_km_s.norm() * 1e3,
            state.mass_kg,
            mass_kg
        );

        Ok(state.with_dv_km_s(dv_km_s).with_mass_kg(mass_kg))
    }
}

/// Serializable representation of an impulsive maneuver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpulseManeuverRepr {
    pub trigger: TriggerRepr,
    /// Delta-v in the vehicle body frame, in km/s
    pub dv_km_s: [f64; 3],
    pub isp_s: f64,
    #[serde(default)]
    pub convergence: Option<Convergence>,
}

impl ConfigRepr for ImpulseManeuverRepr {}

impl Configurable for ImpulseManeuver<Trigger> {
    type IntermediateRepr = ImpulseManeuverRepr;

    fn from_config(cfg: Self::IntermediateRepr) -> Result<Self, ConfigError> {
        let trigger = Trigger::from_repr(cfg.trigger, cfg.convergence.unwrap_or_default())?;
        Self::new(trigger, Vector3::from(cfg.dv_km_s), cfg.isp_s)
    }

    fn to_config(&self) -> Result<Self::IntermediateRepr, ConfigError> {
        Ok(ImpulseManeuverRepr {
            trigger: self.trigger.to_repr(),
            dv_km_s: self.dv_km_s.into(),
            isp_s: self.thruster.isp_s,
            convergence: Some(self.trigger.convergence()),
        })
    }
}
