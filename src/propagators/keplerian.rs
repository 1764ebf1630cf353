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

use super::{
    AttitudePolicy, PropAstroSnafu, PropAttitudeSnafu, PropConfigSnafu, PropInstance,
    PropagationError,
};
use crate::attitude::{Attitude, AttitudeProvider, IdentityAttitude};
use crate::cosmic::{frame_mu_km3_s2, AstroPhysicsSnafu, EquinoctialElements, Orbit, TimeTagged};
use crate::io::ConfigError;
use crate::time::{Duration, Epoch};
use crate::Spacecraft;
use rayon::prelude::*;
use snafu::prelude::*;
use std::sync::Arc;

/// Analytical two-body propagator.
///
/// Only the mean longitude argument evolves, at the mean motion computed from the initial semi-major axis.
/// The attitude of each propagated state is computed by the attitude provider, which defaults to the identity.
#[derive(Clone, Debug)]
pub struct KeplerianPropagator {
    initial: Spacecraft,
    elements: EquinoctialElements,
    mean_motion_rad_s: f64,
    attitude_provider: Arc<dyn AttitudeProvider>,
    attitude_policy: AttitudePolicy,
}

impl KeplerianPropagator {
    /// Initializes a new Keplerian propagator from the provided state, which must have a strictly positive mass
    /// and be on an elliptical orbit around a frame with a strictly positive gravitational parameter.
    pub fn new(initial: Spacecraft) -> Result<Self, PropagationError> {
        Self::build(initial, Arc::new(IdentityAttitude), AttitudePolicy::default())
    }

    fn build(
        initial: Spacecraft,
        attitude_provider: Arc<dyn AttitudeProvider>,
        attitude_policy: AttitudePolicy,
    ) -> Result<Self, PropagationError> {
        let orbit = initial.orbit;
        let invalid = |msg: String| ConfigError::InvalidConfig { msg };

        if !(initial.mass_kg.is_finite() && initial.mass_kg > 0.0) {
            return Err(invalid(format!(
                "mass must be strictly positive, got {} kg",
                initial.mass_kg
            )))
            .context(PropConfigSnafu);
        }

        let mu_km3_s2 = frame_mu_km3_s2(&orbit.frame)
            .map_err(|e| invalid(e.to_string()))
            .context(PropConfigSnafu)?;

        let sma_km = orbit
            .sma_km()
            .context(AstroPhysicsSnafu)
            .context(PropAstroSnafu)?;
        let ecc = orbit
            .ecc()
            .context(AstroPhysicsSnafu)
            .context(PropAstroSnafu)?;
        if !(sma_km.is_finite() && sma_km > 0.0 && ecc < 1.0) {
            return Err(invalid(format!(
                "orbit must be elliptical, got sma = {sma_km} km and ecc = {ecc}"
            )))
            .context(PropConfigSnafu);
        }

        let elements = EquinoctialElements::from_orbit(&orbit).context(PropAstroSnafu)?;
        let mean_motion_rad_s = (mu_km3_s2 / elements.sma_km).sqrt() / elements.sma_km;

        Ok(Self {
            initial,
            elements,
            mean_motion_rad_s,
            attitude_provider,
            attitude_policy,
        })
    }

    /// Returns a new propagator using the provided attitude provider.
    pub fn with_attitude_provider(self, attitude_provider: Arc<dyn AttitudeProvider>) -> Self {
        let mut me = self;
        me.attitude_provider = attitude_provider;
        me
    }

    /// Returns a new propagator with the provided attitude failure policy.
    pub fn with_attitude_policy(self, attitude_policy: AttitudePolicy) -> Self {
        let mut me = self;
        me.attitude_policy = attitude_policy;
        me
    }

    /// Returns a new propagator starting from the provided state, with the same attitude configuration.
    pub fn reset(&self, state: Spacecraft) -> Result<Self, PropagationError> {
        Self::build(
            state,
            self.attitude_provider.clone(),
            self.attitude_policy,
        )
    }

    /// Initial state of this propagator, as provided at construction.
    pub fn initial_state(&self) -> Spacecraft {
        self.initial
    }

    pub fn initial_elements(&self) -> EquinoctialElements {
        self.elements
    }

    pub fn mean_motion_rad_s(&self) -> f64 {
        self.mean_motion_rad_s
    }

    pub fn attitude_policy(&self) -> AttitudePolicy {
        self.attitude_policy
    }

    /// Returns the orbit at the provided epoch, which may be before the initial epoch.
    pub fn orbit_at(&self, epoch: Epoch) -> Result<Orbit, PropagationError> {
        let dt = epoch - self.initial.epoch();
        if dt == Duration::ZERO {
            return Ok(self.initial.orbit);
        }
        self.elements
            .shifted_by(self.mean_motion_rad_s, dt)
            .to_orbit()
            .context(PropAstroSnafu)
    }

    /// Returns the spacecraft state at the provided epoch, with its attitude.
    pub fn at(&self, epoch: Epoch) -> Result<Spacecraft, PropagationError> {
        let orbit = self.orbit_at(epoch)?;
        Ok(Spacecraft {
            orbit,
            mass_kg: self.initial.mass_kg,
            attitude: self.attitude_at(&orbit)?,
        })
    }

    /// Returns the states at each of the provided epochs, computed in parallel.
    pub fn states_at(&self, epochs: &[Epoch]) -> Result<Vec<Spacecraft>, PropagationError> {
        epochs.par_iter().map(|epoch| self.at(*epoch)).collect()
    }

    /// Creates a propagation instance starting at the initial state of this propagator, without any event.
    pub fn instance(self) -> Result<PropInstance, PropagationError> {
        PropInstance::new(self)
    }

    fn attitude_at(&self, orbit: &Orbit) -> Result<Option<Attitude>, PropagationError> {
        match self.attitude_provider.attitude(orbit) {
            Ok(attitude) => Ok(Some(attitude)),
            Err(e) => match self.attitude_policy {
                AttitudePolicy::Required => Err(e).context(PropAttitudeSnafu),
                AttitudePolicy::OmitOnFailure => {
                    warn!("{}: state without attitude because {e}", orbit.epoch);
                    Ok(None)
                }
            },
        }
    }
}
