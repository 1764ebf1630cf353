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

use super::{AstroError, AstroPhysicsSnafu, NoAngularMomentumSnafu, Orbit, TimeTagged};
use crate::linalg::Matrix3;
use crate::time::{Duration, Epoch};
use anise::math::rotation::DCM;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;

/// Local orbital frames, notably used to define attitude laws.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalFrame {
    Inertial,
    /// Radial, in-track, cross-track (along the orbit momentum)
    RIC,
    /// Velocity, normal (along the orbit momentum), co-normal
    VNC,
    /// Radial, cross-track, normal
    RCN,
    /// Vehicle velocity local horizontal: Z towards the center of the body, Y opposite to the orbit momentum
    VVLH,
}

impl LocalFrame {
    /// Returns the DCM from this local frame to the inertial frame of the state, i.e. its columns are the local
    /// axes expressed in the inertial frame.
    pub fn dcm_to_inertial(&self, state: Orbit) -> Result<DCM, AstroError> {
        if *self != LocalFrame::Inertial {
            ensure!(
                state.hmag().context(AstroPhysicsSnafu)? > f64::EPSILON,
                NoAngularMomentumSnafu
            );
        }

        let dcm = match self {
            LocalFrame::Inertial => Ok(DCM::identity(
                state.frame.orientation_id,
                state.frame.orientation_id,
            )),
            LocalFrame::RIC => state.dcm_from_ric_to_inertial(),
            LocalFrame::VNC => state.dcm_from_vnc_to_inertial(),
            LocalFrame::RCN => state.dcm_from_rcn_to_inertial(),
            LocalFrame::VVLH => state.dcm_from_ric_to_inertial().map(|ric| DCM {
                rot_mat: ric_to_vvlh(ric.rot_mat),
                rot_mat_dt: ric.rot_mat_dt.map(ric_to_vvlh),
                ..ric
            }),
        };
        dcm.context(AstroPhysicsSnafu)
    }
}

/// VVLH axes from the RIC axes: X in-track, Y anti-momentum, Z nadir.
fn ric_to_vvlh(ric: Matrix3<f64>) -> Matrix3<f64> {
    Matrix3::from_columns(&[
        ric.column(1).into_owned(),
        -ric.column(2).into_owned(),
        -ric.column(0).into_owned(),
    ])
}

/// Straight line extrapolation of a state: `p + v * dt`, with the same velocity.
///
/// This is only a valid approximation for very short durations.
pub trait LinearShift: Sized {
    fn linear_shift_by(&self, duration: Duration) -> Self;
}

impl LinearShift for Orbit {
    fn linear_shift_by(&self, duration: Duration) -> Self {
        let mut me = *self;
        me.radius_km += duration.to_seconds() * self.velocity_km_s;
        me.epoch = self.epoch + duration;
        me
    }
}

impl TimeTagged for Orbit {
    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch
    }
}
