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

use crate::attitude::AttitudeError;
use crate::cosmic::{AstroError, FrameError};
use crate::io::ConfigError;
use crate::propagators::PropagationError;
use crate::time::Epoch;
use snafu::prelude::*;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EventError {
    #[snafu(display("event requires an attitude but the state at {epoch} has none"))]
    MissingAttitude { epoch: Epoch },
    #[snafu(display("event failed on frame transformation: {source}"))]
    EventFrame { source: FrameError },
}

/// Crate level error, any error of this crate may be converted into it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum NyxError {
    #[snafu(context(false), display("{source}"))]
    Astro { source: AstroError },
    #[snafu(context(false), display("{source}"))]
    Frame { source: FrameError },
    #[snafu(context(false), display("{source}"))]
    Attitude { source: AttitudeError },
    #[snafu(context(false), display("{source}"))]
    Event { source: EventError },
    #[snafu(context(false), display("{source}"))]
    Config { source: ConfigError },
    #[snafu(context(false), display("{source}"))]
    Propagation { source: PropagationError },
}
