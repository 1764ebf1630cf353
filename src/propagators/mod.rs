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
use crate::cosmic::AstroError;
use crate::errors::EventError;
use crate::io::ConfigError;
use crate::time::Epoch;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;

mod instance;
pub use instance::*;
mod keplerian;
pub use keplerian::*;

/// Defines what happens when the attitude provider fails during a propagation query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttitudePolicy {
    /// The attitude failure is returned as an error of the query
    #[default]
    Required,
    /// The failure is logged as a warning and the state is returned without any attitude
    OmitOnFailure,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropagationError {
    #[snafu(display(
        "could not isolate root of {event} between {start} and {end} within {iterations} iterations"
    ))]
    RootNotFound {
        event: String,
        start: Epoch,
        end: Epoch,
        iterations: usize,
    },
    #[snafu(display("attitude provider failed: {source}"))]
    PropAttitude { source: AttitudeError },
    #[snafu(display("event failed: {source}"))]
    PropEvent { source: EventError },
    #[snafu(display("invalid orbital state: {source}"))]
    PropAstro { source: AstroError },
    #[snafu(display("propagation failed because {source}"))]
    PropConfigError { source: ConfigError },
}
