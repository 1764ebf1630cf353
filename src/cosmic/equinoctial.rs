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

use super::{frame_mu_km3_s2, AstroError, AstroPhysicsSnafu, Frame, Orbit};
use crate::linalg::Vector3;
use crate::time::{Duration, Epoch};
use snafu::ResultExt;
use std::f64::consts::PI;
use std::fmt;

/// Maximum number of Newton iterations when solving the equinoctial Kepler equation
const KEPLER_MAX_ITER: usize = 100;
/// Convergence tolerance on the eccentric longitude, in radians
const KEPLER_TOL_RAD: f64 = 1e-14;

/// Equinoctial orbital elements, non singular for circular and equatorial orbits.
///
/// The elements are defined as:
/// + `ex = e cos(ω + Ω)`, `ey = e sin(ω + Ω)`
/// + `hx = tan(i/2) cos(Ω)`, `hy = tan(i/2) sin(Ω)`
/// + `λM = M + ω + Ω`
///
/// They are singular only for retrograde equatorial orbits (i = 180 deg).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EquinoctialElements {
    pub sma_km: f64,
    pub ex: f64,
    pub ey: f64,
    pub hx: f64,
    pub hy: f64,
    pub mean_longitude_rad: f64,
    pub epoch: Epoch,
    pub frame: Frame,
}

impl EquinoctialElements {
    /// Computes the equinoctial elements of the provided elliptical orbit.
    pub fn from_orbit(orbit: &Orbit) -> Result<Self, AstroError> {
        let mu_km3_s2 = frame_mu_km3_s2(&orbit.frame)?;
        let p = orbit.radius_km;
        let v = orbit.velocity_km_s;
        let r = p.norm();
        let v2 = v.norm_squared();
        let r_v2_on_mu = r * v2 / mu_km3_s2;

        let sma_km = r / (2.0 - r_v2_on_mu);
        if sma_km <= 0.0 || !sma_km.is_finite() {
            return Err(AstroError::NotElliptical {
                sma_km,
                ecc: orbit.ecc().context(AstroPhysicsSnafu)?,
            });
        }

        let h = p.cross(&v);
        let hmag = h.norm();
        if hmag < f64::EPSILON {
            return Err(AstroError::NoAngularMomentum);
        }
        let w = h / hmag;
        if 1.0 + w.z < f64::EPSILON {
            return Err(AstroError::RetrogradeEquatorial);
        }
        let d = 1.0 / (1.0 + w.z);
        let hx = -d * w.y;
        let hy = d * w.x;

        // True longitude argument
        let c_lv = (p.x - d * p.z * w.x) / r;
        let s_lv = (p.y - d * p.z * w.y) / r;
        let true_longitude_rad = s_lv.atan2(c_lv);

        // Eccentricity vector
        let e_se = p.dot(&v) / (mu_km3_s2 * sma_km).sqrt();
        let e_ce = r_v2_on_mu - 1.0;
        let e2 = e_ce * e_ce + e_se * e_se;
        if e2 >= 1.0 {
            return Err(AstroError::NotElliptical {
                sma_km,
                ecc: e2.sqrt(),
            });
        }
        let f = e_ce - e2;
        let g = (1.0 - e2).sqrt() * e_se;
        let ex = sma_km * (f * c_lv + g * s_lv) / r;
        let ey = sma_km * (f * s_lv - g * c_lv) / r;

        let eccentric_longitude_rad = true_to_eccentric_longitude(true_longitude_rad, ex, ey);

        Ok(Self {
            sma_km,
            ex,
            ey,
            hx,
            hy,
            mean_longitude_rad: eccentric_to_mean_longitude(eccentric_longitude_rad, ex, ey),
            epoch: orbit.epoch,
            frame: orbit.frame,
        })
    }

    /// Rebuilds the Cartesian orbit from these elements.
    pub fn to_orbit(&self) -> Result<Orbit, AstroError> {
        let mu_km3_s2 = frame_mu_km3_s2(&self.frame)?;
        let (ex, ey, hx, hy) = (self.ex, self.ey, self.hx, self.hy);

        let (s_le, c_le) = self.eccentric_longitude_rad()?.sin_cos();

        // Inclination related intermediate parameters
        let hx2 = hx * hx;
        let hy2 = hy * hy;
        let facth = 1.0 / (1.0 + hx2 + hy2);
        let hxhy = hx * hy;
        let f = Vector3::new((1.0 - hy2 + hx2) * facth, 2.0 * hxhy * facth, -2.0 * hy * facth);
        let g = Vector3::new(2.0 * hxhy * facth, (1.0 + hy2 - hx2) * facth, 2.0 * hx * facth);

        // Eccentricity related intermediate parameters
        let beta = 1.0 / (1.0 + (1.0 - ex * ex - ey * ey).sqrt());
        let ex2 = ex * ex;
        let ey2 = ey * ey;
        let exey = ex * ey;
        let ex_ce_ey_s = ex * c_le + ey * s_le;

        let a = self.sma_km;
        // In-plane coordinates
        let x = a * ((1.0 - beta * ey2) * c_le + beta * exey * s_le - ex);
        let y = a * ((1.0 - beta * ex2) * s_le + beta * exey * c_le - ey);

        let factor = (mu_km3_s2 / a).sqrt() / (1.0 - ex_ce_ey_s);
        let x_dot = factor * (-s_le + beta * ey * ex_ce_ey_s);
        let y_dot = factor * (c_le - beta * ex * ex_ce_ey_s);

        let r = x * f + y * g;
        let v = x_dot * f + y_dot * g;
        Ok(Orbit::cartesian(
            r.x, r.y, r.z, v.x, v.y, v.z, self.epoch, self.frame,
        ))
    }

    /// Returns the eccentricity (no unit)
    pub fn ecc(&self) -> f64 {
        (self.ex * self.ex + self.ey * self.ey).sqrt()
    }

    /// Returns the inclination in radians
    pub fn inc_rad(&self) -> f64 {
        2.0 * (self.hx * self.hx + self.hy * self.hy).sqrt().atan()
    }

    /// Returns the Keplerian mean motion in rad/s
    pub fn mean_motion_rad_s(&self) -> Result<f64, AstroError> {
        Ok((frame_mu_km3_s2(&self.frame)? / self.sma_km).sqrt() / self.sma_km)
    }

    /// Returns the eccentric longitude argument in radians
    pub fn eccentric_longitude_rad(&self) -> Result<f64, AstroError> {
        mean_to_eccentric_longitude(self.mean_longitude_rad, self.ex, self.ey)
    }

    /// Returns the true longitude argument in radians
    pub fn true_longitude_rad(&self) -> Result<f64, AstroError> {
        Ok(eccentric_to_true_longitude(
            self.eccentric_longitude_rad()?,
            self.ex,
            self.ey,
        ))
    }

    /// Returns a copy of these elements where only the mean longitude advanced by `mean_motion * duration`.
    pub fn shifted_by(&self, mean_motion_rad_s: f64, duration: Duration) -> Self {
        let mut me = *self;
        me.mean_longitude_rad += mean_motion_rad_s * duration.to_seconds();
        me.epoch += duration;
        me
    }
}

impl fmt::Display for EquinoctialElements {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] {}\tsma = {:.6} km\tex = {:.6e}\tey = {:.6e}\thx = {:.6e}\thy = {:.6e}\tλM = {:.6} deg",
            self.frame,
            self.epoch,
            self.sma_km,
            self.ex,
            self.ey,
            self.hx,
            self.hy,
            self.mean_longitude_rad.to_degrees()
        )
    }
}

/// Converts the true longitude argument into the eccentric longitude argument.
pub fn true_to_eccentric_longitude(true_longitude_rad: f64, ex: f64, ey: f64) -> f64 {
    let epsilon = (1.0 - ex * ex - ey * ey).sqrt();
    let (s_lv, c_lv) = true_longitude_rad.sin_cos();
    let num = ey * c_lv - ex * s_lv;
    let den = epsilon + 1.0 + ex * c_lv + ey * s_lv;
    true_longitude_rad + 2.0 * (num / den).atan()
}

/// Converts the eccentric longitude argument into the true longitude argument.
pub fn eccentric_to_true_longitude(eccentric_longitude_rad: f64, ex: f64, ey: f64) -> f64 {
    let epsilon = (1.0 - ex * ex - ey * ey).sqrt();
    let (s_le, c_le) = eccentric_longitude_rad.sin_cos();
    let num = ex * s_le - ey * c_le;
    let den = epsilon + 1.0 - ex * c_le - ey * s_le;
    eccentric_longitude_rad + 2.0 * (num / den).atan()
}

/// Converts the eccentric longitude argument into the mean longitude argument.
pub fn eccentric_to_mean_longitude(eccentric_longitude_rad: f64, ex: f64, ey: f64) -> f64 {
    let (s_le, c_le) = eccentric_longitude_rad.sin_cos();
    eccentric_longitude_rad - ex * s_le + ey * c_le
}

/// Solves the equinoctial Kepler equation `λM = λE - ex sin(λE) + ey cos(λE)` with a Newton iteration.
pub fn mean_to_eccentric_longitude(
    mean_longitude_rad: f64,
    ex: f64,
    ey: f64,
) -> Result<f64, AstroError> {
    // Work close to zero to keep the iteration well conditioned, and restore the revolutions at the end.
    let revolutions = ((mean_longitude_rad + PI) / (2.0 * PI)).floor();
    let lm = mean_longitude_rad - revolutions * 2.0 * PI;

    let (s_lm, c_lm) = lm.sin_cos();
    let mut le = lm + ex * s_lm - ey * c_lm;
    for _ in 0..KEPLER_MAX_ITER {
        let (s_le, c_le) = le.sin_cos();
        let f = le - ex * s_le + ey * c_le - lm;
        let f_prime = 1.0 - ex * c_le - ey * s_le;
        let delta = f / f_prime;
        le -= delta;
        if delta.abs() < KEPLER_TOL_RAD {
            return Ok(le + revolutions * 2.0 * PI);
        }
    }
    Err(AstroError::KeplerNotConverged {
        iter: KEPLER_MAX_ITER,
    })
}
