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

use super::{KeplerianPropagator, PropConfigSnafu, PropEventSnafu, PropagationError};
use crate::cosmic::TimeTagged;
use crate::md::events::{Convergence, EventAction, EventDetails, EventEdge, EventEvaluator};
use crate::time::{Duration, Epoch, Unit};
use crate::Spacecraft;
use snafu::prelude::*;
use std::cmp::Ordering;
use std::fmt;

/// Result of a propagation: the final state, and the details of the event which stopped it, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct PropOutcome {
    pub state: Spacecraft,
    pub stop: Option<EventDetails>,
}

struct Registered {
    event: Box<dyn EventEvaluator>,
    /// Epoch of the latest occurrence, used to never trigger the same crossing twice
    last_root: Option<Epoch>,
}

/// A propagation instance owns the propagator, the current state, and the registered events.
///
/// The state is advanced by steps no longer than the smallest max check interval of the events. Whenever an event
/// function changes sign over a step, its root is isolated and the action of the event is applied at that root.
pub struct PropInstance {
    /// The current state of this instance
    pub state: Spacecraft,
    model: KeplerianPropagator,
    events: Vec<Registered>,
    history: Vec<EventDetails>,
}

impl PropInstance {
    pub fn new(model: KeplerianPropagator) -> Result<Self, PropagationError> {
        let state = model.at(model.initial_state().epoch())?;
        Ok(Self {
            state,
            model,
            events: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Registers a new event and returns its index, used as tie breaker for simultaneous events.
    ///
    /// The max check interval, max iterations and threshold of the event must all be strictly positive.
    pub fn add_event<E: EventEvaluator + 'static>(
        &mut self,
        event: E,
    ) -> Result<usize, PropagationError> {
        Convergence::of(&event)
            .validate()
            .context(PropConfigSnafu)?;
        self.events.push(Registered {
            event: Box::new(event),
            last_root: None,
        });
        Ok(self.events.len() - 1)
    }

    /// Returns this instance with the provided event registered.
    pub fn with_event<E: EventEvaluator + 'static>(
        mut self,
        event: E,
    ) -> Result<Self, PropagationError> {
        self.add_event(event)?;
        Ok(self)
    }

    /// The propagator currently in use, which changes every time an event resets the state.
    pub fn model(&self) -> &KeplerianPropagator {
        &self.model
    }

    /// All of the events which occurred so far, in the order they were applied.
    pub fn history(&self) -> &[EventDetails] {
        &self.history
    }

    /// Propagates until the provided epoch, which may be before the current epoch.
    pub fn until_epoch(&mut self, end_time: Epoch) -> Result<PropOutcome, PropagationError> {
        let duration: Duration = end_time - self.state.epoch();
        self.for_duration(duration)
    }

    /// Propagates for the provided duration, which may be negative.
    pub fn for_duration(&mut self, duration: Duration) -> Result<PropOutcome, PropagationError> {
        if duration == 0 * Unit::Second {
            return Ok(PropOutcome {
                state: self.state,
                stop: None,
            });
        }
        let stop_time = self.state.epoch() + duration;
        let backprop = duration.is_negative();

        info!("Propagating for {} until {}", duration, stop_time);

        let max_step = self
            .events
            .iter()
            .map(|registered| registered.event.max_check_interval())
            .fold(duration.abs(), |min, step| if step < min { step } else { min });

        let mut g_prev = self.eval_all(&self.state)?;

        loop {
            let epoch = self.state.epoch();
            if epoch == stop_time {
                info!("Propagation done at {}", epoch);
                return Ok(PropOutcome {
                    state: self.state,
                    stop: None,
                });
            }

            let remaining = (stop_time - epoch).abs();
            let step = if remaining < max_step {
                remaining
            } else {
                max_step
            };
            let next_epoch = if backprop { epoch - step } else { epoch + step };
            let next_state = self.model.at(next_epoch)?;
            let g_next = self.eval_all(&next_state)?;

            // Isolate the roots of all of the events which changed sign over this step
            let mut roots = Vec::new();
            for (index, registered) in self.events.iter().enumerate() {
                if !sign_change_detected(g_prev[index], g_next[index]) {
                    continue;
                }
                let (root, value) = isolate_root(
                    &self.model,
                    registered.event.as_ref(),
                    epoch,
                    g_prev[index],
                    next_epoch,
                    g_next[index],
                )?;
                let threshold = registered.event.threshold();
                if let Some(last_root) = registered.last_root {
                    if (root - last_root).abs() <= threshold {
                        debug!(
                            "{} at {root} already occurred at {last_root}",
                            registered.event
                        );
                        continue;
                    }
                }
                roots.push(Root {
                    index,
                    epoch: root,
                    value,
                    before: g_prev[index],
                });
            }

            if roots.is_empty() {
                self.state = next_state;
                g_prev = g_next;
                continue;
            }

            // Earliest root first in the direction of propagation, then registration order
            roots.sort_by(|a, b| a.cmp_in(b, backprop));
            let first = roots[0].epoch;
            let tie = self.events[roots[0].index].event.threshold();
            roots.retain(|root| (root.epoch - first).abs() <= tie);
            roots.sort_by_key(|root| root.index);

            let mut group_epoch = first;
            for root in roots {
                if root.later_than(group_epoch, backprop) {
                    group_epoch = root.epoch;
                }
                if let Some(details) = self.apply(root, backprop)? {
                    self.state = details.state;
                    info!("Propagation stopped by {}", details);
                    return Ok(PropOutcome {
                        state: self.state,
                        stop: Some(details),
                    });
                }
            }

            // Resume after the group of events, from the (possibly reset) model
            self.state = self.model.at(group_epoch)?;
            g_prev = self.eval_all(&self.state)?;
        }
    }

    /// Applies the action of the event at its root, and returns the event details if propagation must stop.
    fn apply(&mut self, root: Root, backprop: bool) -> Result<Option<EventDetails>, PropagationError> {
        let state = self.model.at(root.epoch)?;
        let registered = &mut self.events[root.index];
        let action = registered.event.occurred(&state).context(PropEventSnafu)?;
        registered.last_root = Some(root.epoch);

        let edge = EventEdge::from_crossing(root.before, root.value, backprop);

        let details = EventDetails {
            state,
            value: root.value,
            edge,
            action,
            index: root.index,
            repr: format!("{}", registered.event),
        };
        info!("{}", details);
        self.history.push(details.clone());

        match action {
            EventAction::Continue => Ok(None),
            EventAction::Stop => Ok(Some(details)),
            EventAction::ResetState => {
                let new_state = registered
                    .event
                    .reset_state(state)
                    .context(PropEventSnafu)?;
                self.model = self.model.reset(new_state)?;
                Ok(None)
            }
        }
    }

    fn eval_all(&self, state: &Spacecraft) -> Result<Vec<f64>, PropagationError> {
        self.events
            .iter()
            .map(|registered| registered.event.eval(state).context(PropEventSnafu))
            .collect()
    }
}

impl fmt::Debug for PropInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let events: Vec<String> = self
            .events
            .iter()
            .map(|registered| format!("{}", registered.event))
            .collect();
        f.debug_struct("PropInstance")
            .field("state", &self.state)
            .field("model", &self.model)
            .field("events", &events)
            .field("history", &self.history)
            .finish()
    }
}

/// An isolated root of one of the registered events.
#[derive(Copy, Clone, Debug)]
struct Root {
    index: usize,
    epoch: Epoch,
    value: f64,
    /// Value of the event function at the start of the step
    before: f64,
}

impl Root {
    fn cmp_in(&self, other: &Self, backprop: bool) -> Ordering {
        let by_epoch = if backprop {
            other.epoch.partial_cmp(&self.epoch)
        } else {
            self.epoch.partial_cmp(&other.epoch)
        };
        by_epoch
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }

    fn later_than(&self, epoch: Epoch, backprop: bool) -> bool {
        if backprop {
            self.epoch < epoch
        } else {
            self.epoch > epoch
        }
    }
}

/// A zero at the start of a step is not a crossing, a zero at the end of the step is.
fn sign_change_detected(g_start: f64, g_end: f64) -> bool {
    if g_start == 0.0 {
        false
    } else if g_end == 0.0 {
        true
    } else {
        g_start.signum() != g_end.signum()
    }
}

/// Isolates the root of the event between two epochs where its function has opposite signs.
///
/// This is a regula falsi with the Illinois modification, where each candidate stays away from the ends of the
/// bracket, and which falls back to bisection when the bracket does not at least halve. The returned epoch is on
/// the far side of the crossing (i.e. on the side of `end`) within `threshold` of the root, or exactly on the root
/// when the event function vanishes there.
fn isolate_root(
    model: &KeplerianPropagator,
    event: &dyn EventEvaluator,
    start: Epoch,
    g_start: f64,
    end: Epoch,
    g_end: f64,
) -> Result<(Epoch, f64), PropagationError> {
    let threshold_s = event.threshold().to_seconds();
    let max_iterations = event.max_iterations();

    if g_end == 0.0 {
        return Ok((end, g_end));
    }

    // Offsets in seconds from the start epoch, negative when propagating backward.
    let (mut xa, mut fa) = (0.0, g_start);
    let (mut xb, mut fb) = ((end - start).to_seconds(), g_end);
    let mut gb = g_end;
    // Which end was retained in the previous iteration: -1 for `a`, +1 for `b`
    let mut retained = 0;
    let mut bisect = false;

    for iteration in 0..=max_iterations {
        let width = (xb - xa).abs();
        if width <= threshold_s {
            debug!(
                "root of {event} isolated within {} after {iteration} iterations",
                width * Unit::Second
            );
            return Ok((start + xb * Unit::Second, gb));
        }
        if iteration == max_iterations {
            break;
        }

        let (lo, hi) = if xa < xb { (xa, xb) } else { (xb, xa) };
        let margin = (threshold_s / 2.0).min(width / 4.0);
        let x = if bisect {
            0.5 * (xa + xb)
        } else {
            let candidate = xb - fb * (xb - xa) / (fb - fa);
            if candidate.is_finite() {
                candidate.clamp(lo + margin, hi - margin)
            } else {
                0.5 * (xa + xb)
            }
        };

        let g = event
            .eval(&model.at(start + x * Unit::Second)?)
            .context(PropEventSnafu)?;

        if g == 0.0 {
            debug!("exact root of {event} found after {iteration} iterations");
            return Ok((start + x * Unit::Second, g));
        }

        if g.signum() == gb.signum() {
            xb = x;
            fb = g;
            gb = g;
            if retained == -1 {
                fa /= 2.0;
            }
            retained = -1;
        } else {
            xa = x;
            fa = g;
            if retained == 1 {
                fb /= 2.0;
            }
            retained = 1;
        }

        bisect = (xb - xa).abs() > 0.5 * width;
    }

    error!(
        "could not isolate root of {event} within {max_iterations} iterations between {} and {}",
        start + xa * Unit::Second,
        start + xb * Unit::Second
    );
    Err(PropagationError::RootNotFound {
        event: format!("{event}"),
        start: start + xa * Unit::Second,
        end: start + xb * Unit::Second,
        iterations: max_iterations,
    })
}
