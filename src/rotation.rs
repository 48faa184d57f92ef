//! Fixed-interval rotation through the current slide set.

use std::time::Duration;

use tracing::debug;

use crate::container::Container;
use crate::schedule::{Scheduler, Timer, TimerId};
use crate::slide::{Slide, SlideSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationState {
    /// No slide set installed, nothing displayed.
    Idle,
    /// Rotating through `slides`; `cursor` counts ticks since installation.
    Cycling {
        slides: SlideSet,
        cursor: u64,
        pending: Option<TimerId>,
    },
}

/// Shows one slide at a time and advances every `interval`.
///
/// At most one switch timer is armed at any time: every transition cancels
/// the pending one before arming the next.
#[derive(Debug)]
pub struct RotationLoop {
    state: RotationState,
    interval: Duration,
}

impl RotationLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: RotationState::Idle,
            interval,
        }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Index into the installed set of the slide on display.
    pub fn displayed_index(&self) -> Option<usize> {
        match &self.state {
            RotationState::Cycling { slides, cursor, .. } if !slides.is_empty() => {
                Some((*cursor % slides.len() as u64) as usize)
            }
            _ => None,
        }
    }

    pub fn displayed(&self) -> Option<&Slide> {
        match &self.state {
            RotationState::Cycling { slides, cursor, .. } => slides.cyclic(*cursor),
            RotationState::Idle => None,
        }
    }

    /// The armed switch timer, if any.
    pub fn pending_timer(&self) -> Option<TimerId> {
        match &self.state {
            RotationState::Cycling { pending, .. } => *pending,
            RotationState::Idle => None,
        }
    }

    /// Replaces the slide set and restarts from its first slide.
    ///
    /// An empty set is refused and the current rotation is left untouched.
    /// Returns whether the set was installed.
    pub fn install<S, C>(&mut self, slides: SlideSet, scheduler: &mut S, container: &mut C) -> bool
    where
        S: Scheduler + ?Sized,
        C: Container + ?Sized,
    {
        if slides.is_empty() {
            return false;
        }
        self.cancel_pending(scheduler);
        self.state = RotationState::Cycling {
            slides,
            cursor: 0,
            pending: None,
        };
        self.show_and_arm(scheduler, container);
        true
    }

    /// Handles a fired switch timer. Timers other than the pending one are ignored.
    pub fn tick<S, C>(&mut self, fired: TimerId, scheduler: &mut S, container: &mut C)
    where
        S: Scheduler + ?Sized,
        C: Container + ?Sized,
    {
        let RotationState::Cycling {
            cursor, pending, ..
        } = &mut self.state
        else {
            debug!(timer = ?fired, "rotation tick while idle");
            return;
        };
        if *pending != Some(fired) {
            debug!(timer = ?fired, "ignoring stale rotation tick");
            return;
        }
        *pending = None;
        *cursor = cursor.wrapping_add(1);
        self.show_and_arm(scheduler, container);
    }

    /// Cancels the pending timer and returns to idle. The container is left as is.
    pub fn halt<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        self.cancel_pending(scheduler);
        self.state = RotationState::Idle;
    }

    fn cancel_pending<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        if let RotationState::Cycling { pending, .. } = &mut self.state {
            if let Some(id) = pending.take() {
                scheduler.cancel(id);
            }
        }
    }

    fn show_and_arm<S, C>(&mut self, scheduler: &mut S, container: &mut C)
    where
        S: Scheduler + ?Sized,
        C: Container + ?Sized,
    {
        let interval = self.interval;
        let RotationState::Cycling {
            slides,
            cursor,
            pending,
        } = &mut self.state
        else {
            return;
        };
        if let Some(old) = pending.take() {
            scheduler.cancel(old);
        }
        let Some(slide) = slides.cyclic(*cursor) else {
            return;
        };
        debug!(
            cursor = *cursor,
            len = slides.len(),
            url = %slide.source_url,
            "showing slide"
        );
        container.set_sole_content(slide);
        *pending = Some(scheduler.schedule(Timer::RotationTick, interval));
    }
}
