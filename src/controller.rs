//! The slideshow controller: feed polling, rotation, fullscreen and reloads.
//!
//! The controller performs no I/O of its own. Timers go through a
//! [`Scheduler`], feed fetches through a [`FeedSource`], and display through a
//! [`Container`]. A driver feeds fired timers, feed deliveries and clicks back
//! in via [`SlideshowController::on_timer`], [`SlideshowController::on_feed`]
//! and [`SlideshowController::on_click`].

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::container::Container;
use crate::events::{FeedDelivery, FeedTicket};
use crate::feed::FeedSource;
use crate::fullscreen::{FullscreenApi, FullscreenTarget, request_fullscreen_compat};
use crate::rotation::{RotationLoop, RotationState};
use crate::schedule::{Scheduler, Timer, TimerId};
use crate::slide::{Slide, SlideSet};

pub const IMAGE_SWITCH_INTERVAL_MS: u64 = 1_000;
pub const FEED_REFRESH_INTERVAL_MS: u64 = 10 * 60 * 1_000;
pub const DOCUMENT_REFRESH_INTERVAL_MS: u64 = 4 * 60 * 60 * 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub image_switch: Duration,
    pub feed_refresh: Duration,
    /// `None` disables the periodic reload.
    pub document_refresh: Option<Duration>,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            image_switch: Duration::from_millis(IMAGE_SWITCH_INTERVAL_MS),
            feed_refresh: Duration::from_millis(FEED_REFRESH_INTERVAL_MS),
            document_refresh: Some(Duration::from_millis(DOCUMENT_REFRESH_INTERVAL_MS)),
        }
    }
}

pub struct SlideshowController<S, C, F> {
    timings: Timings,
    scheduler: S,
    container: C,
    feed: F,
    rotation: RotationLoop,
    session: u64,
    running: bool,
    feed_timer: Option<TimerId>,
    reload_timer: Option<TimerId>,
}

impl<S, C, F> SlideshowController<S, C, F>
where
    S: Scheduler,
    C: Container + FullscreenTarget,
    F: FeedSource,
{
    pub fn new(timings: Timings, scheduler: S, container: C, feed: F) -> Self {
        Self {
            rotation: RotationLoop::new(timings.image_switch),
            timings,
            scheduler,
            container,
            feed,
            session: 0,
            running: false,
            feed_timer: None,
            reload_timer: None,
        }
    }

    /// Opens a new session: polls the feed right away and arms the refresh timers.
    ///
    /// Calling `start` on a running controller does nothing.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.session += 1;
        info!(
            session = self.session,
            switch = %humantime::format_duration(self.timings.image_switch),
            feed_refresh = %humantime::format_duration(self.timings.feed_refresh),
            "slideshow started"
        );
        self.poll_feed();
        self.feed_timer = Some(
            self.scheduler
                .schedule(Timer::FeedRefresh, self.timings.feed_refresh),
        );
        self.reload_timer = self
            .timings
            .document_refresh
            .map(|every| self.scheduler.schedule(Timer::DocumentReload, every));
    }

    /// Cancels every timer and stops rotating. The container keeps its content.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.rotation.halt(&mut self.scheduler);
        for id in [self.feed_timer.take(), self.reload_timer.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(id);
        }
        info!(session = self.session, "slideshow stopped");
    }

    /// Discards all state and starts over, as a page reload would.
    pub fn reload(&mut self) {
        info!(session = self.session, "reloading slideshow");
        self.stop();
        self.container.clear();
        self.start();
    }

    /// Dispatches a fired timer.
    pub fn on_timer(&mut self, id: TimerId, timer: Timer) {
        match timer {
            Timer::RotationTick => {
                self.rotation
                    .tick(id, &mut self.scheduler, &mut self.container);
            }
            Timer::FeedRefresh => {
                if self.feed_timer != Some(id) {
                    debug!(timer = ?id, "ignoring stale feed refresh");
                    return;
                }
                self.poll_feed();
                self.feed_timer = Some(
                    self.scheduler
                        .schedule(Timer::FeedRefresh, self.timings.feed_refresh),
                );
            }
            Timer::DocumentReload => {
                if self.reload_timer != Some(id) {
                    debug!(timer = ?id, "ignoring stale document reload");
                    return;
                }
                self.reload_timer = None;
                self.reload();
            }
        }
    }

    /// Installs the slides from a successful fetch.
    ///
    /// Failed fetches, empty feeds and deliveries for an earlier session leave
    /// the current rotation as it is.
    pub fn on_feed(&mut self, delivery: FeedDelivery) {
        if !self.running || delivery.ticket.session != self.session {
            debug!(
                ticket = delivery.ticket.session,
                session = self.session,
                "discarding feed delivery from a closed session"
            );
            return;
        }
        let posts = match delivery.outcome {
            Ok(posts) => posts,
            Err(err) => {
                warn!(error = %err, "feed fetch failed; keeping current slides");
                return;
            }
        };
        let slides = SlideSet::from_posts(&posts);
        if self
            .rotation
            .install(slides, &mut self.scheduler, &mut self.container)
        {
            info!(count = posts.len(), "installed new slide set");
        } else {
            warn!("feed returned no posts; keeping current slides");
        }
    }

    /// Handles a click on the container by requesting fullscreen.
    pub fn on_click(&mut self) -> Option<FullscreenApi> {
        info!("attempting full screen");
        let api = request_fullscreen_compat(&mut self.container);
        match api {
            Some(api) => debug!(%api, "fullscreen requested"),
            None => debug!("no fullscreen capability available"),
        }
        api
    }

    fn poll_feed(&mut self) {
        debug!(session = self.session, "polling feed");
        self.feed.request(FeedTicket {
            session: self.session,
        });
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn rotation_state(&self) -> &RotationState {
        self.rotation.state()
    }

    pub fn displayed_index(&self) -> Option<usize> {
        self.rotation.displayed_index()
    }

    pub fn displayed_slide(&self) -> Option<&Slide> {
        self.rotation.displayed()
    }

    pub fn pending_rotation_timer(&self) -> Option<TimerId> {
        self.rotation.pending_timer()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }
}
