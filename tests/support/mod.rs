#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use feed_slideshow::container::Container;
use feed_slideshow::controller::{SlideshowController, Timings};
use feed_slideshow::error::FeedError;
use feed_slideshow::events::{FeedDelivery, FeedTicket};
use feed_slideshow::feed::FeedSource;
use feed_slideshow::fullscreen::{FullscreenApi, FullscreenTarget};
use feed_slideshow::schedule::{Scheduler, Timer, TimerId};
use feed_slideshow::slide::{Post, Slide};

/// Scheduler on a virtual clock; tests move time with [`advance`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    armed: BTreeMap<TimerId, (Duration, Timer)>,
}

impl ManualScheduler {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.armed.len()
    }

    pub fn pending_of(&self, timer: Timer) -> usize {
        self.armed.values().filter(|(_, t)| *t == timer).count()
    }

    /// Removes the earliest timer due by `deadline` and moves the clock to it.
    /// Ties fire in arming order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TimerId, Timer)> {
        let (&id, &(due, timer)) = self
            .armed
            .iter()
            .filter(|(_, (due, _))| *due <= deadline)
            .min_by_key(|(id, (due, _))| (*due, **id))?;
        self.armed.remove(&id);
        self.now = due;
        Some((id, timer))
    }

    pub fn set_now(&mut self, now: Duration) {
        self.now = now;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, timer: Timer, after: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.armed.insert(id, (self.now + after, timer));
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.armed.remove(&id).is_some()
    }
}

/// Container that remembers everything it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingContainer {
    pub shown: Vec<String>,
    pub current: Option<Slide>,
    pub clears: usize,
    pub fullscreen_apis: Vec<FullscreenApi>,
    pub fullscreen_requests: Vec<FullscreenApi>,
}

impl RecordingContainer {
    pub fn with_fullscreen(apis: &[FullscreenApi]) -> Self {
        Self {
            fullscreen_apis: apis.to_vec(),
            ..Self::default()
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.source_url.as_str())
    }
}

impl Container for RecordingContainer {
    fn set_sole_content(&mut self, slide: &Slide) {
        self.shown.push(slide.source_url.clone());
        self.current = Some(slide.clone());
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.current = None;
    }
}

impl FullscreenTarget for RecordingContainer {
    fn supports(&self, api: FullscreenApi) -> bool {
        self.fullscreen_apis.contains(&api)
    }

    fn request_fullscreen(&mut self, api: FullscreenApi) {
        self.fullscreen_requests.push(api);
    }
}

/// Feed source that only records requests; tests deliver by hand.
#[derive(Debug, Default)]
pub struct RecordingFeed {
    pub tickets: Vec<FeedTicket>,
}

impl FeedSource for RecordingFeed {
    fn request(&mut self, ticket: FeedTicket) {
        self.tickets.push(ticket);
    }
}

pub type TestController = SlideshowController<ManualScheduler, RecordingContainer, RecordingFeed>;

pub fn timings(switch_ms: u64, feed_ms: u64, reload_ms: Option<u64>) -> Timings {
    Timings {
        image_switch: Duration::from_millis(switch_ms),
        feed_refresh: Duration::from_millis(feed_ms),
        document_refresh: reload_ms.map(Duration::from_millis),
    }
}

pub fn controller(timings: Timings) -> TestController {
    controller_with(timings, RecordingContainer::default())
}

pub fn controller_with(timings: Timings, container: RecordingContainer) -> TestController {
    SlideshowController::new(
        timings,
        ManualScheduler::default(),
        container,
        RecordingFeed::default(),
    )
}

pub fn posts(ids: &[&str]) -> Vec<Post> {
    ids.iter().map(|id| Post::new(*id)).collect()
}

fn latest_ticket(ctrl: &TestController) -> FeedTicket {
    *ctrl
        .feed()
        .tickets
        .last()
        .expect("controller never requested the feed")
}

/// Answers the most recent feed request with `posts`.
pub fn deliver(ctrl: &mut TestController, posts: Vec<Post>) {
    let ticket = latest_ticket(ctrl);
    ctrl.on_feed(FeedDelivery {
        ticket,
        outcome: Ok(posts),
    });
}

/// Fails the most recent feed request.
pub fn fail(ctrl: &mut TestController, err: FeedError) {
    let ticket = latest_ticket(ctrl);
    ctrl.on_feed(FeedDelivery {
        ticket,
        outcome: Err(err),
    });
}

/// Fires every timer due within `by`, in order, then parks the clock at the end.
pub fn advance(ctrl: &mut TestController, by: Duration) {
    let deadline = ctrl.scheduler().now() + by;
    while let Some((id, timer)) = ctrl.scheduler_mut().pop_due(deadline) {
        ctrl.on_timer(id, timer);
    }
    ctrl.scheduler_mut().set_now(deadline);
}
