mod support;

use std::collections::VecDeque;
use std::time::Duration;

use feed_slideshow::controller::SlideshowController;
use feed_slideshow::events::{ControlCommand, FeedDelivery, FeedTicket};
use feed_slideshow::feed::FeedSource;
use feed_slideshow::fullscreen::FullscreenApi;
use feed_slideshow::rotation::RotationState;
use feed_slideshow::schedule::TimerQueue;
use feed_slideshow::slide::Post;
use feed_slideshow::tasks::slideshow;
use support::{RecordingContainer, posts, timings};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Answers each request immediately with the next canned post list.
struct ReplyingFeed {
    deliveries: mpsc::Sender<FeedDelivery>,
    replies: VecDeque<Vec<Post>>,
    requests: Vec<FeedTicket>,
}

impl FeedSource for ReplyingFeed {
    fn request(&mut self, ticket: FeedTicket) {
        self.requests.push(ticket);
        let posts = self.replies.pop_front().unwrap_or_default();
        self.deliveries
            .try_send(FeedDelivery {
                ticket,
                outcome: Ok(posts),
            })
            .expect("delivery channel full");
    }
}

fn replying_feed(
    replies: Vec<Vec<Post>>,
) -> (ReplyingFeed, mpsc::Receiver<FeedDelivery>) {
    let (tx, rx) = mpsc::channel(16);
    let feed = ReplyingFeed {
        deliveries: tx,
        replies: replies.into(),
        requests: Vec::new(),
    };
    (feed, rx)
}

#[tokio::test(start_paused = true)]
async fn driver_rotates_on_the_tokio_clock() {
    let (feed, feed_rx) = replying_feed(vec![posts(&["a", "b"])]);
    let (_command_tx, command_rx) = mpsc::channel(4);
    let cancel = CancellationToken::new();
    let controller = SlideshowController::new(
        timings(1_000, 60_000, None),
        TimerQueue::new(),
        RecordingContainer::default(),
        feed,
    );

    let handle = tokio::spawn(slideshow::run(
        controller,
        feed_rx,
        command_rx,
        cancel.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    cancel.cancel();
    let controller = handle.await.unwrap().unwrap();

    assert_eq!(
        controller.container().shown,
        ["/image/a", "/image/b", "/image/a"]
    );
    assert!(!controller.is_running());
    assert_eq!(controller.scheduler().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn commands_click_and_reload() {
    let (feed, feed_rx) = replying_feed(vec![posts(&["a", "b"]), posts(&["c"])]);
    let (command_tx, command_rx) = mpsc::channel(4);
    let cancel = CancellationToken::new();
    let controller = SlideshowController::new(
        timings(1_000, 60_000, Some(3_600_000)),
        TimerQueue::new(),
        RecordingContainer::with_fullscreen(&[FullscreenApi::Standard, FullscreenApi::Moz]),
        feed,
    );

    let handle = tokio::spawn(slideshow::run(
        controller,
        feed_rx,
        command_rx,
        cancel.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(500)).await;
    command_tx.send(ControlCommand::Click).await.unwrap();
    command_tx.send(ControlCommand::Reload).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    cancel.cancel();
    let controller = handle.await.unwrap().unwrap();

    let container = controller.container();
    assert_eq!(container.fullscreen_requests, [FullscreenApi::Standard]);
    assert_eq!(container.clears, 1);
    assert_eq!(container.shown, ["/image/a", "/image/c", "/image/c"]);
    assert_eq!(controller.session(), 2);
    assert_eq!(controller.feed().requests.len(), 2);
    assert_eq!(controller.rotation_state(), &RotationState::Idle);
}
