use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::container::Container;
use crate::controller::SlideshowController;
use crate::events::{ControlCommand, FeedDelivery};
use crate::feed::FeedSource;
use crate::fullscreen::FullscreenTarget;
use crate::schedule::TimerQueue;

/// Drives the controller until `cancel` fires, then stops it and hands it back.
///
/// Everything that mutates the controller runs on this one task: expired
/// timers, feed deliveries and control commands are taken one at a time.
pub async fn run<C, F>(
    mut controller: SlideshowController<TimerQueue, C, F>,
    mut feed_rx: Receiver<FeedDelivery>,
    mut commands: Receiver<ControlCommand>,
    cancel: CancellationToken,
) -> Result<SlideshowController<TimerQueue, C, F>>
where
    C: Container + FullscreenTarget,
    F: FeedSource,
{
    controller.start();

    loop {
        select! {
            _ = cancel.cancelled() => break,

            Some((id, timer)) = controller.scheduler_mut().next_expired() => {
                debug!(?timer, "timer fired");
                controller.on_timer(id, timer);
            }

            Some(delivery) = feed_rx.recv() => {
                controller.on_feed(delivery);
            }

            Some(command) = commands.recv() => {
                match command {
                    ControlCommand::Click => {
                        controller.on_click();
                    }
                    ControlCommand::Reload => controller.reload(),
                }
            }
        }
    }

    controller.stop();
    info!("slideshow driver exiting");
    Ok(controller)
}
