use crate::error::FeedError;
use crate::slide::Post;

/// Identifies the controller session a feed request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTicket {
    pub session: u64,
}

/// Outcome of one feed request, handed back to the controller.
#[derive(Debug)]
pub struct FeedDelivery {
    pub ticket: FeedTicket,
    pub outcome: Result<Vec<Post>, FeedError>,
}

/// Requests from outside the timer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// A click on the container.
    Click,
    /// Reload now instead of waiting for the document refresh timer.
    Reload,
}

/// Ask the loader to fetch and decode a slide image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadImage(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLoaded {
    pub url: String,
    pub width: u32,
    pub height: u32,
}
