use crate::error::FeedError;
use crate::events::FeedTicket;
use crate::slide::Post;

/// Starts feed fetches on behalf of the controller.
///
/// `request` must not block. The result comes back later as a
/// [`FeedDelivery`](crate::events::FeedDelivery) carrying the same ticket.
pub trait FeedSource {
    fn request(&mut self, ticket: FeedTicket);
}

/// Parses a feed response body.
pub fn decode_feed(body: &[u8]) -> Result<Vec<Post>, FeedError> {
    Ok(serde_json::from_slice(body)?)
}
