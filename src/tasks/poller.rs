use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc::Sender;
use tracing::debug;

use crate::error::FeedError;
use crate::events::{FeedDelivery, FeedTicket};
use crate::feed::{FeedSource, decode_feed};
use crate::slide::Post;

/// HTTP client shared by the feed poller and the image loader.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("feed-slideshow/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// `GET url` and parse the body as a post list.
pub async fn fetch_feed(client: &Client, url: &str) -> Result<Vec<Post>, FeedError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }
    let body = response.bytes().await?;
    decode_feed(&body)
}

/// [`FeedSource`] that fetches over HTTP, one spawned task per request.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: Client,
    url: String,
    deliveries: Sender<FeedDelivery>,
}

impl HttpFeed {
    pub fn new(client: Client, url: impl Into<String>, deliveries: Sender<FeedDelivery>) -> Self {
        Self {
            client,
            url: url.into(),
            deliveries,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedSource for HttpFeed {
    fn request(&mut self, ticket: FeedTicket) {
        let client = self.client.clone();
        let url = self.url.clone();
        let deliveries = self.deliveries.clone();
        tokio::spawn(async move {
            let outcome = fetch_feed(&client, &url).await;
            debug!(url, ok = outcome.is_ok(), "feed fetch finished");
            if deliveries
                .send(FeedDelivery { ticket, outcome })
                .await
                .is_err()
            {
                debug!("controller gone; dropping feed delivery");
            }
        });
    }
}
