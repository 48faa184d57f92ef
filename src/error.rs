use thiserror::Error;

/// Why a feed fetch produced no posts.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request never produced a response.
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("feed endpoint returned HTTP {0}")]
    Status(u16),

    /// The body is not a JSON array of posts.
    #[error("feed body is not a post list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Why a displayed slide's image could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] reqwest::Error),

    #[error("image endpoint returned HTTP {0}")]
    Status(u16),

    #[error(transparent)]
    Decode(#[from] image::ImageError),

    #[error("decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
