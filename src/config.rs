use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use reqwest::Url;
use serde::Deserialize;

use crate::controller::{
    DOCUMENT_REFRESH_INTERVAL_MS, FEED_REFRESH_INTERVAL_MS, IMAGE_SWITCH_INTERVAL_MS, Timings,
};
use crate::fullscreen::FullscreenApi;
use crate::schedule::MAX_DELAY;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Base URL of the server hosting `/feed` and `/image/{id}`.
    pub server_url: String,
    /// Path of the feed endpoint relative to `server-url`.
    pub feed_path: String,
    /// Time each slide stays on screen.
    #[serde(with = "humantime_serde")]
    pub image_switch_interval: Duration,
    /// How often the feed is fetched again.
    #[serde(with = "humantime_serde")]
    pub feed_refresh_interval: Duration,
    /// How often everything is torn down and restarted; `null` disables.
    #[serde(with = "humantime_serde")]
    pub document_refresh_interval: Option<Duration>,
    /// Timeout applied to every HTTP request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Fullscreen capabilities the display supports.
    pub fullscreen_apis: Vec<FullscreenApi>,
    /// Fetch and decode each slide's image when it is shown.
    pub prefetch_images: bool,
    /// Maximum number of image fetches in flight.
    pub loader_max_concurrent_fetches: usize,
    /// How many decoded image paths the loader remembers and skips.
    pub loader_remembered_images: usize,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Rejects unusable URLs, zero or over-long intervals and an empty loader.
    pub fn validated(self) -> Result<Self> {
        let url = self.server_base()?;
        ensure!(
            matches!(url.scheme(), "http" | "https"),
            "server-url must use http or https"
        );
        ensure!(
            self.feed_path.starts_with('/'),
            "feed-path must start with '/'"
        );
        let intervals = [
            ("image-switch-interval", Some(self.image_switch_interval)),
            ("feed-refresh-interval", Some(self.feed_refresh_interval)),
            ("document-refresh-interval", self.document_refresh_interval),
            ("request-timeout", Some(self.request_timeout)),
        ];
        for (key, value) in intervals {
            let Some(value) = value else { continue };
            ensure!(!value.is_zero(), "{key} must be greater than zero");
            ensure!(
                value <= MAX_DELAY,
                "{key} must not exceed {}",
                humantime::format_duration(MAX_DELAY)
            );
        }
        ensure!(
            self.loader_max_concurrent_fetches > 0,
            "loader-max-concurrent-fetches must be greater than zero"
        );
        ensure!(
            self.loader_remembered_images > 0,
            "loader-remembered-images must be greater than zero"
        );
        Ok(self)
    }

    pub fn server_base(&self) -> Result<Url> {
        Url::parse(&self.server_url)
            .with_context(|| format!("server-url {:?} is not a valid URL", self.server_url))
    }

    /// Absolute URL of the feed endpoint.
    pub fn feed_url(&self) -> String {
        self.resolve(&self.feed_path)
    }

    /// Absolute URL for a server-relative path such as a slide's source.
    pub fn resolve(&self, path: &str) -> String {
        join_url(&self.server_url, path)
    }

    pub fn timings(&self) -> Timings {
        Timings {
            image_switch: self.image_switch_interval,
            feed_refresh: self.feed_refresh_interval,
            document_refresh: self.document_refresh_interval,
        }
    }
}

/// Appends a server-relative `path` to `base` without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080/".to_string(),
            feed_path: "/feed".to_string(),
            image_switch_interval: Duration::from_millis(IMAGE_SWITCH_INTERVAL_MS),
            feed_refresh_interval: Duration::from_millis(FEED_REFRESH_INTERVAL_MS),
            document_refresh_interval: Some(Duration::from_millis(DOCUMENT_REFRESH_INTERVAL_MS)),
            request_timeout: Duration::from_secs(30),
            fullscreen_apis: vec![FullscreenApi::Standard],
            prefetch_images: true,
            loader_max_concurrent_fetches: 2,
            loader_remembered_images: 32,
        }
    }
}
