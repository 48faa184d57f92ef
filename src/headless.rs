//! Container for kiosks without a browser: tracks the shown slide and hands
//! its image to the loader.

use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::container::Container;
use crate::events::LoadImage;
use crate::fullscreen::{FullscreenApi, FullscreenTarget};
use crate::slide::{CONTAINER_ELEMENT_ID, Slide};

#[derive(Debug)]
pub struct HeadlessContainer {
    current: Option<Slide>,
    fullscreen_apis: Vec<FullscreenApi>,
    fullscreen: Option<FullscreenApi>,
    to_loader: Option<Sender<LoadImage>>,
}

impl HeadlessContainer {
    pub fn new(fullscreen_apis: Vec<FullscreenApi>) -> Self {
        Self {
            current: None,
            fullscreen_apis,
            fullscreen: None,
            to_loader: None,
        }
    }

    /// Forward every newly shown image to the loader.
    pub fn with_loader(mut self, to_loader: Sender<LoadImage>) -> Self {
        self.to_loader = Some(to_loader);
        self
    }

    pub fn current(&self) -> Option<&Slide> {
        self.current.as_ref()
    }

    /// Capability that put the display into fullscreen, if any.
    pub fn fullscreen(&self) -> Option<FullscreenApi> {
        self.fullscreen
    }

    fn forward(&self, url: &str) {
        let Some(to_loader) = &self.to_loader else {
            return;
        };
        match to_loader.try_send(LoadImage(url.to_string())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!(url, "loader busy; skipping image"),
            Err(TrySendError::Closed(_)) => warn!(url, "image loader is gone"),
        }
    }
}

impl Container for HeadlessContainer {
    fn set_sole_content(&mut self, slide: &Slide) {
        let changed = self
            .current
            .as_ref()
            .is_none_or(|shown| shown.source_url != slide.source_url);
        if changed {
            self.forward(&slide.source_url);
        }
        debug!(
            container = CONTAINER_ELEMENT_ID,
            element = slide.element_id,
            url = %slide.source_url,
            "container content replaced"
        );
        self.current = Some(slide.clone());
    }

    fn clear(&mut self) {
        debug!(container = CONTAINER_ELEMENT_ID, "container cleared");
        self.current = None;
    }
}

impl FullscreenTarget for HeadlessContainer {
    fn supports(&self, api: FullscreenApi) -> bool {
        self.fullscreen_apis.contains(&api)
    }

    fn request_fullscreen(&mut self, api: FullscreenApi) {
        info!(%api, "entering fullscreen");
        self.fullscreen = Some(api);
    }
}
