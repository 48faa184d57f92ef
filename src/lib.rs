//! Kiosk slideshow: polls an image feed, rotates its slides on a fixed
//! interval, goes fullscreen on click and periodically starts over.

pub mod config;
pub mod container;
pub mod controller;
pub mod error;
pub mod events;
pub mod feed;
pub mod fullscreen;
pub mod headless;
pub mod rotation;
pub mod schedule;
pub mod slide;
pub mod tasks {
    pub mod loader;
    pub mod poller;
    pub mod slideshow;
}
