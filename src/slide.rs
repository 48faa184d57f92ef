//! Posts as delivered by the feed endpoint and the slides built from them.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::Deserialize;

/// Path prefix of the image endpoint; a post id is appended verbatim.
pub const IMAGE_PATH_PREFIX: &str = "/image/";
/// Element id carried by whichever slide is currently shown.
pub const CURRENT_SLIDE_ELEMENT_ID: &str = "current-slide";
/// Element id of the container the slideshow renders into.
pub const CONTAINER_ELEMENT_ID: &str = "content";

/// Opaque post identifier. The feed may send either a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// One record of the feed. Everything but `id` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: PostId,
}

impl Post {
    pub fn new(id: impl Into<PostId>) -> Self {
        Self { id: id.into() }
    }
}

/// Displayable reference to a post's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub source_url: String,
    pub element_id: &'static str,
}

/// Builds the slide for `post`. The id is interpolated into the path as-is.
pub fn build_slide(post: &Post) -> Slide {
    Slide {
        source_url: format!("{IMAGE_PATH_PREFIX}{}", post.id),
        element_id: CURRENT_SLIDE_ELEMENT_ID,
    }
}

/// Immutable, ordered set of slides produced by one feed fetch.
///
/// Clones share the underlying storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSet {
    slides: Arc<[Slide]>,
}

impl SlideSet {
    /// Builds one slide per post, keeping feed order.
    pub fn from_posts(posts: &[Post]) -> Self {
        posts.iter().map(build_slide).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slide at `cursor` wrapped against this set's length.
    ///
    /// Returns `None` only for an empty set.
    #[must_use]
    pub fn cyclic(&self, cursor: u64) -> Option<&Slide> {
        let len = self.slides.len() as u64;
        if len == 0 {
            return None;
        }
        self.slides.get((cursor % len) as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slide> {
        self.slides.iter()
    }
}

impl FromIterator<Slide> for SlideSet {
    fn from_iter<I: IntoIterator<Item = Slide>>(iter: I) -> Self {
        Self {
            slides: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for SlideSet {
    type Output = Slide;

    fn index(&self, index: usize) -> &Self::Output {
        &self.slides[index]
    }
}
