use crate::slide::Slide;

/// The single element the slideshow renders into.
pub trait Container {
    /// Makes `slide` the container's only content, replacing whatever was shown.
    fn set_sole_content(&mut self, slide: &Slide);

    /// Removes any content.
    fn clear(&mut self);
}
