//! Fullscreen request with fallback across vendor-prefixed capabilities.

use std::fmt;

use serde::Deserialize;

/// One way of asking the host to enter fullscreen presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FullscreenApi {
    Standard,
    Moz,
    Webkit,
    Ms,
}

impl FullscreenApi {
    /// Probe order: the standard capability first, then vendor prefixes.
    pub const PROBE_ORDER: [Self; 4] = [Self::Standard, Self::Moz, Self::Webkit, Self::Ms];

    /// Method name the capability is exposed under on a document element.
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Standard => "requestFullscreen",
            Self::Moz => "mozRequestFullScreen",
            Self::Webkit => "webkitRequestFullscreen",
            Self::Ms => "msRequestFullscreen",
        }
    }
}

impl fmt::Display for FullscreenApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Something that can be asked to go fullscreen.
pub trait FullscreenTarget {
    fn supports(&self, api: FullscreenApi) -> bool;
    fn request_fullscreen(&mut self, api: FullscreenApi);
}

/// Invokes the first capability `target` supports, in [`FullscreenApi::PROBE_ORDER`].
///
/// Returns the capability used, or `None` when the target supports none of them.
pub fn request_fullscreen_compat<T>(target: &mut T) -> Option<FullscreenApi>
where
    T: FullscreenTarget + ?Sized,
{
    let api = FullscreenApi::PROBE_ORDER
        .into_iter()
        .find(|api| target.supports(*api))?;
    target.request_fullscreen(api);
    Some(api)
}
