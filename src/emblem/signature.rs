//! Emblem signatures
//!
//! An emblem shows at most [`MAX_EMBLEM_COLORS`] circles. Longer color lists
//! keep only their tail, so callers put the most relevant color last. The
//! signature is the kept colors, `#` stripped and lowercased, joined by `-`:
//!
//! ```
//! use emblemtags::emblem::Signature;
//!
//! let sig = Signature::from_colors(&["#FF0000", "#00FF00", "#0000FF", "#123456"]).unwrap();
//! assert_eq!(sig.as_str(), "00ff00-0000ff-123456");
//! assert_eq!(sig.emblem_name(), "tag-emblem-00ff00-0000ff-123456");
//! ```

use std::fmt;

/// Most circles drawn on one emblem
pub const MAX_EMBLEM_COLORS: usize = 3;

/// Common prefix of every emblem icon name
pub const EMBLEM_PREFIX: &str = "tag-emblem";

/// File extension of emblem images
pub const EMBLEM_EXTENSION: &str = "svg";

/// The colors that end up on an emblem for `colors`
#[must_use]
pub fn truncate_colors<S>(colors: &[S]) -> &[S] {
    if colors.len() > MAX_EMBLEM_COLORS {
        &colors[colors.len() - MAX_EMBLEM_COLORS..]
    } else {
        colors
    }
}

/// Signature component for one color: `#` removed, lowercase
#[must_use]
pub fn color_component(color: &str) -> String {
    color.replace('#', "").to_ascii_lowercase()
}

/// Deterministic key of an emblem
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    /// Builds the signature for an ordered color list
    ///
    /// Returns `None` for an empty list; there is nothing to draw.
    #[must_use]
    pub fn from_colors<S: AsRef<str>>(colors: &[S]) -> Option<Self> {
        let kept = truncate_colors(colors);
        if kept.is_empty() {
            return None;
        }

        let parts: Vec<String> = kept.iter().map(|c| color_component(c.as_ref())).collect();
        Some(Self(parts.join("-")))
    }

    /// Signature of a single-color emblem
    #[must_use]
    pub fn single(color: &str) -> Self {
        Self(color_component(color))
    }

    /// Recovers the signature from an emblem icon name or file stem
    #[must_use]
    pub fn from_emblem_name(name: &str) -> Option<Self> {
        name.strip_prefix(EMBLEM_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|sig| Self(sig.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Icon name registered with the toolkit, e.g. `tag-emblem-ff0000`
    #[must_use]
    pub fn emblem_name(&self) -> String {
        format!("{EMBLEM_PREFIX}-{}", self.0)
    }

    /// File name of the emblem image
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{EMBLEM_EXTENSION}", self.emblem_name())
    }

    /// Whether this emblem includes `color` (substring match on the signature)
    #[must_use]
    pub fn contains_color(&self, color: &str) -> bool {
        let component = color_component(color);
        !component.is_empty() && self.0.contains(&component)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
