//! Conversion configuration.
//!
//! The field tag decides how struct fields are named on the script side. It
//! is an explicit value carried by a [`Converter`] and copied into every
//! wrapper the converter creates, so nested structs reached through a wrapper
//! use the same tag as the top-level call.

use std::fmt;
use std::sync::Arc;

/// Tag key consulted when none is configured.
pub const DEFAULT_TAG: &str = "script";

/// Name of the struct tag key used to rename or hide fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag(Arc<str>);

impl Tag {
    /// An empty name falls back to [`DEFAULT_TAG`].
    pub fn new(name: &str) -> Self {
        if name.is_empty() {
            Tag::default()
        } else {
            Tag(Arc::from(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Tag(Arc::from(DEFAULT_TAG))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry point for host-to-script conversions.
///
/// ```text
/// let converter = Converter::with_tag("json");
/// let ns = converter.make_namespace([("contact", contact)])?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct Converter {
    pub(crate) tag: Tag,
}

impl Converter {
    /// Converter using [`DEFAULT_TAG`].
    pub fn new() -> Self {
        Converter::default()
    }

    pub fn with_tag(tag: &str) -> Self {
        Converter { tag: Tag::new(tag) }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub(crate) fn ctx(&self) -> WrapCtx {
        WrapCtx {
            tag: self.tag.clone(),
            frozen: false,
        }
    }
}

/// State a wrapper is created with: the tag it propagates and whether it
/// starts out frozen (children of a frozen wrapper do).
#[derive(Clone, Debug)]
pub(crate) struct WrapCtx {
    pub(crate) tag: Tag,
    pub(crate) frozen: bool,
}

impl WrapCtx {
    pub(crate) fn child(&self, frozen: bool) -> WrapCtx {
        WrapCtx {
            tag: self.tag.clone(),
            frozen,
        }
    }
}
