//! CSS for exported pages.
//!
//! Styles are assembled through [`StyleConfig`]'s builder API, combining
//! compile-time embedded builtins (such as `catalog.css`) with
//! user-provided files or raw CSS content. Everything is read at
//! construction time so that missing files fail before any page is written.

mod assets;

pub(crate) use self::assets::Templates;
use crate::error::{ErrorKind, Result};
use crate::style::assets::Builtins;
use exn::ResultExt;
use std::borrow::Cow;
use std::path::Path;

/// An ordered collection of CSS stylesheets, written out as the single
/// stylesheet every exported page links to.
///
/// Styles are concatenated in insertion order, so later styles override
/// earlier ones.
///
/// # Example
///
/// ```
/// use shelfmark_render::StyleConfig;
/// # use shelfmark_render::error::Result;
///
/// # fn get_styles() -> Result<StyleConfig> {
/// let styles = StyleConfig::new()
///     .with_builtin("catalog.css")?
///     .with_content("tr.borrowed { font-style: italic; }");
/// assert!(String::from_utf8(styles.stylesheet()).unwrap().ends_with("italic; }\n"));
/// # Ok(styles)
/// # }
/// # get_styles().unwrap();
/// ```
#[derive(Default)]
pub struct StyleConfig {
    styles: Vec<Cow<'static, [u8]>>,
}
impl StyleConfig {
    /// Creates an empty style configuration with no stylesheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a builtin stylesheet by name.
    ///
    /// Returns [`ErrorKind::AssetNotFound`] if `name` does not match any
    /// embedded asset.
    pub fn with_builtin(mut self, name: impl AsRef<str>) -> Result<Self> {
        self.styles.push(Builtins::load(name)?);
        Ok(self)
    }

    /// Appends a stylesheet read from a file on disk.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            exn::bail!(ErrorKind::AssetNotFound(path.display().to_string()));
        }
        let content = std::fs::read(path).or_raise(|| ErrorKind::Io)?;
        self.styles.push(Cow::Owned(content));
        Ok(self)
    }

    /// Appends raw CSS content as a stylesheet. This is infallible since no
    /// I/O is involved.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.styles.push(Cow::Owned(content.into().into_bytes()));
        self
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// All styles joined into one stylesheet.
    pub fn stylesheet(&self) -> Vec<u8> {
        let mut css = Vec::new();
        for style in &self.styles {
            css.extend_from_slice(style);
            if !style.ends_with(b"\n") {
                css.push(b'\n');
            }
        }
        css
    }
}
