//! Path validation.
//!
//! Document names come from configuration files and from cross-document
//! references inside the XML itself (`authors.xml#a1`), so they are
//! untrusted. Every backend runs paths through [`validate`] before touching
//! anything.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path and returns it normalized.
///
/// The result is relative to the backend root and can never climb above it.
/// `.` segments, repeated separators and a leading `/` are dropped; `..` is
/// resolved lexically and rejected if it would leave the root. Null bytes and
/// Windows prefixes are rejected outright.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shelfmark_storage::validate_path;
///
/// assert!(validate_path("books.xml").is_ok());
/// assert!(validate_path("data/authors.xml").is_ok());
/// assert!(validate_path("../books.xml").is_err());
/// assert!(validate_path("").is_err());
/// assert_eq!(validate_path("./data//../genres.xml").unwrap(), Path::new("genres.xml"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) => {
                // Null bytes survive Path::components() on Unix but truncate
                // in syscalls.
                if segment.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
                components.push(segment);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
