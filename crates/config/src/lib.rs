//! Layered configuration for shelfmark.
//!
//! Settings are merged from, in increasing priority:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A config file: either the one passed explicitly, or the first of
//!    `shelfmark.toml`, `shelfmark.yaml`, `shelfmark.yml` and
//!    `shelfmark.json` found in the platform config directory.
//! 3. Environment variables prefixed with `SHELFMARK_`, using `__` for
//!    nesting (`SHELFMARK_LENDING__LOAN_MONTHS=1`).
//!
//! ```toml
//! [documents]
//! root = "data"
//! authors = "people.xml"
//!
//! [lending]
//! root = "/var/lib/shelfmark"
//! key = "borrowingData"
//! loan_months = 3
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

const FILE_STEM: &str = "shelfmark";
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];
const ENV_PREFIX: &str = "SHELFMARK_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub documents: DocumentsConfig,
    pub lending: LendingConfig,
    pub export: ExportConfig,
}

/// Where the catalog documents live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub root: PathBuf,
    pub books: String,
    pub authors: String,
    pub publishers: String,
    pub genres: String,
}

/// Where lending state is kept and how long loans last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingConfig {
    pub root: PathBuf,
    /// State is stored as `<root>/<key>.json`.
    pub key: String,
    pub loan_months: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Extra CSS appended after the built-in stylesheet.
    pub stylesheet: Option<PathBuf>,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            books: "books.xml".to_string(),
            authors: "authors.xml".to_string(),
            publishers: "publishers.xml".to_string(),
            genres: "genres.xml".to_string(),
        }
    }
}
impl Default for LendingConfig {
    fn default() -> Self {
        let root = project_dirs().map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_else(|| PathBuf::from(".shelfmark"));
        Self { root, key: "borrowingData".to_string(), loan_months: 3 }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", FILE_STEM)
}

impl Config {
    /// Loads the layered configuration.
    ///
    /// An explicit `file` must exist. Without one, the platform config
    /// directory is searched and a missing file is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let search = project_dirs().map(|dirs| dirs.config_dir().to_path_buf()).into_iter().collect::<Vec<_>>();
        Self::load_from(file, &search)
    }

    #[instrument(level = "debug")]
    fn load_from(file: Option<&Path>, search: &[PathBuf]) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => discover(search),
        };
        if let Some(path) = &file {
            tracing::debug!(path = %path.display(), "Using config file");
            figment = merge_file(figment, path)?;
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract().or_raise(|| ErrorKind::Extract)?;
        config.validate()?;
        config.resolve()
    }

    /// Rejects settings that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.lending.loan_months == 0 {
            exn::bail!(ErrorKind::Invalid { key: "lending.loan_months", reason: "must be at least 1" });
        }
        let names = [
            ("documents.books", &self.documents.books),
            ("documents.authors", &self.documents.authors),
            ("documents.publishers", &self.documents.publishers),
            ("documents.genres", &self.documents.genres),
            ("lending.key", &self.lending.key),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                exn::bail!(ErrorKind::Invalid { key, reason: "must not be empty" });
            }
        }
        Ok(())
    }

    /// Makes both storage roots absolute, relative to the working directory.
    fn resolve(mut self) -> Result<Self> {
        self.documents.root = absolute(&self.documents.root)?;
        self.lending.root = absolute(&self.lending.root)?;
        Ok(self)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).or_raise(|| ErrorKind::Path(path.to_path_buf()))
}

fn discover(search: &[PathBuf]) -> Option<PathBuf> {
    search
        .iter()
        .flat_map(|dir| EXTENSIONS.iter().map(move |ext| dir.join(format!("{FILE_STEM}.{ext}"))))
        .find(|candidate| candidate.is_file())
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    // Every test runs inside a jail: it owns the working directory and the
    // environment for its duration.

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            let config = Config::load_from(None, &[]).unwrap();
            assert_eq!(config.documents.root, jail.directory().join("data"));
            assert_eq!(config.documents.books, "books.xml");
            assert_eq!(config.lending.key, "borrowingData");
            assert_eq!(config.lending.loan_months, 3);
            assert!(config.lending.root.is_absolute());
            assert_eq!(config.export.stylesheet, None);
            Ok(())
        });
    }

    #[rstest]
    #[case("shelfmark.toml", "[documents]\nauthors = \"people.xml\"\n[lending]\nloan_months = 6\n")]
    #[case("shelfmark.yaml", "documents:\n  authors: people.xml\nlending:\n  loan_months: 6\n")]
    #[case("shelfmark.json", r#"{"documents": {"authors": "people.xml"}, "lending": {"loan_months": 6}}"#)]
    fn test_file_formats(#[case] name: &str, #[case] content: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, content)?;
            let config = Config::load_from(Some(Path::new(name)), &[]).unwrap();
            assert_eq!(config.documents.authors, "people.xml");
            assert_eq!(config.documents.books, "books.xml");
            assert_eq!(config.lending.loan_months, 6);
            Ok(())
        });
    }

    #[test]
    fn test_discovered_file() {
        Jail::expect_with(|jail| {
            jail.create_file("shelfmark.yml", "lending:\n  key: loans\n")?;
            let config = Config::load_from(None, &[jail.directory().to_path_buf()]).unwrap();
            assert_eq!(config.lending.key, "loans");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[lending]\nloan_months = 6\nroot = \"state\"\n")?;
            jail.set_env("SHELFMARK_LENDING__LOAN_MONTHS", "1");
            jail.set_env("SHELFMARK_DOCUMENTS__ROOT", "/srv/catalog");
            let config = Config::load_from(Some(Path::new("custom.toml")), &[]).unwrap();
            assert_eq!(config.lending.loan_months, 1);
            assert_eq!(config.lending.root, jail.directory().join("state"));
            assert_eq!(config.documents.root, PathBuf::from("/srv/catalog"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_| {
            let err = Config::load_from(Some(Path::new("shelfmark.toml")), &[]).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            jail.create_file("shelfmark.ini", "loan_months=3")?;
            let err = Config::load_from(Some(Path::new("shelfmark.ini")), &[]).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case("[lending]\nloan_months = 0\n", "lending.loan_months")]
    #[case("[lending]\nkey = \" \"\n", "lending.key")]
    #[case("[documents]\ngenres = \"\"\n", "documents.genres")]
    fn test_invalid_settings(#[case] content: &str, #[case] expected: &str) {
        Jail::expect_with(|jail| {
            jail.create_file("shelfmark.toml", content)?;
            let err = Config::load_from(Some(Path::new("shelfmark.toml")), &[]).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid { key, .. } if *key == expected));
            Ok(())
        });
    }

    #[test]
    fn test_wrong_type() {
        Jail::expect_with(|jail| {
            jail.create_file("shelfmark.toml", "[lending]\nloan_months = \"three\"\n")?;
            let err = Config::load_from(Some(Path::new("shelfmark.toml")), &[]).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Extract));
            Ok(())
        });
    }
}
