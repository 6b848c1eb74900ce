//! Configuration file for batch runs
//!
//! ```yaml
//! apiGroups:
//!   - name: networking
//!     description: Networking CRDs
//!     files: [crds/gateway.yaml]
//!     folders: [crds/net]
//!     urls:
//!       - url: https://example.com/crd.yaml
//!         token: secret
//! options:
//!   comments: true
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CtyConfig {
    /// CRD sources, grouped
    #[serde(default)]
    pub api_groups: Vec<ApiGroup>,

    /// Defaults for generation flags
    #[serde(default)]
    pub options: ConfigOptions,
}

/// A named group of CRD sources
///
/// The name must be unique within a config file and a group must list at
/// least one source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiGroup {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub files: Vec<PathBuf>,

    #[serde(default)]
    pub folders: Vec<PathBuf>,

    #[serde(default)]
    pub urls: Vec<UrlSource>,
}

impl ApiGroup {
    pub fn source_count(&self) -> usize {
        self.files.len() + self.folders.len() + self.urls.len()
    }
}

/// A CRD fetched over HTTP(S)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UrlSource {
    pub url: String,

    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Bearer token, takes precedence over basic auth
    #[serde(default)]
    pub token: Option<String>,
}

/// Generation defaults; command-line flags can only switch them on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOptions {
    #[serde(default)]
    pub comments: bool,

    #[serde(default)]
    pub minimal: bool,

    #[serde(default)]
    pub skip_random: bool,
}

impl CtyConfig {
    /// Load a configuration file, resolving relative paths against its directory
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::usage(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let mut config = Self::parse(&content).map_err(|e| CliError::Usage {
            message: format!("invalid config file {}: {e}", path.display()),
            help: Some("expected top-level keys: apiGroups, options".to_string()),
        })?;

        config.validate().map_err(|message| CliError::Usage {
            message: format!("invalid config file {}: {message}", path.display()),
            help: Some("give each api group a unique name and at least one source".to_string()),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        Ok(config)
    }

    /// Check group names and make sure no group is empty
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for (i, group) in self.api_groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                return Err(format!("apiGroups[{i}] has an empty name"));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(format!("api group '{}' is listed twice", group.name));
            }
            if group.source_count() == 0 {
                return Err(format!("api group '{}' lists no sources", group.name));
            }
        }
        Ok(())
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for group in &mut self.api_groups {
            for path in group.files.iter_mut().chain(group.folders.iter_mut()) {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = CtyConfig::parse(
            r#"
apiGroups:
  - name: networking
    description: Networking CRDs
    files: [crds/a.yaml]
    folders: [crds/net]
    urls:
      - url: https://example.com/crd.yaml
        token: abc
      - url: https://example.com/other.yaml
        username: user
        password: pass
options:
  comments: true
  skipRandom: true
"#,
        )
        .unwrap();

        assert_eq!(config.api_groups.len(), 1);
        let group = &config.api_groups[0];
        assert_eq!(group.name, "networking");
        assert_eq!(group.description.as_deref(), Some("Networking CRDs"));
        assert_eq!(group.files, vec![PathBuf::from("crds/a.yaml")]);
        assert_eq!(group.urls[0].token.as_deref(), Some("abc"));
        assert_eq!(group.urls[1].username.as_deref(), Some("user"));

        assert!(config.options.comments);
        assert!(!config.options.minimal);
        assert!(config.options.skip_random);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(CtyConfig::parse("apiGroups: []\nrender: true\n").is_err());
    }

    #[test]
    fn test_relative_paths_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cty.yaml");
        std::fs::write(
            &path,
            "apiGroups:\n  - name: g\n    files: [a.yaml, /abs/b.yaml]\n    folders: [crds]\n",
        )
        .unwrap();

        let config = CtyConfig::load_from(&path).unwrap();
        let group = &config.api_groups[0];
        assert_eq!(group.files[0], dir.path().join("a.yaml"));
        assert_eq!(group.files[1], PathBuf::from("/abs/b.yaml"));
        assert_eq!(group.folders[0], dir.path().join("crds"));
    }

    #[test]
    fn test_group_validation() {
        let valid = CtyConfig::parse("apiGroups:\n  - name: a\n    files: [a.yaml]\n").unwrap();
        assert_eq!(valid.validate(), Ok(()));

        let empty = CtyConfig::parse("apiGroups:\n  - name: storage\n    description: nothing yet\n").unwrap();
        assert_eq!(
            empty.validate().unwrap_err(),
            "api group 'storage' lists no sources"
        );

        let unnamed = CtyConfig::parse("apiGroups:\n  - name: ''\n    files: [a.yaml]\n").unwrap();
        assert_eq!(unnamed.validate().unwrap_err(), "apiGroups[0] has an empty name");

        let twice = CtyConfig::parse(
            "apiGroups:\n  - name: a\n    files: [a.yaml]\n  - name: a\n    folders: [crds]\n",
        )
        .unwrap();
        assert_eq!(twice.validate().unwrap_err(), "api group 'a' is listed twice");
    }

    #[test]
    fn test_invalid_group_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cty.yaml");
        std::fs::write(&path, "apiGroups:\n  - name: storage\n").unwrap();

        let err = CtyConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CliError::Usage { .. }));
        assert!(err.to_string().contains("api group 'storage' lists no sources"));
    }

    #[test]
    fn test_missing_file() {
        let err = CtyConfig::load_from(Path::new("/nonexistent/cty.yaml")).unwrap_err();
        assert!(matches!(err, CliError::Usage { .. }));
    }
}
