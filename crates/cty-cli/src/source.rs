//! CRD sources: single files, folders, URLs and config files

use clap::Args;
use cty_core::{CrdExtractor, CrdSchema};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

use crate::config::{ConfigOptions, CtyConfig, UrlSource};
use crate::error::{CliError, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Flags selecting where CRDs are read from (exactly one source)
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// CRD file to read
    #[arg(short = 'c', long)]
    pub crd: Option<PathBuf>,

    /// Folder to scan for .yaml/.yml files
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// URL to fetch a CRD from
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Basic auth user for --url
    #[arg(long, requires = "url", conflicts_with = "token")]
    pub username: Option<String>,

    /// Basic auth password for --url
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Bearer token for --url
    #[arg(long, requires = "url")]
    pub token: Option<String>,

    /// Config file listing groups of CRD sources
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// One place to read CRDs from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    File(PathBuf),
    Folder(PathBuf),
    Url(UrlSource),
}

impl Source {
    fn describe(&self) -> String {
        match self {
            Source::File(path) | Source::Folder(path) => path.display().to_string(),
            Source::Url(url) => url.url.clone(),
        }
    }
}

/// Sources selected on the command line, with config-file defaults
#[derive(Debug, Clone, Default)]
pub struct ResolvedSources {
    pub sources: Vec<Source>,
    pub options: ConfigOptions,
}

/// A CRD and the file or URL it was read from
#[derive(Debug, Clone)]
pub struct LoadedCrd {
    pub origin: String,
    pub crd: CrdSchema,
}

impl SourceArgs {
    /// Turn the flags into a list of sources
    pub fn resolve(&self) -> Result<ResolvedSources> {
        let single = |source: Source| ResolvedSources {
            sources: vec![source],
            ..Default::default()
        };

        match (&self.crd, &self.folder, &self.url, &self.config) {
            (Some(path), None, None, None) => Ok(single(Source::File(path.clone()))),
            (None, Some(path), None, None) => Ok(single(Source::Folder(path.clone()))),
            (None, None, Some(url), None) => Ok(single(Source::Url(UrlSource {
                url: url.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                token: self.token.clone(),
            }))),
            (None, None, None, Some(path)) => Self::from_config(path),
            _ => Err(CliError::Usage {
                message: "exactly one CRD source is required".to_string(),
                help: Some("use one of --crd, --folder, --url or --config".to_string()),
            }),
        }
    }

    fn from_config(path: &Path) -> Result<ResolvedSources> {
        let config = CtyConfig::load_from(path)?;
        tracing::debug!(
            path = %path.display(),
            groups = config.api_groups.len(),
            "loaded config"
        );

        let mut sources = Vec::new();
        for group in config.api_groups {
            tracing::debug!(
                group = %group.name,
                description = group.description.as_deref().unwrap_or_default(),
                sources = group.source_count(),
                "adding api group"
            );
            sources.extend(group.files.into_iter().map(Source::File));
            sources.extend(group.folders.into_iter().map(Source::Folder));
            sources.extend(group.urls.into_iter().map(Source::Url));
        }

        Ok(ResolvedSources {
            sources,
            options: config.options,
        })
    }
}

/// Read every CRD from `sources`, in order
///
/// Unreadable or invalid files inside a folder are skipped with a warning;
/// any other failure aborts. At least one CRD must be found.
pub fn load_crds(sources: &[Source]) -> Result<Vec<LoadedCrd>> {
    let mut crds = Vec::new();

    for source in sources {
        match source {
            Source::File(path) => {
                let content = read_file(path)?;
                crds.extend(extract(&content, &path.display().to_string())?);
            }
            Source::Folder(path) => crds.extend(scan_folder(path)?),
            Source::Url(url) => {
                let content = fetch(url)?;
                crds.extend(extract(&content, &url.url)?);
            }
        }
    }

    if crds.is_empty() {
        let source_name = sources
            .iter()
            .map(Source::describe)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CliError::NoCrds { source_name });
    }

    Ok(crds)
}

fn extract(content: &str, origin: &str) -> Result<Vec<LoadedCrd>> {
    let crds = CrdExtractor::extract_all(content)
        .map_err(|e| CliError::crd(format!("{origin}: {e}")))?;

    Ok(crds
        .into_iter()
        .map(|crd| LoadedCrd {
            origin: origin.to_string(),
            crd,
        })
        .collect())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io {
        message: format!("{}: {e}", path.display()),
    })
}

fn scan_folder(dir: &Path) -> Result<Vec<LoadedCrd>> {
    if !dir.is_dir() {
        return Err(CliError::Io {
            message: format!("{}: not a directory", dir.display()),
        });
    }

    let mut crds = Vec::new();
    let entries = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_yaml(entry.path()));

    for entry in entries {
        let path = entry.path();
        let loaded = read_file(path).and_then(|content| extract(&content, &path.display().to_string()));
        match loaded {
            Ok(found) => {
                tracing::debug!(path = %path.display(), crds = found.len(), "scanned file");
                crds.extend(found);
            }
            Err(e) => tracing::warn!(path = %path.display(), "skipping file: {e}"),
        }
    }

    Ok(crds)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// Download a CRD manifest
pub fn fetch(source: &UrlSource) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(fetch_async(source))
}

async fn fetch_async(source: &UrlSource) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| CliError::fetch(&source.url, e.to_string()))?;

    let mut request = client.get(&source.url);
    if let Some(token) = &source.token {
        request = request.bearer_auth(token);
    } else if let Some(username) = &source.username {
        request = request.basic_auth(username, source.password.as_ref());
    }

    tracing::debug!(url = %source.url, "fetching CRD");
    let response = request
        .send()
        .await
        .map_err(|e| CliError::fetch(&source.url, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CliError::fetch(&source.url, format!("HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| CliError::fetch(&source.url, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  names:
    kind: Widget
  versions:
    - name: v1
      schema:
        openAPIV3Schema:
          type: object
"#;

    #[test]
    fn test_exactly_one_source() {
        let none = SourceArgs::default();
        assert!(matches!(none.resolve(), Err(CliError::Usage { .. })));

        let two = SourceArgs {
            crd: Some(PathBuf::from("a.yaml")),
            folder: Some(PathBuf::from("crds")),
            ..Default::default()
        };
        assert!(matches!(two.resolve(), Err(CliError::Usage { .. })));
    }

    #[test]
    fn test_url_source_carries_credentials() {
        let args = SourceArgs {
            url: Some("https://example.com/crd.yaml".to_string()),
            token: Some("abc".to_string()),
            ..Default::default()
        };

        let resolved = args.resolve().unwrap();
        assert_eq!(
            resolved.sources,
            vec![Source::Url(UrlSource {
                url: "https://example.com/crd.yaml".to_string(),
                token: Some("abc".to_string()),
                ..Default::default()
            })]
        );
    }

    #[test]
    fn test_config_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("cty.yaml");
        std::fs::write(
            &config,
            "apiGroups:\n  - name: a\n    files: [one.yaml]\n    folders: [crds]\n  - name: b\n    files: [two.yaml]\noptions:\n  minimal: true\n",
        )
        .unwrap();

        let args = SourceArgs {
            config: Some(config),
            ..Default::default()
        };
        let resolved = args.resolve().unwrap();

        assert_eq!(
            resolved.sources,
            vec![
                Source::File(dir.path().join("one.yaml")),
                Source::Folder(dir.path().join("crds")),
                Source::File(dir.path().join("two.yaml")),
            ]
        );
        assert!(resolved.options.minimal);
    }

    #[test]
    fn test_scan_folder_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.yaml"), CRD).unwrap();
        std::fs::write(dir.path().join("nested/a.yml"), CRD.replace("Widget", "Gadget")).unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "spec: [not, a, map]\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let crds = scan_folder(dir.path()).unwrap();
        let kinds: Vec<&str> = crds.iter().map(|c| c.crd.kind.as_str()).collect();

        assert_eq!(kinds, vec!["Widget", "Gadget"]);
        assert!(crds[1].origin.ends_with("a.yml"));
    }

    #[test]
    fn test_load_reports_missing_crds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment.yaml");
        std::fs::write(&path, "kind: Deployment\nspec:\n  replicas: 3\n").unwrap();

        let err = load_crds(&[Source::File(path)]).unwrap_err();
        assert!(matches!(err, CliError::NoCrds { .. }));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "spec:\n  versions: []\n").unwrap();

        let err = load_crds(&[Source::File(path)]).unwrap_err();
        assert!(matches!(err, CliError::Crd { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_is_yaml() {
        assert!(is_yaml(Path::new("a.yaml")));
        assert!(is_yaml(Path::new("a.yml")));
        assert!(!is_yaml(Path::new("a.json")));
        assert!(!is_yaml(Path::new("yaml")));
    }
}
