//! Generate command - write sample documents for CRDs

use console::style;
use cty_core::{CrdSchema, SampleOptions};
use miette::Result;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ConfigOptions;
use crate::error::CliError;
use crate::source::{LoadedCrd, SourceArgs, load_crds};

const SEPARATOR: &str = "\n---\n";

/// Generation flags given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub comments: bool,
    pub minimal: bool,
    pub skip_random: bool,
}

impl Flags {
    /// Config defaults are switched on unless the flag already is
    fn merge(self, defaults: ConfigOptions) -> SampleOptions {
        SampleOptions {
            comments: self.comments || defaults.comments,
            required_only: self.minimal || defaults.minimal,
            skip_random: self.skip_random || defaults.skip_random,
        }
    }
}

pub fn run(sources: &SourceArgs, output: &Path, to_stdout: bool, flags: Flags) -> Result<()> {
    let resolved = sources.resolve()?;
    let options = flags.merge(resolved.options);
    let crds = load_crds(&resolved.sources)?;
    tracing::debug!(crds = crds.len(), ?options, "generating samples");

    let failed = if to_stdout {
        write_stdout(&crds, options)?
    } else {
        write_files(&crds, output, options)?
    };

    if !failed.is_empty() {
        return Err(CliError::batch(&failed, crds.len()).into());
    }

    Ok(())
}

fn render(loaded: &LoadedCrd, options: SampleOptions) -> cty_core::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    cty_core::generate(&loaded.crd, &mut buffer, options)?;
    Ok(buffer)
}

fn write_stdout(crds: &[LoadedCrd], options: SampleOptions) -> Result<Vec<String>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = Vec::new();
    let mut written = 0;

    for loaded in crds {
        match render(loaded, options) {
            Ok(sample) => {
                if written > 0 {
                    out.write_all(SEPARATOR.as_bytes()).map_err(CliError::from)?;
                }
                out.write_all(&sample).map_err(CliError::from)?;
                written += 1;
            }
            Err(e) => {
                report_failure(loaded, &e.to_string());
                failed.push(loaded.crd.kind.clone());
            }
        }
    }

    out.flush().map_err(CliError::from)?;
    Ok(failed)
}

fn write_files(crds: &[LoadedCrd], output: &Path, options: SampleOptions) -> Result<Vec<String>> {
    std::fs::create_dir_all(output).map_err(|e| CliError::Io {
        message: format!("{}: {e}", output.display()),
    })?;

    let mut paths = SamplePaths::new(output);
    let mut failed = Vec::new();
    for loaded in crds {
        let path = paths.next(&loaded.crd);
        let result = render(loaded, options)
            .map_err(|e| e.to_string())
            .and_then(|sample| std::fs::write(&path, sample).map_err(|e| e.to_string()));

        match result {
            Ok(()) => eprintln!(
                "{} {} → {}",
                style("✓").green(),
                style(&loaded.crd.kind).cyan(),
                path.display()
            ),
            Err(message) => {
                report_failure(loaded, &message);
                failed.push(loaded.crd.kind.clone());
            }
        }
    }

    Ok(failed)
}

fn report_failure(loaded: &LoadedCrd, message: &str) {
    eprintln!(
        "{} {} ({}): {}",
        style("✗").red(),
        style(&loaded.crd.kind).cyan(),
        loaded.origin,
        message
    );
}

/// Sample file names handed out during one run
///
/// A kind gets `<kind>_sample.yaml`. When that name is taken by a CRD of
/// another group the group is added, and a numeric suffix settles repeats of
/// the same group and kind.
struct SamplePaths<'a> {
    output: &'a Path,
    used: HashSet<PathBuf>,
}

impl<'a> SamplePaths<'a> {
    fn new(output: &'a Path) -> Self {
        Self {
            output,
            used: HashSet::new(),
        }
    }

    fn next(&mut self, crd: &CrdSchema) -> PathBuf {
        let kind = crd.kind.to_lowercase();
        let plain = sample_path(self.output, &kind);
        if self.used.insert(plain.clone()) {
            return plain;
        }

        let qualified = format!("{kind}.{}", crd.group);
        let mut path = sample_path(self.output, &qualified);
        let mut n = 2;
        while !self.used.insert(path.clone()) {
            path = sample_path(self.output, &format!("{qualified}_{n}"));
            n += 1;
        }

        tracing::warn!(
            kind = %crd.kind,
            group = %crd.group,
            taken = %plain.display(),
            path = %path.display(),
            "sample file name already used"
        );
        path
    }
}

fn sample_path(output: &Path, stem: &str) -> PathBuf {
    output.join(format!("{stem}_sample.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crd(group: &str, kind: &str) -> CrdSchema {
        CrdSchema {
            group: group.to_string(),
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sample_path() {
        let mut paths = SamplePaths::new(Path::new("out"));
        assert_eq!(
            paths.next(&crd("stable.example.com", "CronTab")),
            PathBuf::from("out/crontab_sample.yaml")
        );
    }

    #[test]
    fn test_same_kind_in_two_groups_gets_distinct_files() {
        let mut paths = SamplePaths::new(Path::new("out"));

        let names: Vec<PathBuf> = [
            crd("a.example.com", "Widget"),
            crd("b.example.com", "Widget"),
            crd("b.example.com", "Widget"),
            crd("a.example.com", "Gadget"),
        ]
        .iter()
        .map(|c| paths.next(c))
        .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("out/widget_sample.yaml"),
                PathBuf::from("out/widget.b.example.com_sample.yaml"),
                PathBuf::from("out/widget.b.example.com_2_sample.yaml"),
                PathBuf::from("out/gadget_sample.yaml"),
            ]
        );
    }

    #[test]
    fn test_flags_merge_with_config() {
        let flags = Flags {
            comments: true,
            ..Default::default()
        };
        let defaults = ConfigOptions {
            minimal: true,
            ..Default::default()
        };

        let options = flags.merge(defaults);
        assert!(options.comments);
        assert!(options.required_only);
        assert!(!options.skip_random);
    }
}
