//! Validate command - detect breaking changes between CRD versions

use clap::ValueEnum;
use cty_core::{CrdSchema, SchemaValidator, ValidationReport};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::io::Write;
use std::path::Path;

use crate::display::print_report_summary;
use crate::error::{self, CliError};
use crate::source::{LoadedCrd, Source, SourceArgs, load_crds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable report per CRD
    Text,
    /// A single report object, or an array of reports when several CRDs are compared
    Json,
    /// One YAML document per report, separated by `---`
    Yaml,
}

pub fn run(
    sources: &SourceArgs,
    from: Option<&str>,
    to: Option<&str>,
    against: Option<&Path>,
    format: ReportFormat,
    fail_on_breaking: bool,
) -> Result<()> {
    let resolved = sources.resolve()?;
    let crds = load_crds(&resolved.sources)?;

    let reports = match against {
        Some(path) => {
            let others = load_crds(&[Source::File(path.to_path_buf())])?;
            compare_files(&crds, &others, from.unwrap_or_default(), to.unwrap_or_default())?
        }
        None => compare_versions(&crds, from, to)?,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_reports(&reports, format, &mut out)?;
    out.flush().map_err(CliError::from)?;

    for report in &reports {
        print_report_summary(report);
    }

    let breaking: usize = reports.iter().map(|r| r.summary.breaking_changes).sum();
    if fail_on_breaking && breaking > 0 {
        return Err(CliError::BreakingChanges { count: breaking }.into());
    }

    Ok(())
}

/// Compare two versions inside each CRD
///
/// Without `--to` the last declared version is used, so a plain
/// `cty validate --crd x.yaml` compares the oldest and newest versions.
fn compare_versions(
    crds: &[LoadedCrd],
    from: Option<&str>,
    to: Option<&str>,
) -> error::Result<Vec<ValidationReport>> {
    crds.iter()
        .map(|loaded| {
            let crd = &loaded.crd;
            let to = to.unwrap_or_else(|| last_version(crd));
            let report = SchemaValidator::validate_versions(crd, from.unwrap_or_default(), to)
                .map_err(CliError::from)?;
            tracing::debug!(
                kind = %crd.kind,
                from = %report.from_version,
                to = %report.to_version,
                changes = report.summary.total_changes,
                "compared versions"
            );
            Ok(report)
        })
        .collect()
}

/// Compare each CRD with the CRD of the same group and kind in `others`
fn compare_files(
    crds: &[LoadedCrd],
    others: &[LoadedCrd],
    from: &str,
    to: &str,
) -> error::Result<Vec<ValidationReport>> {
    crds.iter()
        .map(|loaded| {
            let before = &loaded.crd;
            let after = others
                .iter()
                .map(|other| &other.crd)
                .find(|other| same_resource(before, other))
                .ok_or_else(|| {
                    CliError::crd_with_help(
                        format!("no {} ({}) CRD to compare against", before.kind, before.group),
                        "--against must contain a CRD with the same group and kind",
                    )
                })?;

            SchemaValidator::validate_crds(before, after, from, to).map_err(CliError::from)
        })
        .collect()
}

fn same_resource(a: &CrdSchema, b: &CrdSchema) -> bool {
    a.group == b.group && a.kind == b.kind
}

fn last_version(crd: &CrdSchema) -> &str {
    crd.schemas()
        .last()
        .map(|version| version.name.as_str())
        .unwrap_or_default()
}

fn write_reports<W: Write>(
    reports: &[ValidationReport],
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    match (format, reports) {
        (ReportFormat::Json, [report]) => report.write_json(out).map_err(CliError::from)?,
        (ReportFormat::Json, _) => {
            let json = serde_json::to_string_pretty(reports)
                .into_diagnostic()
                .wrap_err("Failed to serialize validation reports")?;
            writeln!(out, "{json}").map_err(CliError::from)?;
        }
        (ReportFormat::Yaml, _) => {
            for (i, report) in reports.iter().enumerate() {
                if i > 0 {
                    writeln!(out, "---").map_err(CliError::from)?;
                }
                report.write_yaml(out).map_err(CliError::from)?;
            }
        }
        (ReportFormat::Text, _) => {
            for (i, report) in reports.iter().enumerate() {
                if i > 0 {
                    writeln!(out).map_err(CliError::from)?;
                }
                report.write_text(out).map_err(CliError::from)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cty_core::{Change, ChangeType, CrdExtractor};

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
    - name: v2
      schema:
        openAPIV3Schema:
          type: object
"#;

    fn report(changes: Vec<Change>) -> ValidationReport {
        ValidationReport::new("Widget", "v1", "v2", changes)
    }

    #[test]
    fn test_last_version() {
        let crd = CrdExtractor::extract_all(CRD).unwrap().remove(0);
        assert_eq!(last_version(&crd), "v2");
    }

    #[test]
    fn test_single_json_report_is_an_object() {
        let mut out = Vec::new();
        write_reports(&[report(vec![])], ReportFormat::Json, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["crdKind"], "Widget");
    }

    #[test]
    fn test_multiple_json_reports_form_an_array() {
        let mut out = Vec::new();
        let change = Change::new(ChangeType::Addition, "spec.properties.spec", "Property added");
        write_reports(
            &[report(vec![]), report(vec![change])],
            ReportFormat::Json,
            &mut out,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let reports = value.as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1]["summary"]["additions"], 1);
    }

    #[test]
    fn test_yaml_reports_separated() {
        let mut out = Vec::new();
        write_reports(&[report(vec![]), report(vec![])], ReportFormat::Yaml, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\n---\n").count(), 1);
        assert_eq!(text.matches("crdKind: Widget").count(), 2);
    }
}
