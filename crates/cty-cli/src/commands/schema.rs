//! Schema command - export each CRD version as a JSON Schema file

use console::style;
use cty_core::JsonSchemaDocument;
use miette::Result;
use std::path::Path;

use crate::display::pluralize;
use crate::error::CliError;
use crate::source::{LoadedCrd, SourceArgs, load_crds};

pub fn run(sources: &SourceArgs, output: &Path) -> Result<()> {
    let resolved = sources.resolve()?;
    let crds = load_crds(&resolved.sources)?;

    std::fs::create_dir_all(output).map_err(|e| CliError::Io {
        message: format!("{}: {e}", output.display()),
    })?;

    let mut failed = Vec::new();
    let mut total = 0;
    for loaded in &crds {
        let documents = JsonSchemaDocument::for_crd(&loaded.crd);
        if documents.is_empty() {
            eprintln!(
                "{} {} ({}): no versioned schema to export",
                style("⚠").yellow(),
                style(&loaded.crd.kind).cyan(),
                loaded.origin
            );
            continue;
        }

        for document in &documents {
            total += 1;
            match write_document(document, output) {
                Ok(()) => eprintln!(
                    "{} {} → {}",
                    style("✓").green(),
                    style(&loaded.crd.kind).cyan(),
                    output.join(document.file_name()).display()
                ),
                Err(message) => {
                    report_failure(loaded, document, &message);
                    failed.push(document.file_name().to_string());
                }
            }
        }
    }

    tracing::debug!(
        crds = crds.len(),
        written = total - failed.len(),
        "exported JSON schemas"
    );

    if !failed.is_empty() {
        return Err(CliError::batch(&failed, total).into());
    }

    if total > 0 {
        eprintln!(
            "{} Wrote {}",
            style("✓").green().bold(),
            pluralize(total, "schema", "schemas")
        );
    }

    Ok(())
}

fn write_document(document: &JsonSchemaDocument<'_>, output: &Path) -> Result<(), String> {
    let json = document.to_json_pretty().map_err(|e| e.to_string())?;
    std::fs::write(output.join(document.file_name()), json + "\n").map_err(|e| e.to_string())
}

fn report_failure(loaded: &LoadedCrd, document: &JsonSchemaDocument<'_>, message: &str) {
    eprintln!(
        "{} {} ({}): {}",
        style("✗").red(),
        document.file_name(),
        loaded.origin,
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use cty_core::CrdExtractor;

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
    fn test_write_document() {
        let dir = tempfile::tempdir().unwrap();
        let crd = CrdExtractor::extract_all(CRD).unwrap().remove(0);
        let document = JsonSchemaDocument::new(&crd, &crd.versions[0]);

        write_document(&document, dir.path()).unwrap();

        let written =
            std::fs::read_to_string(dir.path().join("Widget.example.com.v1.schema.json")).unwrap();
        assert!(written.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["x-kubernetes-group-version-kind"][0]["version"], "v1");
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let crd = CrdExtractor::extract_all(CRD).unwrap().remove(0);
        let document = JsonSchemaDocument::new(&crd, &crd.versions[0]);

        assert!(write_document(&document, &dir.path().join("missing")).is_err());
    }
}
