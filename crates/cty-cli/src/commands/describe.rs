//! Describe command - show the property tree of each CRD version

use clap::ValueEnum;
use cty_core::VersionTree;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::io::Write;

use crate::display::TreeRenderer;
use crate::error::CliError;
use crate::source::{SourceArgs, load_crds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DescribeFormat {
    /// Styled property tree
    Tree,
    /// Property trees and samples as JSON
    Json,
    /// Property trees and samples as YAML
    Yaml,
}

pub fn run(sources: &SourceArgs, minimal: bool, format: DescribeFormat) -> Result<()> {
    let resolved = sources.resolve()?;
    let required_only = minimal || resolved.options.minimal;
    let crds = load_crds(&resolved.sources)?;

    let mut trees = Vec::new();
    for loaded in &crds {
        let versions = VersionTree::for_crd(&loaded.crd, required_only).map_err(CliError::from)?;
        tracing::debug!(kind = %loaded.crd.kind, versions = versions.len(), "built property trees");
        trees.extend(versions);
    }

    match format {
        DescribeFormat::Tree => {
            let mut renderer = TreeRenderer::new();
            for (i, tree) in trees.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                renderer.render(tree).map_err(CliError::from)?;
            }
        }
        DescribeFormat::Json => {
            let json = serde_json::to_string_pretty(&trees)
                .into_diagnostic()
                .wrap_err("Failed to serialize property trees")?;
            println!("{json}");
        }
        DescribeFormat::Yaml => {
            let yaml = serde_yaml::to_string(&trees)
                .into_diagnostic()
                .wrap_err("Failed to serialize property trees")?;
            std::io::stdout()
                .write_all(yaml.as_bytes())
                .map_err(CliError::from)?;
        }
    }

    Ok(())
}
