//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Property trees of CRD versions (`cty describe`)
//! - One-line validation summaries with severity colors

use console::{Style, style};
use cty_core::{PropertyDescriptor, ValidationReport, VersionTree};
use std::io::{self, Write};

/// Format count with proper pluralization
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tree Display
// ═══════════════════════════════════════════════════════════════════════════

/// Renderer for CRD property trees
pub struct TreeRenderer {
    writer: Box<dyn Write>,
}

impl Default for TreeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeRenderer {
    /// Create a new renderer that writes to stdout
    pub fn new() -> Self {
        Self {
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a renderer that writes to a custom writer (for testing)
    pub fn with_writer<W: Write + 'static>(writer: W) -> Self {
        Self {
            writer: Box::new(writer),
        }
    }

    /// Render one version of a CRD
    pub fn render(&mut self, tree: &VersionTree) -> io::Result<()> {
        let title = format!("{} {}/{}", tree.kind, tree.group, tree.version);
        writeln!(
            self.writer,
            "{} {}",
            style(&tree.kind).cyan().bold(),
            style(format!("{}/{}", tree.group, tree.version)).dim()
        )?;
        writeln!(self.writer, "{}", "═".repeat(title.chars().count()))?;

        if let Some(description) = &tree.description {
            for line in description.lines() {
                writeln!(self.writer, "{}", line)?;
            }
        }
        writeln!(self.writer)?;

        for property in &tree.properties {
            self.render_property(property, 0)?;
        }

        Ok(())
    }

    /// Render a property and its children
    fn render_property(&mut self, property: &PropertyDescriptor, depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);

        let mut line = format!("{}{}", indent, style(&property.name).bold());
        if !property.type_name.is_empty() {
            line.push_str(&format!(" {}", style(&property.type_name).cyan()));
        }
        if let Some(format) = &property.format {
            line.push_str(&format!(" ({})", format));
        }
        if property.required {
            line.push_str(&format!(" {}", style("required").yellow()));
        }
        if property.nullable {
            line.push_str(&format!(" {}", style("nullable").dim()));
        }
        if let Some(default) = &property.default {
            line.push_str(&format!(" = {}", default));
        }
        if !property.enums.is_empty() {
            line.push_str(&format!(" [{}]", property.enums.join(", ")));
        }
        if let Some(pattern) = &property.pattern {
            line.push_str(&format!(" {}", style(format!("/{}/", pattern)).magenta()));
        }
        writeln!(self.writer, "{}", line)?;

        if let Some(description) = property.description.as_deref().and_then(|d| d.lines().next()) {
            writeln!(self.writer, "{}  {}", indent, style(description).dim())?;
        }

        for child in &property.children {
            self.render_property(child, depth + 1)?;
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Validation Summary Display
// ═══════════════════════════════════════════════════════════════════════════

/// One-line summary of a validation report
pub fn report_summary(report: &ValidationReport) -> String {
    let (icon, color) = summary_style(report);
    let summary = &report.summary;

    let detail = if summary.total_changes == 0 {
        "no changes".to_string()
    } else {
        format!(
            "{}, {} breaking",
            pluralize(summary.total_changes, "change", "changes"),
            summary.breaking_changes
        )
    };

    format!(
        "{} {} {} → {}: {}",
        color.apply_to(icon),
        style(&report.crd_kind).cyan().bold(),
        report.from_version,
        report.to_version,
        detail
    )
}

/// Print the summary of a report to stderr
pub fn print_report_summary(report: &ValidationReport) {
    eprintln!("{}", report_summary(report));
}

fn summary_style(report: &ValidationReport) -> (&'static str, Style) {
    if report.has_breaking_changes() {
        ("⚠", Style::new().yellow())
    } else {
        ("✓", Style::new().green())
    }
}
