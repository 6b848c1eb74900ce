//! Validation reports and their renderings

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{CtyError, Result};

/// Compatibility impact of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// Existing resources or clients may stop working
    Breaking,
    NonBreaking,
    Addition,
    Removal,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breaking => "breaking",
            Self::NonBreaking => "non-breaking",
            Self::Addition => "addition",
            Self::Removal => "removal",
        }
    }

    /// Marker used in the text report
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Breaking => "⚠️",
            Self::Addition => "+",
            Self::Removal => "-",
            Self::NonBreaking => "~",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single schema difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// Dotted location, e.g. `spec.properties.replicas.minimum`
    pub path: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl Change {
    pub fn new(
        change_type: ChangeType,
        path: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            change_type,
            path: path.into(),
            description: description.into(),
            old_value: None,
            new_value: None,
        }
    }

    /// Record the previous value; empty values are left out
    pub fn with_old(mut self, value: impl Into<String>) -> Self {
        self.old_value = non_empty(value.into());
        self
    }

    /// Record the new value; empty values are left out
    pub fn with_new(mut self, value: impl Into<String>) -> Self {
        self.new_value = non_empty(value.into());
        self
    }

    pub fn is_breaking(&self) -> bool {
        self.change_type == ChangeType::Breaking
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Change counts per type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_changes: usize,
    pub breaking_changes: usize,
    pub additions: usize,
    pub removals: usize,
}

impl Summary {
    /// Tally a list of changes
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut summary = Self {
            total_changes: changes.len(),
            ..Default::default()
        };
        summary.breaking_changes = changes.iter().filter(|c| c.is_breaking()).count();
        for change in changes {
            match change.change_type {
                ChangeType::Addition => summary.additions += 1,
                ChangeType::Removal => summary.removals += 1,
                ChangeType::Breaking | ChangeType::NonBreaking => {}
            }
        }
        summary
    }
}

/// Result of comparing two schema versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub crd_kind: String,
    pub from_version: String,
    pub to_version: String,
    pub changes: Vec<Change>,
    pub summary: Summary,
}

impl ValidationReport {
    /// Build a report, tallying the summary from `changes`
    pub fn new(
        crd_kind: impl Into<String>,
        from_version: impl Into<String>,
        to_version: impl Into<String>,
        changes: Vec<Change>,
    ) -> Self {
        let summary = Summary::from_changes(&changes);
        Self {
            crd_kind: crd_kind.into(),
            from_version: from_version.into(),
            to_version: to_version.into(),
            changes,
            summary,
        }
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.summary.breaking_changes > 0
    }

    /// Pretty-printed JSON followed by a newline
    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)
            .map_err(|e| CtyError::Serialization(e.to_string()))?;
        writeln!(writer)?;
        Ok(())
    }

    pub fn write_yaml<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_yaml::to_writer(writer, self).map_err(|e| CtyError::Serialization(e.to_string()))
    }

    /// Human-readable report
    pub fn write_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "Schema Validation Report")?;
        writeln!(writer, "=======================")?;
        writeln!(writer)?;
        writeln!(writer, "CRD: {}", self.crd_kind)?;
        writeln!(writer, "From Version: {}", self.from_version)?;
        writeln!(writer, "To Version: {}", self.to_version)?;
        writeln!(writer)?;

        writeln!(writer, "Summary:")?;
        writeln!(writer, "  Total Changes: {}", self.summary.total_changes)?;
        writeln!(writer, "  Breaking Changes: {}", self.summary.breaking_changes)?;
        writeln!(writer, "  Additions: {}", self.summary.additions)?;
        writeln!(writer, "  Removals: {}", self.summary.removals)?;
        writeln!(writer)?;

        if self.changes.is_empty() {
            writeln!(writer, "No changes detected.")?;
            return Ok(());
        }

        writeln!(writer, "Changes:")?;
        for change in &self.changes {
            writeln!(
                writer,
                "  {} [{}] {}: {}",
                change.change_type.symbol(),
                change.change_type,
                change.path,
                change.description
            )?;
            if let Some(old) = change.old_value.as_deref().filter(|v| !v.is_empty()) {
                writeln!(writer, "    Old: {old}")?;
            }
            if let Some(new) = change.new_value.as_deref().filter(|v| !v.is_empty()) {
                writeln!(writer, "    New: {new}")?;
            }
        }

        Ok(())
    }
}
