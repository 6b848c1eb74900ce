//! Schema compatibility checks
//!
//! Compares two schema trees and classifies every difference by its impact
//! on existing resources:
//!
//! | Change | Impact |
//! |--------|--------|
//! | type changed | breaking |
//! | field becomes required | breaking |
//! | field no longer required | non-breaking |
//! | property removed | breaking |
//! | property added | addition |
//! | minimum added or increased | breaking |
//! | minimum removed or decreased | non-breaking |
//! | maximum added or decreased | breaking |
//! | maximum removed or increased | non-breaking |
//! | pattern added or changed | breaking |
//! | pattern removed | non-breaking |

use crate::error::{CtyError, Result};
use crate::report::{Change, ChangeType, ValidationReport};
use crate::schema::{CrdSchema, SchemaNode};

/// Path prefix of every change in a version comparison
const BASE_PATH: &str = "spec";

/// Compares schema versions
pub struct SchemaValidator;

impl SchemaValidator {
    /// Compare two versions of the same CRD
    ///
    /// An empty version name selects the first declared version, or the
    /// validation schema of a legacy CRD.
    pub fn validate_versions(crd: &CrdSchema, from: &str, to: &str) -> Result<ValidationReport> {
        Self::validate_crds(crd, crd, from, to)
    }

    /// Compare version `from` of `before` with version `to` of `after`
    pub fn validate_crds(
        before: &CrdSchema,
        after: &CrdSchema,
        from: &str,
        to: &str,
    ) -> Result<ValidationReport> {
        let (from_name, from_schema) = find_version(before, from)?;
        let (to_name, to_schema) = find_version(after, to)?;

        let mut changes = Self::compare(Some(from_schema), Some(to_schema), BASE_PATH);
        changes.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(ValidationReport::new(&after.kind, from_name, to_name, changes))
    }

    /// List the differences between two schema nodes
    ///
    /// A missing side is reported as a single addition or removal at
    /// `base_path` without looking further.
    pub fn compare(from: Option<&SchemaNode>, to: Option<&SchemaNode>, base_path: &str) -> Vec<Change> {
        let (from, to) = match (from, to) {
            (None, None) => return Vec::new(),
            (None, Some(_)) => {
                return vec![Change::new(ChangeType::Addition, base_path, "New schema added")];
            }
            (Some(_), None) => {
                return vec![Change::new(ChangeType::Removal, base_path, "Schema removed")];
            }
            (Some(from), Some(to)) => (from, to),
        };

        let mut changes = Vec::new();

        if from.type_ != to.type_ {
            changes.push(
                Change::new(ChangeType::Breaking, format!("{base_path}.type"), "Type changed")
                    .with_old(from.type_.as_str())
                    .with_new(to.type_.as_str()),
            );
        }

        compare_required(base_path, from, to, &mut changes);
        compare_properties(base_path, from, to, &mut changes);
        compare_minimum(base_path, from.minimum, to.minimum, &mut changes);
        compare_maximum(base_path, from.maximum, to.maximum, &mut changes);
        compare_pattern(base_path, from.pattern(), to.pattern(), &mut changes);

        changes
    }
}

fn find_version<'a>(crd: &'a CrdSchema, name: &str) -> Result<(&'a str, &'a SchemaNode)> {
    if name.is_empty() {
        if let Some(first) = crd.versions.first() {
            return Ok((first.name.as_str(), &first.schema));
        }
    }

    if let Some(version) = crd.version(name) {
        return Ok((version.name.as_str(), &version.schema));
    }

    if let Some(validation) = &crd.validation {
        if name.is_empty() || name == validation.name {
            return Ok((validation.name.as_str(), &validation.schema));
        }
    }

    Err(CtyError::VersionNotFound {
        requested: name.to_string(),
        available: crd.version_names().join(", "),
    })
}

fn compare_required(base_path: &str, from: &SchemaNode, to: &SchemaNode, changes: &mut Vec<Change>) {
    let path = format!("{base_path}.required");

    for name in to.required.iter().filter(|name| !from.is_required(name)) {
        changes.push(
            Change::new(
                ChangeType::Breaking,
                &path,
                format!("Field '{name}' is now required"),
            )
            .with_new(name),
        );
    }

    for name in from.required.iter().filter(|name| !to.is_required(name)) {
        changes.push(
            Change::new(
                ChangeType::NonBreaking,
                &path,
                format!("Field '{name}' is no longer required"),
            )
            .with_old(name),
        );
    }
}

fn compare_properties(base_path: &str, from: &SchemaNode, to: &SchemaNode, changes: &mut Vec<Change>) {
    let path = |name: &str| format!("{base_path}.properties.{name}");

    for name in from.properties.keys().filter(|name| !to.properties.contains_key(*name)) {
        changes.push(Change::new(
            ChangeType::Breaking,
            path(name.as_str()),
            format!("Property '{name}' removed"),
        ));
    }

    for name in to.properties.keys().filter(|name| !from.properties.contains_key(*name)) {
        changes.push(Change::new(
            ChangeType::Addition,
            path(name.as_str()),
            format!("Property '{name}' added"),
        ));
    }

    for (name, from_prop) in &from.properties {
        if let Some(to_prop) = to.properties.get(name) {
            changes.extend(SchemaValidator::compare(
                Some(from_prop),
                Some(to_prop),
                &path(name.as_str()),
            ));
        }
    }
}

fn compare_minimum(base_path: &str, from: Option<f64>, to: Option<f64>, changes: &mut Vec<Change>) {
    let path = format!("{base_path}.minimum");

    match (from, to) {
        (Some(old), Some(new)) if new > old => changes.push(
            Change::new(ChangeType::Breaking, path, "Minimum value increased")
                .with_old(number(old))
                .with_new(number(new)),
        ),
        (Some(old), Some(new)) if new < old => changes.push(
            Change::new(ChangeType::NonBreaking, path, "Minimum value decreased")
                .with_old(number(old))
                .with_new(number(new)),
        ),
        (None, Some(new)) => changes.push(
            Change::new(ChangeType::Breaking, path, "New minimum constraint added").with_new(number(new)),
        ),
        (Some(old), None) => changes.push(
            Change::new(ChangeType::NonBreaking, path, "Minimum constraint removed").with_old(number(old)),
        ),
        _ => {}
    }
}

fn compare_maximum(base_path: &str, from: Option<f64>, to: Option<f64>, changes: &mut Vec<Change>) {
    let path = format!("{base_path}.maximum");

    match (from, to) {
        (Some(old), Some(new)) if new < old => changes.push(
            Change::new(ChangeType::Breaking, path, "Maximum value decreased")
                .with_old(number(old))
                .with_new(number(new)),
        ),
        (Some(old), Some(new)) if new > old => changes.push(
            Change::new(ChangeType::NonBreaking, path, "Maximum value increased")
                .with_old(number(old))
                .with_new(number(new)),
        ),
        (None, Some(new)) => changes.push(
            Change::new(ChangeType::Breaking, path, "New maximum constraint added").with_new(number(new)),
        ),
        (Some(old), None) => changes.push(
            Change::new(ChangeType::NonBreaking, path, "Maximum constraint removed").with_old(number(old)),
        ),
        _ => {}
    }
}

fn compare_pattern(base_path: &str, from: Option<&str>, to: Option<&str>, changes: &mut Vec<Change>) {
    let path = format!("{base_path}.pattern");

    match (from, to) {
        (None, Some(new)) => changes.push(
            Change::new(ChangeType::Breaking, path, "New pattern constraint added").with_new(new),
        ),
        (Some(old), None) => changes.push(
            Change::new(ChangeType::NonBreaking, path, "Pattern constraint removed").with_old(old),
        ),
        (Some(old), Some(new)) if old != new => changes.push(
            Change::new(ChangeType::Breaking, path, "Pattern constraint changed")
                .with_old(old)
                .with_new(new),
        ),
        _ => {}
    }
}

/// Bounds are reported without decimals
fn number(value: f64) -> String {
    format!("{value:.0}")
}
