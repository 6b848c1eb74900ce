//! Sample document generation
//!
//! Walks a version's property tree in key order and writes an indented
//! `key: value` document. Leaves get a placeholder picked from the schema
//! (default, example, pattern sample, first enum value, or a per-type token).
//! Two runs over the same schema and options produce identical bytes.

use std::collections::BTreeMap;
use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{CtyError, Result};
use crate::literal::{render_list, render_literal};
use crate::pattern::PatternSampler;
use crate::schema::{CrdSchema, CrdVersionSchema, PropertyType, SchemaNode};

/// Keys of a resource root that are always rendered, even in minimal mode
pub const ROOT_REQUIRED_FIELDS: &[&str] = &["apiVersion", "kind", "spec", "metadata", "status"];

/// Fixed instant used for `format: date-time` strings
const DATE_TIME_PLACEHOLDER: &str = "2024-10-11T12:48:44Z";

/// Most array items spelled out for a `minItems` placeholder
const MAX_LISTED_ITEMS: u64 = 16;

/// Separator written between the versions of one CRD
const DOCUMENT_SEPARATOR: &str = "\n---\n";

/// Generation switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleOptions {
    /// Write property descriptions as `#` comments above their keys
    pub comments: bool,
    /// Only render keys listed in their parent's `required`
    pub required_only: bool,
    /// Do not synthesize values for `pattern` constraints
    pub skip_random: bool,
}

/// Renders sample documents for the versions of one CRD
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    group: String,
    kind: String,
    options: SampleOptions,
}

impl SampleGenerator {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, options: SampleOptions) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            options,
        }
    }

    /// Write the sample for one version
    ///
    /// `required` is the active required list for the top-level `properties`;
    /// pass [`ROOT_REQUIRED_FIELDS`] for a resource root.
    pub fn generate_version<W, S>(
        &self,
        version: &str,
        writer: &mut W,
        properties: &BTreeMap<String, SchemaNode>,
        required: &[S],
    ) -> Result<()>
    where
        W: Write,
        S: AsRef<str>,
    {
        let mut walk = Walk {
            generator: self,
            version,
            out: writer,
        };
        walk.properties(properties, required, 0, false)
    }

    /// Render one version into a string
    pub fn render_version(&self, version: &CrdVersionSchema) -> Result<String> {
        let mut buf = Vec::new();
        self.generate_version(
            &version.name,
            &mut buf,
            &version.schema.properties,
            ROOT_REQUIRED_FIELDS,
        )?;
        String::from_utf8(buf).map_err(|e| CtyError::Serialization(e.to_string()))
    }

    /// Placeholder written after `key:` for a leaf node
    fn placeholder(&self, node: &SchemaNode) -> String {
        if let Some(default) = &node.default {
            return render_literal(default);
        }
        if let Some(example) = &node.example {
            return render_literal(example);
        }

        if !self.options.skip_random {
            if let Some(pattern) = node.pattern() {
                if let Some(sample) = PatternSampler::sample(pattern) {
                    let sample = render_literal(&serde_json::Value::String(sample));
                    return format!("{sample} # {pattern}");
                }
            }
        }

        if let Some(values) = node.enum_values.as_deref() {
            if let Some(first) = values.first() {
                return format!("{} # {}", render_literal(first), render_list(values));
            }
        }

        match &node.type_ {
            PropertyType::String => match node.format.as_deref() {
                Some("date-time") => DATE_TIME_PLACEHOLDER.to_string(),
                Some("byte") => BASE64.encode("string"),
                _ => "string".to_string(),
            },
            PropertyType::Integer => match node.minimum {
                Some(min) => (min as i64).to_string(),
                None => "1".to_string(),
            },
            PropertyType::Boolean => "true".to_string(),
            PropertyType::Object => "{}".to_string(),
            PropertyType::Array => match node.items.as_deref() {
                Some(items) => {
                    let item_type = items.type_.as_str();
                    let count = node.min_items.unwrap_or(0);
                    let listed = count.min(MAX_LISTED_ITEMS) as usize;
                    let list = vec![item_type; listed].join(",");
                    format!("[{list}] # minItems {count} of type {item_type}")
                }
                None => "[]".to_string(),
            },
            other => other.as_str().to_string(),
        }
    }
}

/// Write the samples of every version of `crd`, separated by `---`
///
/// CRDs using the legacy layout render their single validation schema.
pub fn generate<W: Write>(crd: &CrdSchema, writer: &mut W, options: SampleOptions) -> Result<()> {
    let generator = SampleGenerator::new(&crd.group, &crd.kind, options);

    for (i, version) in crd.schemas().enumerate() {
        if i > 0 {
            writer.write_all(DOCUMENT_SEPARATOR.as_bytes())?;
        }
        generator.generate_version(
            &version.name,
            writer,
            &version.schema.properties,
            ROOT_REQUIRED_FIELDS,
        )?;
    }

    Ok(())
}

/// Constant context of one generation run
struct Walk<'a, W> {
    generator: &'a SampleGenerator,
    version: &'a str,
    out: &'a mut W,
}

impl<W: Write> Walk<'_, W> {
    /// Write the keys of `properties` at `depth`
    ///
    /// With `list_item` set, the first key shares the line of a `- ` marker
    /// that was already written.
    fn properties<S: AsRef<str>>(
        &mut self,
        properties: &BTreeMap<String, SchemaNode>,
        required: &[S],
        depth: usize,
        mut list_item: bool,
    ) -> Result<()> {
        let options = self.generator.options;

        for (key, node) in properties {
            if options.required_only && !listed(required, key) {
                continue;
            }

            if list_item {
                write!(self.out, "{key}:")?;
                list_item = false;
            } else {
                let indent = indent(depth);
                if options.comments {
                    if let Some(description) = node.description() {
                        for line in description.lines().map(str::trim_end) {
                            if line.is_empty() {
                                writeln!(self.out, "{indent}#")?;
                            } else {
                                writeln!(self.out, "{indent}# {line}")?;
                            }
                        }
                    }
                }
                write!(self.out, "{indent}{key}:")?;
            }

            self.value(key, node, depth)?;
        }

        Ok(())
    }

    /// Write everything after `key:` for one property
    fn value(&mut self, key: &str, node: &SchemaNode, depth: usize) -> Result<()> {
        if node.has_nested_properties() {
            return self.object(&node.properties, &node.required, depth);
        }

        if key == "apiVersion" {
            writeln!(self.out, " {}/{}", self.generator.group, self.version)?;
            return Ok(());
        }
        if key == "kind" && depth == 0 {
            writeln!(self.out, " {}", self.generator.kind)?;
            return Ok(());
        }

        if let Some(items) = node.object_items() {
            if self.generator.options.required_only && !any_listed(&items.properties, &items.required) {
                writeln!(self.out, " []")?;
                return Ok(());
            }
            write!(self.out, "\n{}- ", indent(depth + 1))?;
            return self.properties(&items.properties, &items.required, depth + 2, true);
        }

        if node.additional_properties.is_some() {
            return match node.additional_schema() {
                Some(schema) if schema.has_nested_properties() => {
                    self.object(&schema.properties, &schema.required, depth)
                }
                _ => {
                    writeln!(self.out, " {{}}")?;
                    Ok(())
                }
            };
        }

        let placeholder = self.generator.placeholder(node);
        if placeholder.is_empty() {
            writeln!(self.out)?;
        } else {
            writeln!(self.out, " {placeholder}")?;
        }
        Ok(())
    }

    /// Descend into a mapping, or write `{}` when minimal mode leaves it empty
    fn object(
        &mut self,
        properties: &BTreeMap<String, SchemaNode>,
        required: &[String],
        depth: usize,
    ) -> Result<()> {
        if self.generator.options.required_only && !any_listed(properties, required) {
            writeln!(self.out, " {{}}")?;
            return Ok(());
        }
        writeln!(self.out)?;
        self.properties(properties, required, depth + 1, false)
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn listed<S: AsRef<str>>(required: &[S], key: &str) -> bool {
    required.iter().any(|r| r.as_ref() == key)
}

fn any_listed(properties: &BTreeMap<String, SchemaNode>, required: &[String]) -> bool {
    properties.keys().any(|key| listed(required, key))
}
