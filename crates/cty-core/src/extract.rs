//! CRD schema extraction
//!
//! Maps a generic YAML/JSON document onto [`CrdSchema`]. Two manifest layouts
//! are understood:
//!
//! - `spec.versions[].schema.openAPIV3Schema` (apiextensions.k8s.io/v1)
//! - `spec.validation.openAPIV3Schema` (legacy v1beta1 single schema)
//!
//! A document with neither is not a CRD and yields `Ok(None)`, so directory
//! scans can skip unrelated manifests. Every schema field is checked for its
//! shape; a mismatch reports the dotted path of the offending field.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CtyError, Result};
use crate::schema::{AdditionalProperties, CrdSchema, CrdVersionSchema, PropertyType, SchemaNode};

/// Deepest schema nesting accepted by the extractor
pub const MAX_SCHEMA_DEPTH: usize = 64;

/// Split a (possibly multi-document) YAML stream into generic documents
///
/// Empty documents (e.g. a trailing `---`) are dropped.
pub fn parse_documents(yaml: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(yaml) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

const CRD_KIND: &str = "CustomResourceDefinition";

/// Whether a document is, or may be, a CRD manifest
///
/// Documents without a `kind` are kept so that bare schema documents still
/// surface their errors.
fn declares_crd_kind(doc: &Value) -> bool {
    match doc.get("kind") {
        Some(Value::String(kind)) => kind == CRD_KIND,
        _ => true,
    }
}

/// Extractor for CRD manifests
pub struct CrdExtractor;

impl CrdExtractor {
    /// Extract every CRD of a YAML stream, skipping documents that are not CRDs
    ///
    /// Documents declaring another `kind` (a Namespace bundled with its CRD,
    /// say) are skipped before their shape is checked.
    pub fn extract_all(yaml: &str) -> Result<Vec<CrdSchema>> {
        parse_documents(yaml)?
            .iter()
            .filter(|doc| declares_crd_kind(doc))
            .filter_map(|doc| Self::extract(doc).transpose())
            .collect()
    }

    /// Extract a single CRD from a generic document
    ///
    /// Returns `Ok(None)` when the document has neither `spec.versions` nor
    /// `spec.validation`.
    pub fn extract(doc: &Value) -> Result<Option<CrdSchema>> {
        let spec = doc.get("spec").ok_or_else(|| CtyError::missing("spec"))?;
        let spec = as_map(spec, "spec")?;

        if let Some(versions) = spec.get("versions") {
            let (group, kind) = Self::group_kind(spec)?;
            let versions = versions
                .as_array()
                .ok_or_else(|| CtyError::invalid("spec.versions", "a list", versions))?;

            let versions = versions
                .iter()
                .enumerate()
                .map(|(i, v)| Self::parse_version(v, &format!("spec.versions[{}]", i)))
                .collect::<Result<Vec<_>>>()?;

            return Ok(Some(CrdSchema {
                name: metadata_name(doc),
                group,
                kind,
                versions,
                validation: None,
            }));
        }

        if let Some(validation) = spec.get("validation") {
            let validation = as_map(validation, "spec.validation")?;
            let path = "spec.validation.openAPIV3Schema";
            let schema = validation
                .get("openAPIV3Schema")
                .ok_or_else(|| CtyError::missing(path))?;

            let mut root = parse_node(schema, path, 0)?;
            ensure_kind_and_api_version(&mut root);

            let (group, kind) = Self::group_kind(spec)?;
            let name = metadata_name(doc);

            return Ok(Some(CrdSchema {
                name: name.clone(),
                group,
                kind,
                versions: Vec::new(),
                validation: Some(CrdVersionSchema { name, schema: root }),
            }));
        }

        Ok(None)
    }

    /// Read `spec.group` and `spec.names.kind`
    fn group_kind(spec: &Map<String, Value>) -> Result<(String, String)> {
        let names = spec
            .get("names")
            .ok_or_else(|| CtyError::missing("spec.names"))?;
        let names = as_map(names, "spec.names")?;

        let kind = required_str(names, "kind", "spec.names.kind")?;
        let group = required_str(spec, "group", "spec.group")?;

        Ok((group, kind))
    }

    /// Parse a single entry of `spec.versions`
    fn parse_version(version: &Value, path: &str) -> Result<CrdVersionSchema> {
        let version = as_map(version, path)?;

        let name = required_str(version, "name", &format!("{}.name", path))?;

        let schema_path = format!("{}.schema", path);
        let schema = version
            .get("schema")
            .ok_or_else(|| CtyError::missing(schema_path.as_str()))?;
        let schema = as_map(schema, &schema_path)?;

        let openapi_path = format!("{}.openAPIV3Schema", schema_path);
        let openapi = schema
            .get("openAPIV3Schema")
            .ok_or_else(|| CtyError::missing(openapi_path.as_str()))?;

        let mut root = parse_node(openapi, &openapi_path, 0)?;
        ensure_kind_and_api_version(&mut root);

        Ok(CrdVersionSchema { name, schema: root })
    }
}

/// Map one schema node (recursive)
fn parse_node(value: &Value, path: &str, depth: usize) -> Result<SchemaNode> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(CtyError::SchemaTooDeep {
            path: path.to_string(),
            max: MAX_SCHEMA_DEPTH,
        });
    }

    let node = as_map(value, path)?;
    let field = |key: &str| format!("{}.{}", path, key);

    let type_ = optional_str(node, "type", &field("type"))?
        .map(|t| PropertyType::parse(&t))
        .unwrap_or_default();

    let enum_values = match node.get("enum") {
        Some(Value::Array(values)) => Some(values.clone()),
        Some(other) => return Err(CtyError::invalid(field("enum"), "a list", other)),
        None => None,
    };

    let min_items = match node.get("minItems") {
        Some(v) => Some(
            v.as_u64()
                .ok_or_else(|| CtyError::invalid(field("minItems"), "a non-negative integer", v))?,
        ),
        None => None,
    };

    let properties: BTreeMap<String, SchemaNode> = match node.get("properties") {
        Some(props) => as_map(props, &field("properties"))?
            .iter()
            .map(|(name, child)| {
                let child_path = format!("{}.properties.{}", path, name);
                Ok((name.clone(), parse_node(child, &child_path, depth + 1)?))
            })
            .collect::<Result<_>>()?,
        None => BTreeMap::new(),
    };

    let required: Vec<String> = match node.get("required") {
        Some(Value::Array(names)) => names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                n.as_str().map(String::from).ok_or_else(|| {
                    CtyError::invalid(format!("{}.required[{}]", path, i), "a string", n)
                })
            })
            .collect::<Result<_>>()?,
        Some(other) => return Err(CtyError::invalid(field("required"), "a list", other)),
        None => Vec::new(),
    };

    let items = node
        .get("items")
        .map(|v| parse_node(v, &field("items"), depth + 1).map(Box::new))
        .transpose()?;

    let additional_properties = match node.get("additionalProperties") {
        Some(Value::Bool(true)) => Some(AdditionalProperties::Allowed),
        Some(Value::Bool(false)) => Some(AdditionalProperties::Denied),
        Some(v @ Value::Object(_)) => Some(AdditionalProperties::Schema(Box::new(parse_node(
            v,
            &field("additionalProperties"),
            depth + 1,
        )?))),
        Some(other) => {
            return Err(CtyError::invalid(
                field("additionalProperties"),
                "a boolean or a map",
                other,
            ));
        }
        None => None,
    };

    Ok(SchemaNode {
        type_,
        description: optional_str(node, "description", &field("description"))?,
        default: node.get("default").cloned(),
        example: node.get("example").cloned(),
        format: optional_str(node, "format", &field("format"))?,
        pattern: optional_str(node, "pattern", &field("pattern"))?,
        enum_values,
        minimum: optional_f64(node, "minimum", &field("minimum"))?,
        maximum: optional_f64(node, "maximum", &field("maximum"))?,
        min_items,
        nullable: match node.get("nullable") {
            Some(Value::Bool(b)) => *b,
            Some(other) => return Err(CtyError::invalid(field("nullable"), "a boolean", other)),
            None => false,
        },
        properties,
        required,
        items,
        additional_properties,
    })
}

/// Make sure the root has `kind` and `apiVersion` entries for the generator to fill in
fn ensure_kind_and_api_version(root: &mut SchemaNode) {
    root.properties.entry("kind".to_string()).or_default();
    root.properties.entry("apiVersion".to_string()).or_default();
}

fn metadata_name(doc: &Value) -> String {
    doc.get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn as_map<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| CtyError::invalid(path, "a map", value))
}

fn required_str(map: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    optional_str(map, key, path)?.ok_or_else(|| CtyError::missing(path))
}

fn optional_str(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CtyError::invalid(path, "a string", other)),
        None => Ok(None),
    }
}

fn optional_f64(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<f64>> {
    match map.get(key) {
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| CtyError::invalid(path, "a number", v)),
        None => Ok(None),
    }
}
