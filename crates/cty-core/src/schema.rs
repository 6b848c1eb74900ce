//! CRD schema representation
//!
//! Structured types for the subset of OpenAPI v3 used by CRDs. Every
//! downstream component (sample generation, property trees, compatibility
//! checks) reads these types; none of them touch raw YAML.
//!
//! [`SchemaNode`] serializes back to OpenAPI keywords, which is what the
//! JSON Schema export writes.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// A CustomResourceDefinition normalized into versions and schemas
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrdSchema {
    /// Full CRD name (e.g., "widgets.example.com"), empty if the manifest had none
    pub name: String,
    /// API group (e.g., "example.com")
    pub group: String,
    /// Resource kind (e.g., "Widget")
    pub kind: String,
    /// API versions with their schemas, in manifest order
    pub versions: Vec<CrdVersionSchema>,
    /// Legacy single schema (`spec.validation`), only set when there are no versions
    pub validation: Option<CrdVersionSchema>,
}

impl CrdSchema {
    /// Get a version by name
    pub fn version(&self, name: &str) -> Option<&CrdVersionSchema> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// Schemas to render: every declared version, or the validation fallback
    pub fn schemas(&self) -> impl Iterator<Item = &CrdVersionSchema> {
        let fallback = if self.versions.is_empty() {
            self.validation.as_ref()
        } else {
            None
        };
        self.versions.iter().chain(fallback)
    }

    /// Names of all versions that can be looked up, for error messages
    pub fn version_names(&self) -> Vec<&str> {
        self.schemas().map(|v| v.name.as_str()).collect()
    }
}

/// A single API version of a CRD
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrdVersionSchema {
    /// Version name (e.g., "v1", "v1beta1"); the CRD name for legacy validation
    pub name: String,
    /// Root of the OpenAPI v3 schema
    pub schema: SchemaNode,
}

/// One node of a CRD schema tree
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Property type
    #[serde(rename = "type", skip_serializing_if = "PropertyType::is_untyped")]
    pub type_: PropertyType,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Example value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Format hint (e.g., "date-time", "byte")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Regex pattern for strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values (enum)
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    /// Minimum value for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Maximum value for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Whether null is allowed
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    /// Nested object properties
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    /// Required direct children
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Array item schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Additional properties for map-like objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

impl SchemaNode {
    /// Create a simple string property
    pub fn string() -> Self {
        Self {
            type_: PropertyType::String,
            ..Default::default()
        }
    }

    /// Create a simple integer property
    pub fn integer() -> Self {
        Self {
            type_: PropertyType::Integer,
            ..Default::default()
        }
    }

    /// Create a simple boolean property
    pub fn boolean() -> Self {
        Self {
            type_: PropertyType::Boolean,
            ..Default::default()
        }
    }

    /// Create an object property with nested properties
    pub fn object(properties: BTreeMap<String, SchemaNode>) -> Self {
        Self {
            type_: PropertyType::Object,
            properties,
            ..Default::default()
        }
    }

    /// Create an array property with item schema
    pub fn array(items: SchemaNode) -> Self {
        Self {
            type_: PropertyType::Array,
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Set the required list
    pub fn with_required<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this property has nested properties
    pub fn has_nested_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Item schema of an array whose elements are objects with properties
    pub fn object_items(&self) -> Option<&SchemaNode> {
        if self.type_ != PropertyType::Array {
            return None;
        }
        self.items
            .as_deref()
            .filter(|items| items.has_nested_properties())
    }

    /// Schema of the values of a map-like object, if it declares one
    pub fn additional_schema(&self) -> Option<&SchemaNode> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Check if a direct child is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Non-empty description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Non-empty pattern
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}

/// Property type in an OpenAPI schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// No `type` declared
    #[default]
    Untyped,
    /// Any other type name, kept verbatim
    Other(String),
}

impl PropertyType {
    /// Parse from string representation
    pub fn parse(s: &str) -> Self {
        match s {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "" => Self::Untyped,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_untyped(&self) -> bool {
        *self == Self::Untyped
    }

    /// Type name as written in the schema
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Untyped => "",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Additional properties configuration for objects
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// `additionalProperties: true`
    Allowed,
    /// `additionalProperties: false`
    Denied,
    /// Values must match a schema
    Schema(Box<SchemaNode>),
}

impl Serialize for AdditionalProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Allowed => serializer.serialize_bool(true),
            Self::Denied => serializer.serialize_bool(false),
            Self::Schema(schema) => schema.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_parse_roundtrip() {
        for name in ["string", "integer", "number", "boolean", "array", "object"] {
            assert_eq!(PropertyType::parse(name).to_string(), name);
        }
        assert_eq!(PropertyType::parse(""), PropertyType::Untyped);
        assert_eq!(
            PropertyType::parse("int-or-string"),
            PropertyType::Other("int-or-string".to_string())
        );
    }

    #[test]
    fn test_schema_node_nested() {
        let mut nested = BTreeMap::new();
        nested.insert("replicas".to_string(), SchemaNode::integer());
        nested.insert("image".to_string(), SchemaNode::string());

        let spec = SchemaNode::object(nested).with_required(["replicas"]);

        assert!(spec.has_nested_properties());
        assert!(spec.is_required("replicas"));
        assert!(!spec.is_required("image"));
    }

    #[test]
    fn test_object_items_requires_properties() {
        let scalar = SchemaNode::array(SchemaNode::string());
        assert!(scalar.object_items().is_none());

        let mut props = BTreeMap::new();
        props.insert("name".to_string(), SchemaNode::string());
        let objects = SchemaNode::array(SchemaNode::object(props));
        assert!(objects.object_items().is_some());
    }

    #[test]
    fn test_serializes_openapi_keywords() {
        let mut labels = SchemaNode::object(BTreeMap::new());
        labels.additional_properties = Some(AdditionalProperties::Schema(Box::new(SchemaNode::string())));

        let mut mode = SchemaNode::string();
        mode.enum_values = Some(vec![serde_json::json!("A"), serde_json::json!("B")]);
        mode.nullable = true;

        let mut ports = SchemaNode::array(SchemaNode::integer());
        ports.min_items = Some(1);

        let mut closed = SchemaNode::object(BTreeMap::new());
        closed.additional_properties = Some(AdditionalProperties::Denied);

        let spec = SchemaNode::object(BTreeMap::from([
            ("any".to_string(), SchemaNode::default()),
            ("closed".to_string(), closed),
            ("labels".to_string(), labels),
            ("mode".to_string(), mode),
            ("ports".to_string(), ports),
        ]))
        .with_required(["mode"]);

        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "any": {},
                    "closed": {"type": "object", "additionalProperties": false},
                    "labels": {"type": "object", "additionalProperties": {"type": "string"}},
                    "mode": {"type": "string", "enum": ["A", "B"], "nullable": true},
                    "ports": {"type": "array", "minItems": 1, "items": {"type": "integer"}},
                },
                "required": ["mode"],
            })
        );
    }

    #[test]
    fn test_schemas_falls_back_to_validation() {
        let legacy = CrdSchema {
            name: "widgets.example.com".to_string(),
            group: "example.com".to_string(),
            kind: "Widget".to_string(),
            versions: vec![],
            validation: Some(CrdVersionSchema {
                name: "widgets.example.com".to_string(),
                schema: SchemaNode::default(),
            }),
        };
        assert_eq!(legacy.version_names(), vec!["widgets.example.com"]);

        let versioned = CrdSchema {
            versions: vec![
                CrdVersionSchema {
                    name: "v1".to_string(),
                    ..Default::default()
                },
                CrdVersionSchema {
                    name: "v1beta1".to_string(),
                    ..Default::default()
                },
            ],
            ..legacy
        };
        assert_eq!(versioned.version_names(), vec!["v1", "v1beta1"]);
        assert!(versioned.version("v1beta1").is_some());
        assert!(versioned.version("v2").is_none());
    }
}
