//! Display-oriented property trees
//!
//! Same walk as the sample generator (key order, required scoping, array
//! and `additionalProperties` descent) but producing descriptors instead of
//! text, for presentation layers that render a schema browser.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::literal::render_literal;
use crate::sample::{ROOT_REQUIRED_FIELDS, SampleGenerator, SampleOptions};
use crate::schema::{CrdSchema, SchemaNode};

/// One property of a schema, with its rendered children
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PropertyDescriptor>,
}

/// Build descriptors for `properties`, sorted by name
///
/// `required` is the active required list for these properties. Root-level
/// `kind` and `apiVersion` without a description get one naming the resource.
pub fn build_property_tree<S: AsRef<str>>(
    properties: &BTreeMap<String, SchemaNode>,
    required: &[S],
    version: &str,
    kind: &str,
    group: &str,
    required_only: bool,
) -> Vec<PropertyDescriptor> {
    let builder = TreeBuilder {
        version,
        kind,
        group,
        required_only,
    };
    builder.build(properties, required, 0)
}

struct TreeBuilder<'a> {
    version: &'a str,
    kind: &'a str,
    group: &'a str,
    required_only: bool,
}

impl TreeBuilder<'_> {
    fn build<S: AsRef<str>>(
        &self,
        properties: &BTreeMap<String, SchemaNode>,
        required: &[S],
        depth: usize,
    ) -> Vec<PropertyDescriptor> {
        properties
            .iter()
            .filter_map(|(name, node)| {
                let is_required = required.iter().any(|r| r.as_ref() == name);
                if self.required_only && !is_required {
                    return None;
                }
                Some(self.describe(name, node, is_required, depth))
            })
            .collect()
    }

    fn describe(
        &self,
        name: &str,
        node: &SchemaNode,
        required: bool,
        depth: usize,
    ) -> PropertyDescriptor {
        let description = node
            .description()
            .map(str::to_string)
            .or_else(|| self.root_description(name, depth));

        let children = if node.has_nested_properties() {
            self.build(&node.properties, &node.required, depth + 1)
        } else if let Some(items) = node.object_items() {
            self.build(&items.properties, &items.required, depth + 1)
        } else if let Some(schema) = node.additional_schema() {
            self.build(&schema.properties, &schema.required, depth + 1)
        } else {
            Vec::new()
        };

        PropertyDescriptor {
            name: name.to_string(),
            type_name: node.type_.to_string(),
            description,
            pattern: node.pattern().map(str::to_string),
            format: node.format.clone(),
            nullable: node.nullable,
            default: node.default.as_ref().map(render_literal),
            example: node.example.as_ref().map(render_literal),
            required,
            enums: node
                .enum_values
                .iter()
                .flatten()
                .map(render_literal)
                .collect(),
            children,
        }
    }

    fn root_description(&self, name: &str, depth: usize) -> Option<String> {
        if depth != 0 {
            return None;
        }
        match name {
            "kind" => Some(format!("Kind of the resource, always {}", self.kind)),
            "apiVersion" => Some(format!(
                "API version of the resource, always {}/{}",
                self.group, self.version
            )),
            _ => None,
        }
    }
}

/// Everything needed to present one version of a CRD
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionTree {
    pub version: String,
    pub kind: String,
    pub group: String,
    /// Description of the version's root schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub properties: Vec<PropertyDescriptor>,
    /// Rendered sample document for this version
    pub yaml: String,
}

impl VersionTree {
    /// Build one tree per version, or for the validation schema of a legacy CRD
    pub fn for_crd(crd: &CrdSchema, required_only: bool) -> Result<Vec<Self>> {
        let generator = SampleGenerator::new(
            &crd.group,
            &crd.kind,
            SampleOptions {
                required_only,
                ..Default::default()
            },
        );

        crd.schemas()
            .map(|version| {
                Ok(Self {
                    version: version.name.clone(),
                    kind: crd.kind.clone(),
                    group: crd.group.clone(),
                    description: version.schema.description().map(str::to_string),
                    properties: build_property_tree(
                        &version.schema.properties,
                        ROOT_REQUIRED_FIELDS,
                        &version.name,
                        &crd.kind,
                        &crd.group,
                        required_only,
                    ),
                    yaml: generator.render_version(version)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CrdExtractor;
    use crate::schema::{AdditionalProperties, PropertyType};
    use serde_json::json;

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
          description: A widget
          properties:
            spec:
              type: object
              required: [size]
              properties:
                size:
                  type: integer
                  default: 3
                mode:
                  type: string
                  enum: [A, B]
                  pattern: "^[AB]$"
                tags:
                  type: array
                  items:
                    type: object
                    required: [name]
                    properties:
                      name:
                        type: string
                        nullable: true
                      value:
                        type: string
"#;

    fn names(props: &[PropertyDescriptor]) -> Vec<&str> {
        props.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_tree_from_crd() {
        let crd = CrdExtractor::extract_all(CRD).unwrap().remove(0);
        let trees = VersionTree::for_crd(&crd, false).unwrap();
        assert_eq!(trees.len(), 1);

        let tree = &trees[0];
        assert_eq!(tree.version, "v1");
        assert_eq!(tree.description.as_deref(), Some("A widget"));
        assert!(tree.yaml.starts_with("apiVersion: example.com/v1\nkind: Widget\n"));
        assert_eq!(names(&tree.properties), vec!["apiVersion", "kind", "spec"]);

        let spec = &tree.properties[2];
        assert!(spec.required);
        assert_eq!(names(&spec.children), vec!["mode", "size", "tags"]);

        let mode = &spec.children[0];
        assert_eq!(mode.enums, vec!["A", "B"]);
        assert_eq!(mode.pattern.as_deref(), Some("^[AB]$"));
        assert!(!mode.required);

        let size = &spec.children[1];
        assert_eq!(size.default.as_deref(), Some("3"));
        assert_eq!(size.type_name, "integer");
        assert!(size.required);

        let tags = &spec.children[2];
        assert_eq!(names(&tags.children), vec!["name", "value"]);
        assert!(tags.children[0].required);
        assert!(tags.children[0].nullable);
        assert!(!tags.children[1].required);
    }

    #[test]
    fn test_root_descriptions_are_synthesized() {
        let crd = CrdExtractor::extract_all(CRD).unwrap().remove(0);
        let tree = build_property_tree(
            &crd.versions[0].schema.properties,
            ROOT_REQUIRED_FIELDS,
            "v1",
            "Widget",
            "example.com",
            false,
        );

        assert_eq!(
            tree[0].description.as_deref(),
            Some("API version of the resource, always example.com/v1")
        );
        assert_eq!(
            tree[1].description.as_deref(),
            Some("Kind of the resource, always Widget")
        );
    }

    #[test]
    fn test_nested_kind_keeps_own_description() {
        let mut spec = BTreeMap::new();
        spec.insert("kind".to_string(), SchemaNode::string());
        let mut props = BTreeMap::new();
        props.insert("spec".to_string(), SchemaNode::object(spec));

        let tree = build_property_tree(&props, &["spec"], "v1", "Widget", "example.com", false);
        assert_eq!(tree[0].children[0].description, None);
    }

    #[test]
    fn test_required_only() {
        let crd = CrdExtractor::extract_all(CRD).unwrap().remove(0);
        let trees = VersionTree::for_crd(&crd, true).unwrap();
        let spec = &trees[0].properties[2];

        assert_eq!(names(&spec.children), vec!["size"]);
        assert_eq!(
            trees[0].yaml,
            "apiVersion: example.com/v1\nkind: Widget\nspec:\n  size: 3\n"
        );
    }

    #[test]
    fn test_additional_properties_children() {
        let mut value = BTreeMap::new();
        value.insert("host".to_string(), SchemaNode::string());
        let mut backends = SchemaNode::object(BTreeMap::new());
        backends.additional_properties =
            Some(AdditionalProperties::Schema(Box::new(SchemaNode::object(value))));
        let mut props = BTreeMap::new();
        props.insert("backends".to_string(), backends);

        let tree = build_property_tree(&props, &[] as &[&str], "v1", "Widget", "example.com", false);
        assert_eq!(names(&tree[0].children), vec!["host"]);
        assert_eq!(tree[0].type_name, PropertyType::Object.to_string());
    }

    #[test]
    fn test_descriptor_serialization() {
        let descriptor = PropertyDescriptor {
            name: "size".to_string(),
            type_name: "integer".to_string(),
            required: true,
            default: Some("3".to_string()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({
                "name": "size",
                "type": "integer",
                "nullable": false,
                "default": "3",
                "required": true,
            })
        );
    }
}
