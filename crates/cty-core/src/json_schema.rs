//! JSON Schema export
//!
//! Each declared version of a CRD becomes a standalone JSON Schema document:
//! the version's root schema, a `$schema` dialect, an `$id` equal to the file
//! name the document is written to, and an `x-kubernetes-group-version-kind`
//! annotation so editors can bind the schema to matching manifests.

use serde::Serialize;

use crate::error::{CtyError, Result};
use crate::schema::{CrdSchema, CrdVersionSchema, SchemaNode};

/// Dialect declared by exported documents
pub const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupVersionKind<'a> {
    pub kind: &'a str,
    pub version: &'a str,
    pub group: &'a str,
}

/// JSON Schema document for one CRD version
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaDocument<'a> {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "$schema")]
    dialect: &'static str,
    #[serde(flatten)]
    root: &'a SchemaNode,
    #[serde(rename = "x-kubernetes-group-version-kind")]
    group_version_kind: Vec<GroupVersionKind<'a>>,
}

impl<'a> JsonSchemaDocument<'a> {
    pub fn new(crd: &'a CrdSchema, version: &'a CrdVersionSchema) -> Self {
        Self {
            id: file_name(crd, &version.name),
            dialect: JSON_SCHEMA_DIALECT,
            root: &version.schema,
            group_version_kind: vec![GroupVersionKind {
                kind: &crd.kind,
                version: &version.name,
                group: &crd.group,
            }],
        }
    }

    /// One document per declared version, in manifest order
    ///
    /// CRDs in the legacy single-schema layout declare no version and yield
    /// nothing.
    pub fn for_crd(crd: &'a CrdSchema) -> Vec<Self> {
        crd.versions
            .iter()
            .map(|version| Self::new(crd, version))
            .collect()
    }

    /// `<Kind>.<group>.<version>.schema.json`
    pub fn file_name(&self) -> &str {
        &self.id
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CtyError::Serialization(e.to_string()))
    }
}

fn file_name(crd: &CrdSchema, version: &str) -> String {
    format!("{}.{}.{}.schema.json", crd.kind, crd.group, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CrdExtractor;
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
                  minimum: 1
    - name: v2
      schema:
        openAPIV3Schema:
          type: object
"#;

    fn widget() -> CrdSchema {
        CrdExtractor::extract_all(CRD).unwrap().remove(0)
    }

    #[test]
    fn test_one_document_per_version() {
        let crd = widget();
        let docs = JsonSchemaDocument::for_crd(&crd);
        let names: Vec<&str> = docs.iter().map(JsonSchemaDocument::file_name).collect();

        assert_eq!(
            names,
            vec!["Widget.example.com.v1.schema.json", "Widget.example.com.v2.schema.json"]
        );
    }

    #[test]
    fn test_document_layout() {
        let crd = widget();
        let doc = JsonSchemaDocument::new(&crd, &crd.versions[0]);
        let value: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();

        assert_eq!(value["$id"], "Widget.example.com.v1.schema.json");
        assert_eq!(value["$schema"], JSON_SCHEMA_DIALECT);
        assert_eq!(value["type"], "object");
        assert_eq!(value["description"], "A widget");
        assert_eq!(value["properties"]["spec"]["required"], json!(["size"]));
        assert_eq!(value["properties"]["spec"]["properties"]["size"]["minimum"], json!(1.0));
        assert_eq!(
            value["x-kubernetes-group-version-kind"],
            json!([{"kind": "Widget", "version": "v1", "group": "example.com"}])
        );
    }

    #[test]
    fn test_legacy_layout_has_no_documents() {
        let crd = CrdSchema {
            kind: "Gadget".to_string(),
            validation: Some(CrdVersionSchema::default()),
            ..Default::default()
        };
        assert!(JsonSchemaDocument::for_crd(&crd).is_empty());
    }
}
