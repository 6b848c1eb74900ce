//! cty core - turn CustomResourceDefinitions into sample documents and
//! compatibility reports
//!
//! This crate provides the building blocks used by the `cty` CLI:
//! - `schema`: Typed representation of CRD OpenAPI v3 schemas
//! - `extract`: Normalize raw CRD manifests (versioned or legacy layout)
//! - `sample`: Deterministic YAML sample generation
//! - `tree`: Display-oriented property trees
//! - `validator`: Breaking-change detection between schema versions
//! - `report`: JSON, YAML and text renderings of validation reports
//! - `json_schema`: Standalone JSON Schema documents per CRD version
//!
//! ```text
//!   YAML ──► parse_documents ──► CrdExtractor ──► CrdSchema
//!                                                    │
//!                       ┌────────────────────────────┼──────────────────┐
//!                       ▼                            ▼                  ▼
//!                 SampleGenerator           build_property_tree   SchemaValidator
//!                   (YAML text)            (PropertyDescriptor)  (ValidationReport)
//! ```

pub mod error;
pub mod extract;
pub mod json_schema;
pub mod literal;
pub mod pattern;
pub mod report;
pub mod sample;
pub mod schema;
pub mod tree;
pub mod validator;

pub use error::{CtyError, Result};
pub use extract::{CrdExtractor, MAX_SCHEMA_DEPTH, parse_documents};
pub use json_schema::{JSON_SCHEMA_DIALECT, JsonSchemaDocument};
pub use pattern::PatternSampler;
pub use report::{Change, ChangeType, Summary, ValidationReport};
pub use sample::{ROOT_REQUIRED_FIELDS, SampleGenerator, SampleOptions, generate};
pub use schema::{AdditionalProperties, CrdSchema, CrdVersionSchema, PropertyType, SchemaNode};
pub use tree::{PropertyDescriptor, VersionTree, build_property_tree};
pub use validator::SchemaValidator;
