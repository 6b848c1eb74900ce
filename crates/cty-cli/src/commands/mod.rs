//! CLI commands

pub mod describe;
pub mod generate;
pub mod schema;
pub mod validate;
