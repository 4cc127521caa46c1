//! CLI command implementations

pub mod ports;
pub mod schema;
pub mod validate;
