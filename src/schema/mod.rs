pub mod analyzer;
pub mod models;

pub use analyzer::{analyze_schema, generate_ddl, validate_schema, SchemaAnalysis, SchemaValidation};
pub use models::{DatabaseSchema, Dialect};
