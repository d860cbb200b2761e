//! Lightweight SQL tooling: a regex-driven lexer, a display formatter, an
//! HTML highlighter and a couple of heuristic checks. There is no parser here.

pub mod analysis;
pub mod format;
pub mod lexer;

pub use analysis::{extract_tables, validate_sql, ValidationResult};
pub use format::{format_sql, highlight_sql};
