use serde::Serialize;

use super::lexer::{tokenize, TokenKind};

const TABLE_INTRODUCERS: &[&str] = &["FROM", "JOIN", "INTO", "UPDATE"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Table names referenced directly after FROM, JOIN, INTO or UPDATE, in order
/// of first appearance. `FROM (subquery)` contributes nothing.
pub fn extract_tables(sql: &str) -> Vec<String> {
    let tokens = tokenize(sql);
    let mut tables: Vec<String> = Vec::new();

    for pair in tokens.windows(2) {
        let (token, next) = (&pair[0], &pair[1]);
        if token.is_any_keyword(TABLE_INTRODUCERS)
            && next.kind == TokenKind::Identifier
            && !tables.iter().any(|t| t == next.text)
        {
            tables.push(next.text.to_string());
        }
    }

    tables
}

/// Heuristic checks only: a SELECT needs a FROM, and parentheses must balance.
pub fn validate_sql(sql: &str) -> ValidationResult {
    let tokens = tokenize(sql);

    if tokens.is_empty() {
        return ValidationResult {
            is_valid: false,
            errors: vec!["Empty query".to_string()],
        };
    }

    let mut errors = Vec::new();

    let has_select = tokens.iter().any(|t| t.is_keyword("SELECT"));
    let has_from = tokens.iter().any(|t| t.is_keyword("FROM"));
    if has_select && !has_from {
        errors.push("SELECT statement missing FROM clause".to_string());
    }

    // Counted on raw characters: the lexer never emits parentheses.
    let depth = sql.chars().fold(0i64, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    });
    if depth != 0 {
        errors.push("Unmatched parentheses".to_string());
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}
