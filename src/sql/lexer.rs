use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern"));

// Dots are accepted anywhere after the first digit, so `1.2.3` is one token.
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9][0-9.]*").expect("number pattern"));

pub const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER",
    "ON", "GROUP", "BY", "HAVING", "ORDER", "LIMIT", "OFFSET", "INSERT", "INTO",
    "VALUES", "UPDATE", "SET", "DELETE", "CREATE", "TABLE", "ALTER", "DROP",
    "INDEX", "CONSTRAINT", "PRIMARY", "KEY", "FOREIGN", "REFERENCES", "UNIQUE",
    "NOT", "NULL", "DEFAULT", "CHECK", "AND", "OR", "IN", "LIKE", "BETWEEN",
    "EXISTS", "CASE", "WHEN", "THEN", "ELSE", "END", "AS", "DISTINCT", "ALL",
    "UNION", "INTERSECT", "EXCEPT", "WITH", "RECURSIVE", "CAST", "EXTRACT",
];

pub const FUNCTIONS: &[&str] = &[
    "COUNT", "SUM", "AVG", "MIN", "MAX", "ROUND", "FLOOR", "CEIL", "ABS",
    "UPPER", "LOWER", "TRIM", "LENGTH", "SUBSTRING", "REPLACE", "CONCAT",
    "COALESCE", "NULLIF", "NOW", "CURRENT_DATE", "CURRENT_TIME", "DATE_ADD",
    "DATE_SUB", "YEAR", "MONTH", "DAY", "HOUR", "MINUTE", "SECOND",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    String,
    Number,
    Comment,
    Function,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Comment => "comment",
            TokenKind::Function => "function",
        }
    }
}

/// A classified slice of the input. `start..end` is the byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl Token<'_> {
    /// Case-insensitive keyword check.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|kw| self.is_keyword(kw))
    }

    pub fn is_line_comment(&self) -> bool {
        self.kind == TokenKind::Comment && self.text.starts_with("--")
    }
}

/// Splits SQL into keywords, identifiers, literals, comments and function names.
///
/// Operators and punctuation (including parentheses) produce no token. The scan
/// never fails: an unterminated string or block comment runs to the end of input.
pub fn tokenize(sql: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(c) = sql[pos..].chars().next() {
        let rest = &sql[pos..];

        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let (kind, end) = if rest.starts_with("--") {
            let end = rest.find('\n').map_or(sql.len(), |offset| pos + offset);
            (TokenKind::Comment, end)
        } else if rest.starts_with("/*") {
            let end = rest[2..]
                .find("*/")
                .map_or(sql.len(), |offset| pos + 2 + offset + 2);
            (TokenKind::Comment, end)
        } else if c == '\'' || c == '"' {
            (TokenKind::String, string_end(sql, pos, c))
        } else if let Some(m) = NUMBER.find(rest) {
            (TokenKind::Number, pos + m.end())
        } else if let Some(m) = IDENTIFIER.find(rest) {
            (classify_word(m.as_str()), pos + m.end())
        } else {
            pos += c.len_utf8();
            continue;
        };

        tokens.push(Token {
            kind,
            text: &sql[pos..end],
            start: pos,
            end,
        });
        pos = end;
    }

    tokens
}

fn classify_word(word: &str) -> TokenKind {
    if KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(word)) {
        TokenKind::Keyword
    } else if FUNCTIONS.iter().any(|f| f.eq_ignore_ascii_case(word)) {
        TokenKind::Function
    } else {
        TokenKind::Identifier
    }
}

/// Byte offset just past the closing quote, or the end of input.
fn string_end(sql: &str, start: usize, quote: char) -> usize {
    let body_start = start + quote.len_utf8();
    let mut chars = sql[body_start..].char_indices();

    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return body_start + offset + c.len_utf8();
        }
    }

    sql.len()
}
