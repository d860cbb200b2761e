use super::lexer::{tokenize, Token, TokenKind};

const CLAUSE_KEYWORDS: &[&str] = &["SELECT", "FROM", "WHERE", "GROUP", "ORDER", "HAVING"];
const JOIN_KEYWORDS: &[&str] = &["JOIN", "INNER", "LEFT", "RIGHT", "FULL"];

/// Re-lays SQL out one clause per line.
///
/// Keywords and function names are upper-cased, everything else is copied
/// verbatim and separated by single spaces. Punctuation is dropped because the
/// lexer does not emit it, so the output is meant for display only.
pub fn format_sql(sql: &str) -> String {
    let tokens = tokenize(sql);
    let mut formatted = String::with_capacity(sql.len());
    let mut previous: Option<&Token<'_>> = None;

    for token in &tokens {
        if let Some(prev) = previous {
            if starts_new_line(token, prev) {
                formatted.push('\n');
            } else {
                formatted.push(' ');
            }
        }

        match token.kind {
            TokenKind::Keyword | TokenKind::Function => {
                formatted.push_str(&token.text.to_uppercase())
            }
            _ => formatted.push_str(token.text),
        }

        previous = Some(token);
    }

    formatted.trim().to_string()
}

fn starts_new_line(token: &Token<'_>, previous: &Token<'_>) -> bool {
    // Anything following a line comment on the same line would be commented out
    if previous.is_line_comment() {
        return true;
    }

    token.is_any_keyword(CLAUSE_KEYWORDS) || token.is_any_keyword(JOIN_KEYWORDS)
}

/// Wraps every token of `sql` in `<span class="sql-{kind}">` and HTML-escapes
/// all text, including the characters between tokens.
pub fn highlight_sql(sql: &str) -> String {
    let mut highlighted = String::with_capacity(sql.len() * 2);
    let mut last_end = 0;

    for token in tokenize(sql) {
        highlighted.push_str(&escape_html(&sql[last_end..token.start]));
        highlighted.push_str(&format!(
            "<span class=\"sql-{}\">{}</span>",
            token.kind.as_str(),
            escape_html(token.text)
        ));
        last_end = token.end;
    }

    highlighted.push_str(&escape_html(&sql[last_end..]));
    highlighted
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puts_each_clause_on_its_own_line() {
        let formatted = format_sql("select name, count(id) from users where active group by name order by name");
        assert_eq!(
            formatted,
            "SELECT name COUNT id\nFROM users\nWHERE active\nGROUP BY name\nORDER BY name"
        );
    }

    #[test]
    fn every_join_keyword_starts_a_line() {
        let formatted = format_sql("SELECT a FROM users u LEFT JOIN orders o ON u.id = o.user_id");
        assert_eq!(
            formatted,
            "SELECT a\nFROM users u\nLEFT\nJOIN orders o ON u id o user_id"
        );

        let formatted = format_sql("SELECT a FROM t LEFT JOIN s ON t.x = s.x INNER JOIN u ON 1=1");
        assert_eq!(
            formatted,
            "SELECT a\nFROM t\nLEFT\nJOIN s ON t x s x\nINNER\nJOIN u ON 1 1"
        );

        let formatted = format_sql("SELECT a FROM t JOIN s ON t.x = s.x");
        assert_eq!(formatted, "SELECT a\nFROM t\nJOIN s ON t x s x");
    }

    #[test]
    fn literals_are_kept_verbatim() {
        let formatted = format_sql("select * from t where name = 'Ann' and age > 30.5");
        assert_eq!(formatted, "SELECT\nFROM t\nWHERE name 'Ann' AND age 30.5");
    }

    #[test]
    fn line_comment_ends_its_line() {
        let formatted = format_sql("-- top users\nselect a from t");
        assert_eq!(formatted, "-- top users\nSELECT a\nFROM t");
    }

    #[test]
    fn empty_input_formats_to_empty_string() {
        assert_eq!(format_sql(""), "");
        assert_eq!(format_sql("  ;  "), "");
    }

    #[test]
    fn highlight_wraps_tokens_and_keeps_gaps() {
        let highlighted = highlight_sql("SELECT a FROM t");
        assert_eq!(
            highlighted,
            "<span class=\"sql-keyword\">SELECT</span> <span class=\"sql-identifier\">a</span> \
             <span class=\"sql-keyword\">FROM</span> <span class=\"sql-identifier\">t</span>"
        );
    }

    #[test]
    fn highlight_escapes_markup_inside_and_between_tokens() {
        let highlighted = highlight_sql("WHERE a < '<b>'");
        assert_eq!(
            highlighted,
            "<span class=\"sql-keyword\">WHERE</span> <span class=\"sql-identifier\">a</span> &lt; \
             <span class=\"sql-string\">&#39;&lt;b&gt;&#39;</span>"
        );
    }

    #[test]
    fn highlight_classes_cover_every_kind() {
        let highlighted = highlight_sql("SELECT SUM(x), 1 /* c */ FROM t");
        assert!(highlighted.contains("sql-function"));
        assert!(highlighted.contains("sql-number"));
        assert!(highlighted.contains("sql-comment"));
    }

    #[test]
    fn escape_html_handles_all_special_characters() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
