//! Read-only SQL guard.
//!
//! A lexical filter for free-text queries submitted through `safe_query`.
//! It looks at keywords and a handful of character sequences; it does not
//! parse SQL. Known gaps:
//!
//! - keywords inside string literals are still seen (`SELECT 'drop'` is rejected)
//! - a `;` inside a literal followed by more text reads as a stacked query
//! - SQL functions that share a name with a banned keyword (`replace(...)`)
//!   are rejected
//! - encoded or otherwise obfuscated payloads are not decoded
//!
//! The read-only connection pool in [`crate::RosterDb`] backs this up when
//! something slips through.

use thiserror::Error;

/// The only statement a query may start with.
const READ_PREFIX: &str = "SELECT";

const FORBIDDEN_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "INSERT", "UPDATE", "ALTER", "TRUNCATE", "CREATE", "REPLACE", "EXEC",
    "EXECUTE", "ATTACH", "DETACH", "GRANT", "REVOKE", "VACUUM", "PRAGMA",
];

/// Comment markers, banned outright because they are the usual way to split a
/// keyword past a filter like this one.
const FORBIDDEN_SEQUENCES: &[&str] = &["--", "/*", "*/"];

const STATEMENT_SEPARATOR: char = ';';

/// Why a query was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlGuardError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Query contains forbidden keyword: {token}")]
    UnsafeOperation { token: String },

    #[error("Query must start with SELECT (found {keyword})")]
    NotAReadQuery { keyword: String },

    #[error("Multiple statements are not allowed")]
    StackedQueryRejected,
}

impl SqlGuardError {
    /// Stable reason code, used in structured refusals.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "EmptyQuery",
            Self::UnsafeOperation { .. } => "UnsafeOperation",
            Self::NotAReadQuery { .. } => "NotAReadQuery",
            Self::StackedQueryRejected => "StackedQueryRejected",
        }
    }
}

/// Validate that a SQL query is a single read-only SELECT.
///
/// The input is only inspected; on `Ok` the caller runs the original string.
pub fn validate_read_only(sql: &str) -> Result<(), SqlGuardError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(SqlGuardError::EmptyQuery);
    }

    let first = first_keyword(trimmed);
    if let Some(keyword) = first.as_deref() {
        if is_forbidden(keyword) {
            return Err(SqlGuardError::UnsafeOperation {
                token: keyword.to_string(),
            });
        }
    }

    // Only a SELECT is checked for stacking; other statements are refused below.
    let is_select = first.as_deref() == Some(READ_PREFIX);
    if is_select {
        validate_single_statement(trimmed)?;
    }

    for token in tokens_upper(trimmed) {
        if is_forbidden(&token) {
            return Err(SqlGuardError::UnsafeOperation { token });
        }
    }
    if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|seq| trimmed.contains(*seq)) {
        return Err(SqlGuardError::UnsafeOperation {
            token: (*seq).to_string(),
        });
    }

    match first {
        _ if is_select => Ok(()),
        Some(keyword) => Err(SqlGuardError::NotAReadQuery { keyword }),
        None => Err(SqlGuardError::NotAReadQuery {
            keyword: leading_fragment(trimmed),
        }),
    }
}

fn is_forbidden(token: &str) -> bool {
    FORBIDDEN_KEYWORDS.contains(&token)
}

/// A trailing separator is tolerated; anything after it is not.
fn validate_single_statement(sql: &str) -> Result<(), SqlGuardError> {
    if let Some(idx) = sql.find(STATEMENT_SEPARATOR) {
        let rest = &sql[idx + STATEMENT_SEPARATOR.len_utf8()..];
        if rest.chars().any(|c| !c.is_whitespace()) {
            return Err(SqlGuardError::StackedQueryRejected);
        }
    }
    Ok(())
}

fn first_keyword(sql: &str) -> Option<String> {
    // Same token rule as `tokens_upper`, so `SELECT_x` is not `SELECT`.
    let token: String = sql
        .trim_start()
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();
    if token.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        Some(token.to_ascii_uppercase())
    } else {
        None
    }
}

fn leading_fragment(sql: &str) -> String {
    sql.split_whitespace().next().unwrap_or_default().chars().take(16).collect()
}

fn tokens_upper(sql: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in sql.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(current.to_ascii_uppercase());
            current.clear();
        }
    }
    if !current.is_empty() {
        tokens.push(current.to_ascii_uppercase());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(sql: &str) -> Option<&'static str> {
        validate_read_only(sql).err().map(|e| e.reason())
    }

    #[test]
    fn test_accepts_plain_select() {
        assert!(validate_read_only("SELECT * FROM employees").is_ok());
        assert!(validate_read_only("  select name from employees where salary > 10").is_ok());
        assert!(validate_read_only("SELECT\n\tid\nFROM departments").is_ok());
        assert!(validate_read_only("SELECT 1;").is_ok());
        assert!(validate_read_only("SELECT 1;   \n").is_ok());
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(validate_read_only(""), Err(SqlGuardError::EmptyQuery));
        assert_eq!(validate_read_only("   \n\t "), Err(SqlGuardError::EmptyQuery));
    }

    #[test]
    fn test_leading_forbidden_keyword_is_unsafe() {
        for sql in [
            "DROP TABLE employees",
            "delete from employees",
            "  Insert INTO employees VALUES (1)",
            "UPDATE employees SET salary = 0",
            "ALTER TABLE employees ADD COLUMN x",
            "TRUNCATE employees",
            "CREATE TABLE foo (id INT)",
            "REPLACE INTO departments VALUES (1, 'x')",
            "EXEC sp_who",
            "ATTACH DATABASE 'x.db' AS x",
            "DROP TABLE employees; SELECT 1",
        ] {
            assert_eq!(reason(sql), Some("UnsafeOperation"), "{sql}");
        }
    }

    #[test]
    fn test_unsafe_names_the_token() {
        assert_eq!(
            validate_read_only("drop table employees"),
            Err(SqlGuardError::UnsafeOperation {
                token: "DROP".to_string()
            })
        );
        assert_eq!(
            validate_read_only("SELECT * FROM (DELETE FROM employees RETURNING *)"),
            Err(SqlGuardError::UnsafeOperation {
                token: "DELETE".to_string()
            })
        );
    }

    #[test]
    fn test_stacked_query() {
        assert_eq!(
            validate_read_only("SELECT 1; DELETE FROM employees"),
            Err(SqlGuardError::StackedQueryRejected)
        );
        assert_eq!(reason("SELECT 1;\nSELECT 2"), Some("StackedQueryRejected"));
        assert_eq!(reason("SELECT 1; x"), Some("StackedQueryRejected"));
    }

    #[test]
    fn test_not_a_read_query() {
        assert_eq!(
            validate_read_only("WITH x AS (SELECT 1) SELECT * FROM x"),
            Err(SqlGuardError::NotAReadQuery {
                keyword: "WITH".to_string()
            })
        );
        assert_eq!(reason("EXPLAIN SELECT 1"), Some("NotAReadQuery"));
        assert_eq!(reason("SHOW TABLES"), Some("NotAReadQuery"));
        assert_eq!(reason("(SELECT 1)"), Some("NotAReadQuery"));
        assert_eq!(reason("42"), Some("NotAReadQuery"));
        assert_eq!(reason("SHOW TABLES; x"), Some("NotAReadQuery"));
        assert_eq!(
            validate_read_only("SELECT_x FROM employees"),
            Err(SqlGuardError::NotAReadQuery {
                keyword: "SELECT_X".to_string()
            })
        );
        assert_eq!(reason("SELECT2 FROM employees"), Some("NotAReadQuery"));
        assert_eq!(reason("  select\tname FROM employees"), None);
    }

    #[test]
    fn test_forbidden_token_wins_over_not_a_read_query() {
        assert_eq!(reason("EXPLAIN DELETE FROM employees"), Some("UnsafeOperation"));
        assert_eq!(reason("PRAGMA table_info(employees)"), Some("UnsafeOperation"));
        assert_eq!(
            reason("WITH x AS (SELECT 1); DELETE FROM employees"),
            Some("UnsafeOperation")
        );
    }

    #[test]
    fn test_comment_markers_rejected() {
        assert_eq!(reason("SELECT 1 -- trailing"), Some("UnsafeOperation"));
        assert_eq!(reason("SELECT 1 /* note */"), Some("UnsafeOperation"));
        assert_eq!(reason("SELECT * FROM employees WHERE 1 = 1 */"), Some("UnsafeOperation"));
    }

    #[test]
    fn test_keyword_substrings_are_not_tokens() {
        assert!(validate_read_only("SELECT created_at, updated_by FROM audit").is_ok());
        assert!(validate_read_only("SELECT dropped FROM stats").is_ok());
    }

    #[test]
    fn test_known_false_positives() {
        // Literals are not parsed, so these are refused.
        assert_eq!(reason("SELECT 'drop' AS word"), Some("UnsafeOperation"));
        assert_eq!(reason("SELECT replace(name, 'a', 'b') FROM employees"), Some("UnsafeOperation"));
        assert_eq!(reason("SELECT 'a;b'"), Some("StackedQueryRejected"));
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(SqlGuardError::EmptyQuery.reason(), "EmptyQuery");
        assert_eq!(SqlGuardError::StackedQueryRejected.reason(), "StackedQueryRejected");
        assert_eq!(
            SqlGuardError::NotAReadQuery { keyword: "WITH".into() }.to_string(),
            "Query must start with SELECT (found WITH)"
        );
    }
}
