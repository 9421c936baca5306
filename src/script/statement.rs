//! A single executable SQL statement and its classification.

use std::fmt;

/// Character that ends every statement.
pub const TERMINATOR: char = ';';

/// Prefix that marks a statement as a query whose result is rendered.
const QUERY_PREFIX: &[u8] = b"select";

/// How a statement is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Produces rows that are rendered as a table.
    Query,
    /// Executed for its side effects only.
    Command,
}

impl StatementKind {
    /// Classifies SQL text by comparing its first six characters with `select`,
    /// ignoring case.
    ///
    /// Text shorter than the prefix is always a command.
    pub fn classify(sql: &str) -> Self {
        let is_query = sql
            .as_bytes()
            .get(..QUERY_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(QUERY_PREFIX));

        if is_query {
            Self::Query
        } else {
            Self::Command
        }
    }
}

/// One complete, terminated SQL statement.
///
/// Multi-line statements keep their internal newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    kind: StatementKind,
}

impl Statement {
    pub(crate) fn new(sql: String) -> Self {
        let kind = StatementKind::classify(&sql);
        Self { sql, kind }
    }

    /// Wraps already-complete SQL text.
    ///
    /// Returns `None` unless the text ends with the terminator.
    pub fn parse(sql: impl Into<String>) -> Option<Self> {
        let sql = sql.into();
        sql.ends_with(TERMINATOR).then(|| Self::new(sql))
    }

    /// Returns the statement text, terminator included.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns how the statement should be executed.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns true if the statement's result is rendered.
    pub fn is_query(&self) -> bool {
        self.kind == StatementKind::Query
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.sql
    }
}
