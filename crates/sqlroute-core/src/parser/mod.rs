//! Script parsing.
//!
//! T-SQL scripts are sequences of batches separated by `GO` lines. Each batch is
//! handed to sqlparser on its own so that one broken batch does not hide the
//! rest of the file. Positions reported by sqlparser are relative to the batch;
//! [`ParsedBatch::line_offset`] converts them back to file lines.

use crate::error::ParseError;
use crate::types::Dialect;
use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::parser::Parser;
use std::sync::OnceLock;

/// Statements of one successfully parsed batch.
#[derive(Debug, Clone)]
pub struct ParsedBatch {
    /// Number of file lines preceding the batch.
    pub line_offset: usize,
    pub statements: Vec<Statement>,
}

/// Result of parsing a whole script.
#[derive(Debug, Clone, Default)]
pub struct ParsedScript {
    pub batches: Vec<ParsedBatch>,
    /// One error per batch that failed, with lines relative to the file.
    pub errors: Vec<ParseError>,
}

impl ParsedScript {
    pub fn statement_count(&self) -> usize {
        self.batches.iter().map(|b| b.statements.len()).sum()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A slice of script text between separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchText {
    pub line_offset: usize,
    pub text: String,
}

fn separator_regex() -> &'static Regex {
    static GO_REGEX: OnceLock<Regex> = OnceLock::new();
    GO_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^\s*GO(\s+\d+)?\s*(--.*)?$").expect("Invalid regex pattern")
    })
}

/// Splits a script on `GO` separator lines.
///
/// Separator lines are dropped and blank batches are skipped. Dialects without
/// batch separators get the whole script as one batch.
pub fn split_batches(sql: &str, dialect: Dialect) -> Vec<BatchText> {
    if !dialect.uses_batch_separator() {
        return vec![BatchText {
            line_offset: 0,
            text: sql.to_string(),
        }];
    }

    let re = separator_regex();
    let mut batches = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start = 0;

    for (index, line) in sql.lines().enumerate() {
        if re.is_match(line) {
            push_batch(&mut batches, start, &current);
            current.clear();
            start = index + 1;
        } else {
            current.push(line);
        }
    }
    push_batch(&mut batches, start, &current);
    batches
}

fn push_batch(batches: &mut Vec<BatchText>, line_offset: usize, lines: &[&str]) {
    if lines.iter().all(|line| line.trim().is_empty()) {
        return;
    }
    batches.push(BatchText {
        line_offset,
        text: lines.join("\n"),
    });
}

/// Parse SQL using the specified dialect
pub fn parse_sql_with_dialect(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    Parser::parse_sql(sqlparser_dialect.as_ref(), sql)
        .map_err(|err| ParseError::from(err).with_dialect(dialect))
}

/// Parses every batch of a script, collecting failures instead of stopping.
pub fn parse_script(sql: &str, dialect: Dialect) -> ParsedScript {
    let mut script = ParsedScript::default();
    for batch in split_batches(sql, dialect) {
        match parse_sql_with_dialect(&batch.text, dialect) {
            Ok(statements) => script.batches.push(ParsedBatch {
                line_offset: batch.line_offset,
                statements,
            }),
            Err(err) => script.errors.push(err.with_line_offset(batch.line_offset)),
        }
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_go_lines() {
        let sql = "CREATE TABLE A (x INT)\nGO\n\nCREATE TABLE B (y INT)\ngo 2\n";
        let batches = split_batches(sql, Dialect::Mssql);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].line_offset, 0);
        assert_eq!(batches[0].text, "CREATE TABLE A (x INT)");
        assert_eq!(batches[1].line_offset, 2);
    }

    #[test]
    fn test_go_prefix_is_not_a_separator() {
        let sql = "SELECT 1\nGOTO done\nSELECT 2";
        assert_eq!(split_batches(sql, Dialect::Mssql).len(), 1);
    }

    #[test]
    fn test_no_split_for_postgres() {
        let sql = "SELECT 1;\nGO\nSELECT 2;";
        let batches = split_batches(sql, Dialect::Postgres);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].text, sql);
    }

    #[test]
    fn test_parse_valid_select() {
        let result = parse_sql_with_dialect("SELECT * FROM users", Dialect::Mssql);
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_invalid_sql() {
        let result = parse_sql_with_dialect("SELECT * FROM", Dialect::Mssql);
        let err = result.unwrap_err();
        assert_eq!(err.dialect, Some(Dialect::Mssql));
    }

    #[test]
    fn test_broken_batch_does_not_hide_others() {
        let sql = "CREATE TABLE A (x INT)\nGO\nSELECT * FROM\nGO\nCREATE TABLE B (y INT)";
        let script = parse_script(sql, Dialect::Mssql);
        assert_eq!(script.batches.len(), 2);
        assert_eq!(script.statement_count(), 2);
        assert_eq!(script.errors.len(), 1);
        assert!(script.errors[0].line() >= 3);
    }
}
