//! Test utilities for loading fixtures and analyzing inline SQL.

use std::path::PathBuf;

use crate::catalog::AnalysisStore;
use crate::extractor::extract_script;
use crate::parser::parse_script;
use crate::types::{AnalysisResult, Dialect, ProcedureAnalysis, TableDefinition};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("tests").join("fixtures")
}

/// Load a SQL fixture file by name
pub fn load_sql_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {path:?}: {e}"))
}

/// Parse and extract one T-SQL script, failing the test on parse errors.
pub fn analyze_sql(file_path: &str, sql: &str) -> Vec<AnalysisResult> {
    let script = parse_script(sql, Dialect::Mssql);
    assert!(
        script.errors.is_empty(),
        "unexpected parse errors: {:?}",
        script.errors
    );
    extract_script(file_path, &script)
}

/// The only procedure defined by `sql`.
pub fn single_procedure(sql: &str) -> ProcedureAnalysis {
    let mut procedures: Vec<_> = analyze_sql("test.sql", sql)
        .into_iter()
        .filter_map(|result| match result {
            AnalysisResult::Procedure(procedure) => Some(procedure),
            AnalysisResult::Table(_) => None,
        })
        .collect();
    assert_eq!(procedures.len(), 1, "expected exactly one procedure");
    procedures.remove(0)
}

/// Build a store from `(file name, sql)` pairs analyzed in order.
pub fn store_from(files: &[(&str, &str)]) -> AnalysisStore {
    let results = files
        .iter()
        .flat_map(|(name, sql)| analyze_sql(name, sql))
        .collect();
    AnalysisStore::from_results(results)
}

/// Table definition shorthand for hand-built stores.
pub fn table(name: &str, fields: &[&str]) -> AnalysisResult {
    let mut table = TableDefinition::new(name);
    for (index, field) in fields.iter().enumerate() {
        table.add_field(
            *field,
            crate::types::FieldLocation::new("schema.sql", index + 2),
        );
    }
    table.into()
}

/// Procedure shorthand: `joins` and `filters` use their text forms.
pub fn procedure(name: &str, tables: &[&str], joins: &[&str], filters: &[&str]) -> AnalysisResult {
    let mut procedure = ProcedureAnalysis::new(name);
    procedure
        .tables
        .extend(tables.iter().map(|t| t.to_string()));
    for join in joins {
        procedure
            .join_fields
            .insert(crate::types::JoinPredicate::parse(join).unwrap());
    }
    for filter in filters {
        procedure
            .where_conditions
            .insert(crate::types::FilterPredicate::parse(filter).unwrap());
    }
    procedure.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        let dir = fixtures_dir();
        assert!(dir.exists(), "Fixtures directory should exist: {dir:?}");
    }

    #[test]
    fn test_load_sql_fixture() {
        let sql = load_sql_fixture("schema.sql");
        assert!(sql.contains("CREATE TABLE"), "Should contain CREATE TABLE");
    }
}
