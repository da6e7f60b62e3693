//! Reading and writing the analysis state file.
//!
//! The file is a JSON array of records, each tagged with a `kind` field.
//! Records are decoded one at a time so a bad record can be reported by its
//! array index.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::PersistError;
use crate::types::{AnalysisResult, ProcedureAnalysis, TableDefinition};

/// Default name of the state file.
pub const DEFAULT_STATE_FILE: &str = "analysis_results.json";

pub fn results_to_json(results: &[AnalysisResult]) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(results)?)
}

pub fn results_from_json(json: &str) -> Result<Vec<AnalysisResult>, PersistError> {
    let records: Vec<Value> = serde_json::from_str(json)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| decode_record(index, record))
        .collect()
}

fn decode_record(index: usize, record: Value) -> Result<AnalysisResult, PersistError> {
    let kind = record
        .get("kind")
        .and_then(Value::as_str)
        .map(str::to_string);

    match kind.as_deref() {
        Some(AnalysisResult::TABLE_KIND) => serde_json::from_value::<TableDefinition>(record)
            .map(AnalysisResult::Table)
            .map_err(|source| PersistError::Record {
                index,
                kind: AnalysisResult::TABLE_KIND,
                source,
            }),
        Some(AnalysisResult::PROCEDURE_KIND) => {
            serde_json::from_value::<ProcedureAnalysis>(record)
                .map(AnalysisResult::Procedure)
                .map_err(|source| PersistError::Record {
                    index,
                    kind: AnalysisResult::PROCEDURE_KIND,
                    source,
                })
        }
        _ => Err(PersistError::UnknownVariant { index, kind }),
    }
}

pub fn save_results(path: &Path, results: &[AnalysisResult]) -> Result<(), PersistError> {
    let json = results_to_json(results)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_results(path: &Path) -> Result<Vec<AnalysisResult>, PersistError> {
    let json = fs::read_to_string(path)?;
    results_from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{procedure, table};

    #[test]
    fn round_trip_preserves_records() {
        let results = vec![
            table("Orders", &["OrderId", "CustomerId"]),
            procedure(
                "P1",
                &["Orders", "Customers"],
                &["Orders.CustomerId = Customers.CustomerId"],
                &["Orders.Status = 'Open'"],
            ),
        ];
        let json = results_to_json(&results).unwrap();
        let restored = results_from_json(&json).unwrap();
        assert_eq!(restored, results);
    }

    #[test]
    fn missing_kind_names_the_index() {
        let json = r#"[{"kind":"table","TableName":"A"},{"TableName":"B"}]"#;
        let err = results_from_json(json).unwrap_err();
        assert!(matches!(
            err,
            PersistError::UnknownVariant {
                index: 1,
                kind: None
            }
        ));
    }

    #[test]
    fn unknown_kind_is_reported() {
        let json = r#"[{"kind":"view","Name":"V"}]"#;
        let err = results_from_json(json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown analysis record at index 0: kind view"
        );
    }

    #[test]
    fn bad_predicate_text_is_a_record_error() {
        let json = r#"[{"kind":"procedure","ProcedureName":"P","JoinFields":["no operator"]}]"#;
        let err = results_from_json(json).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Record {
                index: 0,
                kind: "procedure",
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = results_from_json("{not json").unwrap_err();
        assert!(matches!(err, PersistError::Json(_)));
    }

    #[test]
    fn save_and_load_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STATE_FILE);
        let results = vec![table("Regions", &["RegionId"])];
        save_results(&path, &results).unwrap();
        assert_eq!(load_results(&path).unwrap(), results);
    }
}
