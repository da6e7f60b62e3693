//! Fact extraction from parsed scripts.
//!
//! Extraction runs as separate passes over the statements of a file:
//!
//! - [`schema`] collects every `CREATE TABLE`, wherever it appears.
//! - [`procedure`] finds `CREATE PROCEDURE` statements.
//! - [`body`] walks each procedure body and records tables, join and filter
//!   predicates, called procedures and aliased output expressions.
//!
//! Tables come first in the output, then procedures, each in source order.

mod body;
mod expr;
mod predicate;
mod procedure;
mod schema;

use crate::parser::{ParsedBatch, ParsedScript};
use crate::types::{AnalysisResult, FieldLocation};
#[cfg(feature = "tracing")]
use tracing::debug;

pub use body::analyze_procedure_body;
pub use procedure::{discover_procedures, ProcedureSource};
pub use schema::extract_tables;

/// Location context for one parsed batch of a file.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    pub file_path: &'a str,
    pub line_offset: usize,
}

impl<'a> SourceContext<'a> {
    pub fn new(file_path: &'a str, batch: &ParsedBatch) -> Self {
        Self {
            file_path,
            line_offset: batch.line_offset,
        }
    }

    /// Location of a 1-based batch line. Missing spans (line 0) map to the
    /// first line of the batch.
    pub fn location(&self, batch_line: u64) -> FieldLocation {
        let line = batch_line.max(1) as usize + self.line_offset;
        FieldLocation::new(self.file_path, line)
    }
}

/// Runs every pass over a parsed script.
pub fn extract_script(file_path: &str, script: &ParsedScript) -> Vec<AnalysisResult> {
    let mut results: Vec<AnalysisResult> = Vec::new();

    for batch in &script.batches {
        let ctx = SourceContext::new(file_path, batch);
        results.extend(extract_tables(&batch.statements, &ctx).into_iter().map(Into::into));
    }

    for batch in &script.batches {
        let ctx = SourceContext::new(file_path, batch);
        for source in discover_procedures(&batch.statements, &ctx) {
            let analysis = analyze_procedure_body(&source, &ctx);
            #[cfg(feature = "tracing")]
            debug!(
                procedure = %analysis.procedure_name,
                tables = analysis.tables.len(),
                joins = analysis.join_fields.len(),
                filters = analysis.where_conditions.len(),
                "analyzed procedure body"
            );
            results.push(analysis.into());
        }
    }

    results
}
