//! Per-file analysis entry points.
//!
//! Parse failures never abort a run: they are reported through the
//! [`LogSink`] and the statements that did parse are still extracted.

use crate::catalog::AnalysisStore;
use crate::error::ParseError;
use crate::extractor::extract_script;
use crate::parser::parse_script;
use crate::types::{AnalysisOptions, AnalysisResult, FileSource};
#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

/// Receiver for human-readable progress and diagnostic lines.
pub trait LogSink {
    fn log(&mut self, line: &str);
}

impl<F: FnMut(&str)> LogSink for F {
    fn log(&mut self, line: &str) {
        self(line)
    }
}

impl LogSink for Vec<String> {
    fn log(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Facts and parse errors for one file.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    pub file_path: String,
    pub results: Vec<AnalysisResult>,
    pub errors: Vec<ParseError>,
}

impl FileAnalysis {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parses and extracts one file.
pub fn analyze_file(
    source: &FileSource,
    options: &AnalysisOptions,
    sink: &mut dyn LogSink,
) -> FileAnalysis {
    #[cfg(feature = "tracing")]
    let _span = info_span!("analyze_file", file = %source.name, dialect = ?options.dialect).entered();

    sink.log(&format!("Processing file: {}", source.name));
    let script = parse_script(&source.content, options.dialect);
    if script.has_errors() {
        sink.log(&format!("Parse errors in {}:", source.name));
        for error in &script.errors {
            sink.log(&error.diagnostic_line());
        }
    }

    let results = extract_script(&source.name, &script);
    #[cfg(feature = "tracing")]
    debug!(
        statements = script.statement_count(),
        results = results.len(),
        errors = script.errors.len(),
        "extracted facts"
    );

    FileAnalysis {
        file_path: source.name.clone(),
        results,
        errors: script.errors,
    }
}

/// Analyzes files in order and folds every result into one store.
pub fn analyze_files<'a>(
    sources: impl IntoIterator<Item = &'a FileSource>,
    options: &AnalysisOptions,
    sink: &mut dyn LogSink,
) -> AnalysisStore {
    #[cfg(feature = "tracing")]
    let _span = info_span!("analyze_files").entered();

    let mut results = Vec::new();
    for source in sources {
        results.extend(analyze_file(source, options, sink).results);
    }
    AnalysisStore::from_results(results)
}
