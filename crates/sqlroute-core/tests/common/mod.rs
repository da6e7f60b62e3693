use std::path::PathBuf;

use sqlroute_core::{analyze_files, AnalysisOptions, AnalysisStore, FileSource};

pub fn fixture(name: &str) -> FileSource {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {path:?}: {e}"));
    FileSource::new(name, content)
}

/// Store built from the sales fixtures, with the log lines it produced.
pub fn sales_store() -> (AnalysisStore, Vec<String>) {
    let sources = [fixture("schema.sql"), fixture("procedures.sql")];
    let mut lines: Vec<String> = Vec::new();
    let store = analyze_files(&sources, &AnalysisOptions::default(), &mut lines);
    (store, lines)
}
