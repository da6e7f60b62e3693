//! Corpus discovery for `scan`.

use anyhow::{bail, Context, Result};
use sqlroute_core::{AnalysisOptions, FileSource};
use std::path::Path;
use walkdir::WalkDir;

/// Read every matching file under `dir`, sorted by file name within each
/// directory.
pub fn read_corpus(dir: &Path, options: &AnalysisOptions) -> Result<Vec<FileSource>> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !options.matches_extension(path) {
            continue;
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        sources.push(FileSource::new(path.display().to_string(), content));
    }
    Ok(sources)
}
