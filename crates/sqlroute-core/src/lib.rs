pub mod analyzer;
pub mod catalog;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod naming;
pub mod parser;
pub mod resolver;
pub mod route;
pub mod types;

// Re-export main types and functions
pub use analyzer::{analyze_file, analyze_files, FileAnalysis, LogSink};
pub use catalog::{AnalysisStore, ProcedureCatalog, SchemaCatalog};
pub use error::{ParseError, PersistError};
pub use graph::{JoinEdge, JoinGraph};
pub use parser::{parse_script, ParsedBatch, ParsedScript};
pub use resolver::resolve_tables;
pub use route::{find_direct_routes, find_join_paths, find_routes};

pub use types::{
    AnalysisOptions, AnalysisResult, ColumnRef, ComparisonOp, Dialect, Endpoint, ExprSegment,
    ExprText, FieldLocation, FileSource, FilterPredicate, JoinPredicate, OutputFieldExpr,
    ProcedureAnalysis, Route, RouteKind, RouteQuery, TableDefinition, DERIVED_TABLE,
    NO_ROUTE_FOUND,
};

#[cfg(test)]
pub mod test_utils;
