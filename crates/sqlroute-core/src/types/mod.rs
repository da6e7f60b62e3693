//! Types shared across the engine.
//!
//! `facts` holds what the extractor produces and the state file persists,
//! `request` and `response` are the inputs and outputs of the query API.

mod common;
mod facts;
mod request;
mod response;

pub use common::{
    ColumnRef, ComparisonOp, ExprSegment, ExprText, FieldLocation, FilterPredicate, JoinPredicate,
};
pub use facts::{
    AnalysisResult, OutputFieldExpr, ProcedureAnalysis, TableDefinition, DERIVED_TABLE,
};
pub use request::{AnalysisOptions, Dialect, Endpoint, FileSource, RouteQuery};
pub use response::{Route, RouteKind, NO_ROUTE_FOUND};
