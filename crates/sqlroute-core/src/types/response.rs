//! Route search results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line emitted when a search mode finds nothing.
pub const NO_ROUTE_FOUND: &str = "No route found between source and destination.";

/// How a route was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// One or more procedures touch both endpoints.
    Direct,
    /// A chain of joins through the join graph.
    JoinPath,
    /// Sentinel for an empty search.
    NotFound,
}

/// A route rendered as printable lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub kind: RouteKind,

    /// Procedures that contributed to the route, in first-use order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub procedures: Vec<String>,

    /// Tables of a join path in path order; empty for other kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,

    pub lines: Vec<String>,
}

impl Route {
    pub fn not_found() -> Self {
        Self {
            kind: RouteKind::NotFound,
            procedures: Vec::new(),
            tables: Vec::new(),
            lines: vec![NO_ROUTE_FOUND.to_string()],
        }
    }

    pub fn direct(procedures: Vec<String>) -> Self {
        let line = format!(
            "Direct route found via procedure(s): {}",
            procedures.join(", ")
        );
        Self {
            kind: RouteKind::Direct,
            procedures,
            tables: Vec::new(),
            lines: vec![line],
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RouteKind::NotFound
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}
