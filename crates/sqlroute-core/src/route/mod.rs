//! Route search between two endpoints.
//!
//! Two independent modes answer a [`RouteQuery`]:
//!
//! - direct: procedures whose table set contains both endpoint tables;
//! - paths: every simple path through the [`JoinGraph`], rendered as SQL.
//!
//! Each mode returns the sentinel route when it finds nothing.

mod direct;
mod paths;
mod render;

use indexmap::IndexSet;
#[cfg(feature = "tracing")]
use tracing::info_span;

use crate::catalog::AnalysisStore;
use crate::naming::same_name;
use crate::resolver::resolve_tables;
use crate::types::{Endpoint, Route, RouteQuery};

pub use direct::find_direct_routes;
pub use paths::{enumerate_paths, find_join_paths, JoinPath};

/// Runs the requested modes: direct routes first, then join paths.
pub fn find_routes(store: &AnalysisStore, query: &RouteQuery) -> Vec<Route> {
    #[cfg(feature = "tracing")]
    let _span = info_span!(
        "find_routes",
        direct = query.direct,
        paths = query.paths,
        max_paths = ?query.max_paths
    )
    .entered();

    let mut routes = Vec::new();
    if query.direct {
        routes.extend(find_direct_routes(store, query));
    }
    if query.paths {
        routes.extend(find_join_paths(store, query));
    }
    routes
}

/// Candidate tables for one side of a query.
///
/// A field resolves through [`resolve_tables`]; a table narrows that set to
/// itself, or replaces it when the field does not live there. An unresolvable
/// field is taken as a table name.
pub fn resolve_endpoint(store: &AnalysisStore, endpoint: &Endpoint) -> IndexSet<String> {
    let Some(field) = endpoint.field.as_deref() else {
        return endpoint.table.iter().cloned().collect();
    };

    let candidates = resolve_tables(store, field);
    match endpoint.table.as_deref() {
        Some(table) => {
            let narrowed = candidates
                .iter()
                .find(|candidate| same_name(candidate, table))
                .cloned()
                .unwrap_or_else(|| table.to_string());
            IndexSet::from([narrowed])
        }
        None if candidates.is_empty() => IndexSet::from([field.to_string()]),
        None => candidates,
    }
}

/// Source/destination pairs with distinct tables, in candidate order.
fn table_pairs(store: &AnalysisStore, query: &RouteQuery) -> Vec<(String, String)> {
    let sources = resolve_endpoint(store, &query.source);
    let destinations = resolve_endpoint(store, &query.destination);
    let mut pairs = Vec::new();
    for source in &sources {
        for destination in &destinations {
            if !same_name(source, destination) {
                pairs.push((source.clone(), destination.clone()));
            }
        }
    }
    pairs
}

fn or_not_found(routes: Vec<Route>) -> Vec<Route> {
    if routes.is_empty() {
        vec![Route::not_found()]
    } else {
        routes
    }
}
