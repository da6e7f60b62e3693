use std::collections::HashSet;

use indexmap::IndexSet;
#[cfg(feature = "tracing")]
use tracing::debug;

use super::render::render_path;
use super::{or_not_found, table_pairs};
use crate::catalog::AnalysisStore;
use crate::graph::{JoinEdge, JoinGraph};
use crate::naming::{same_name, table_key};
use crate::types::{Route, RouteQuery};

/// A simple path through the join graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPath<'g> {
    /// Display names, source first.
    pub tables: Vec<String>,
    /// `hops[i]` joins `tables[i]` to `tables[i + 1]`.
    pub hops: Vec<&'g JoinEdge>,
}

impl JoinPath<'_> {
    /// Distinct procedures behind the hops, in first-use order.
    pub fn procedures(&self) -> Vec<String> {
        let procedures: IndexSet<&str> = self
            .hops
            .iter()
            .map(|hop| hop.procedure.as_str())
            .collect();
        procedures.into_iter().map(str::to_string).collect()
    }

    /// Catalog positions of the procedures behind the hops, in first-use order.
    pub fn procedure_indices(&self) -> Vec<usize> {
        let indices: IndexSet<usize> = self.hops.iter().map(|hop| hop.procedure_index).collect();
        indices.into_iter().collect()
    }
}

/// Path routes for every endpoint pair, capped by `max_paths`.
pub fn find_join_paths(store: &AnalysisStore, query: &RouteQuery) -> Vec<Route> {
    let graph = JoinGraph::build(store);
    #[cfg(feature = "tracing")]
    debug!(
        tables = graph.table_count(),
        edges = graph.edge_count(),
        "built join graph"
    );

    let mut routes = Vec::new();
    for (source, destination) in table_pairs(store, query) {
        let remaining = query
            .max_paths
            .map(|max| max.saturating_sub(routes.len()));
        if remaining == Some(0) {
            break;
        }
        for path in enumerate_paths(&graph, &source, &destination, remaining) {
            routes.push(render_path(store, query, &path));
        }
    }
    or_not_found(routes)
}

/// Every simple path from `source` to `destination`, trying each parallel
/// edge. Stops early once `limit` paths are found.
pub fn enumerate_paths<'g>(
    graph: &'g JoinGraph,
    source: &str,
    destination: &str,
    limit: Option<usize>,
) -> Vec<JoinPath<'g>> {
    let mut found = Vec::new();
    if same_name(source, destination)
        || !graph.contains_table(source)
        || !graph.contains_table(destination)
    {
        return found;
    }

    let start = table_key(source);
    let mut path = vec![start.clone()];
    let mut hops = Vec::new();
    let mut visited = HashSet::from([start]);
    depth_first(
        graph,
        &table_key(destination),
        &mut path,
        &mut hops,
        &mut visited,
        &mut found,
        limit,
    );
    found
}

fn depth_first<'g>(
    graph: &'g JoinGraph,
    target: &str,
    path: &mut Vec<String>,
    hops: &mut Vec<&'g JoinEdge>,
    visited: &mut HashSet<String>,
    found: &mut Vec<JoinPath<'g>>,
    limit: Option<usize>,
) {
    let Some(current) = path.last().cloned() else {
        return;
    };
    if current == target {
        found.push(JoinPath {
            tables: path
                .iter()
                .map(|key| graph.display_name(key).unwrap_or(key.as_str()).to_string())
                .collect(),
            hops: hops.clone(),
        });
        return;
    }

    for neighbor in graph.neighbors(&current) {
        if visited.contains(neighbor) {
            continue;
        }
        for edge in graph.edges(&current, neighbor) {
            if limit.is_some_and(|limit| found.len() >= limit) {
                return;
            }
            visited.insert(neighbor.to_string());
            path.push(neighbor.to_string());
            hops.push(edge);

            depth_first(graph, target, path, hops, visited, found, limit);

            hops.pop();
            path.pop();
            visited.remove(neighbor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{procedure, table};
    use crate::types::{Endpoint, NO_ROUTE_FOUND};
    use proptest::prelude::*;

    fn graph_of(joins: &[&str]) -> JoinGraph {
        JoinGraph::build(&AnalysisStore::from_results(vec![procedure(
            "P1",
            &[],
            joins,
            &[],
        )]))
    }

    #[test]
    fn finds_every_simple_path_in_a_cycle() {
        let graph = graph_of(&["A.x = B.x", "B.y = C.y", "C.z = A.z"]);
        let paths = enumerate_paths(&graph, "A", "C", None);
        let tables: Vec<_> = paths.iter().map(|p| p.tables.join(">")).collect();
        assert_eq!(tables, vec!["A>B>C", "A>C"]);
    }

    #[test]
    fn parallel_edges_yield_distinct_paths() {
        let graph = graph_of(&["A.x = B.x", "A.y = B.y"]);
        let paths = enumerate_paths(&graph, "a", "b", None);
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0].hops, paths[1].hops);
    }

    #[test]
    fn limit_caps_enumeration() {
        let graph = graph_of(&["A.x = B.x", "A.y = B.y", "A.z = B.z"]);
        assert_eq!(enumerate_paths(&graph, "A", "B", Some(2)).len(), 2);
    }

    #[test]
    fn unknown_tables_have_no_paths() {
        let graph = graph_of(&["A.x = B.x"]);
        assert!(enumerate_paths(&graph, "A", "Z", None).is_empty());
        assert!(enumerate_paths(&graph, "A", "a", None).is_empty());
    }

    #[test]
    fn procedures_are_listed_once_in_first_use_order() {
        let store = AnalysisStore::from_results(vec![
            procedure("P2", &[], &["A.x = B.x"], &[]),
            procedure("P1", &[], &["B.y = C.y", "C.z = D.z"], &[]),
        ]);
        let graph = JoinGraph::build(&store);
        let paths = enumerate_paths(&graph, "A", "D", None);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].procedures(), vec!["P2", "P1"]);
        assert_eq!(paths[0].procedure_indices(), vec![0, 1]);
    }

    #[test]
    fn max_paths_applies_across_pairs() {
        let store = AnalysisStore::from_results(vec![
            table("A", &["k"]),
            table("B", &["k"]),
            table("C", &["id"]),
            procedure("P1", &[], &["A.k = C.id", "B.k = C.id"], &[]),
        ]);
        let query = RouteQuery::new(Endpoint::field("k"), Endpoint::table("C"))
            .paths_only()
            .with_max_paths(1);
        let routes = find_join_paths(&store, &query);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].tables, vec!["A", "C"]);
    }

    #[test]
    fn no_path_gives_sentinel() {
        let store = AnalysisStore::from_results(vec![
            procedure("P1", &[], &["A.x = B.x"], &[]),
            procedure("P2", &[], &["C.x = D.x"], &[]),
        ]);
        let query = RouteQuery::new(Endpoint::table("A"), Endpoint::table("D")).paths_only();
        let routes = find_join_paths(&store, &query);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].lines, vec![NO_ROUTE_FOUND]);
    }

    fn edge_strategy() -> impl Strategy<Value = (usize, usize)> {
        (0usize..6, 0usize..6)
    }

    proptest! {
        #[test]
        fn paths_are_simple_and_connected(edges in prop::collection::vec(edge_strategy(), 0..15)) {
            let names = ["T0", "T1", "T2", "T3", "T4", "T5"];
            let joins: Vec<String> = edges
                .iter()
                .map(|(l, r)| format!("{}.k = {}.k", names[*l], names[*r]))
                .collect();
            let joins: Vec<&str> = joins.iter().map(String::as_str).collect();
            let graph = graph_of(&joins);

            for path in enumerate_paths(&graph, "T0", "T5", None) {
                let unique: HashSet<_> = path.tables.iter().map(|t| table_key(t)).collect();
                prop_assert_eq!(unique.len(), path.tables.len());
                prop_assert_eq!(path.hops.len() + 1, path.tables.len());
                prop_assert!(same_name(&path.tables[0], "T0"));
                prop_assert!(same_name(path.tables.last().unwrap(), "T5"));
                for (index, hop) in path.hops.iter().enumerate() {
                    prop_assert!(same_name(&hop.condition.left.table, &path.tables[index]));
                    prop_assert!(same_name(&hop.condition.right.table, &path.tables[index + 1]));
                }
            }
        }
    }
}
