//! Join graph over tables.
//!
//! Every join predicate of every procedure becomes a pair of directed edges,
//! one per direction. The reverse edge carries the predicate with its sides
//! swapped and its operator mirrored, so the graph is symmetric. Tables are
//! keyed case-insensitively; the first spelling seen is kept for display.

use indexmap::IndexMap;

use crate::catalog::AnalysisStore;
use crate::naming::{same_name, table_key};
use crate::types::{JoinPredicate, DERIVED_TABLE};

/// A join between two tables, as written in one procedure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinEdge {
    /// Oriented so that `condition.left` is on the edge's source table.
    pub condition: JoinPredicate,
    pub procedure: String,
    /// Position of the procedure in the store's catalog.
    pub procedure_index: usize,
}

impl JoinEdge {
    /// `Orders.CustomerId=Customers.CustomerId`
    pub fn compact_condition(&self) -> String {
        format!(
            "{}{}{}",
            self.condition.left, self.condition.op, self.condition.right
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GraphNode {
    name: String,
    neighbors: IndexMap<String, Vec<JoinEdge>>,
}

/// Table adjacency with every parallel edge kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinGraph {
    nodes: IndexMap<String, GraphNode>,
}

impl JoinGraph {
    /// Builds the graph from every procedure in the store.
    pub fn build(store: &AnalysisStore) -> Self {
        let mut graph = Self::default();
        for (index, procedure) in store.procedures().iter().enumerate() {
            for predicate in &procedure.join_fields {
                graph.add_predicate(predicate, &procedure.procedure_name, index);
            }
        }
        graph
    }

    /// Adds both directions of a predicate.
    ///
    /// Self-joins and predicates on derived-table placeholders are skipped:
    /// neither can appear on a simple path between real tables.
    pub fn add_predicate(
        &mut self,
        predicate: &JoinPredicate,
        procedure: &str,
        procedure_index: usize,
    ) {
        let from = &predicate.left.table;
        let to = &predicate.right.table;
        if same_name(from, to) || same_name(from, DERIVED_TABLE) || same_name(to, DERIVED_TABLE) {
            return;
        }
        self.add_edge(
            from,
            to,
            JoinEdge {
                condition: predicate.clone(),
                procedure: procedure.to_string(),
                procedure_index,
            },
        );
        self.add_edge(
            to,
            from,
            JoinEdge {
                condition: predicate.reversed(),
                procedure: procedure.to_string(),
                procedure_index,
            },
        );
    }

    fn add_edge(&mut self, from: &str, to: &str, edge: JoinEdge) {
        self.ensure_node(to);
        let node = self.ensure_node(from);
        let edges = node.neighbors.entry(table_key(to)).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    fn ensure_node(&mut self, table: &str) -> &mut GraphNode {
        self.nodes
            .entry(table_key(table))
            .or_insert_with(|| GraphNode {
                name: table.to_string(),
                neighbors: IndexMap::new(),
            })
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.nodes.contains_key(&table_key(table))
    }

    /// Display spelling of a table.
    pub fn display_name(&self, table: &str) -> Option<&str> {
        self.nodes
            .get(&table_key(table))
            .map(|node| node.name.as_str())
    }

    /// Neighbor keys of a table, in insertion order.
    pub fn neighbors(&self, table: &str) -> impl Iterator<Item = &str> {
        self.nodes
            .get(&table_key(table))
            .into_iter()
            .flat_map(|node| node.neighbors.keys().map(String::as_str))
    }

    /// Edges from `from` to `to`; empty when the tables are not adjacent.
    pub fn edges(&self, from: &str, to: &str) -> &[JoinEdge] {
        self.nodes
            .get(&table_key(from))
            .and_then(|node| node.neighbors.get(&table_key(to)))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn table_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.nodes
            .values()
            .flat_map(|node| node.neighbors.values())
            .map(Vec::len)
            .sum()
    }
}
