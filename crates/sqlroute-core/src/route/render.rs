//! SQL rendering of join paths.
//!
//! Tables get aliases `a`, `b`, ... in path order. Column references in join
//! conditions, filters and computed fields are rewritten through the
//! `ColumnRef` structure, so `Order.Id` is never confused with `OrderDetail.Id`.

use indexmap::{IndexMap, IndexSet};

use super::paths::JoinPath;
use crate::catalog::AnalysisStore;
use crate::naming::{alias_for_index, table_key};
use crate::types::{ColumnRef, Endpoint, JoinPredicate, Route, RouteKind, RouteQuery};

/// Folded table name to alias.
type AliasMap = IndexMap<String, String>;

pub(super) fn render_path(store: &AnalysisStore, query: &RouteQuery, path: &JoinPath<'_>) -> Route {
    let aliases: AliasMap = path
        .tables
        .iter()
        .enumerate()
        .map(|(index, table)| (table_key(table), alias_for_index(index)))
        .collect();
    let procedures = path.procedures();

    let mut lines = Vec::with_capacity(path.tables.len() + 3);
    lines.push(format!("-- joins from {}", procedures.join(",")));

    let source_table = &path.tables[0];
    let destination_table = &path.tables[path.tables.len() - 1];
    lines.push(format!(
        "select {}, {}",
        select_item(store, &query.source, source_table, &aliases),
        select_item(store, &query.destination, destination_table, &aliases)
    ));
    lines.push(format!("from {} {}", source_table, alias_for_index(0)));

    for (index, hop) in path.hops.iter().enumerate() {
        lines.push(format!(
            "join {} {} on {}",
            path.tables[index + 1],
            alias_for_index(index + 1),
            compact_condition(&hop.condition, &aliases)
        ));
    }

    let filters = collect_filters(store, &path.procedure_indices(), &aliases);
    if !filters.is_empty() {
        lines.push(format!(
            "where {}",
            filters.into_iter().collect::<Vec<_>>().join(" and ")
        ));
    }

    Route {
        kind: RouteKind::JoinPath,
        procedures,
        tables: path.tables.clone(),
        lines,
    }
}

/// `a.Col` when the column's table is on the path, `Table.Col` otherwise.
fn qualify(column: &ColumnRef, aliases: &AliasMap) -> String {
    match aliases.get(&table_key(&column.table)) {
        Some(alias) => column.qualified_by(alias),
        None => column.to_string(),
    }
}

fn compact_condition(condition: &JoinPredicate, aliases: &AliasMap) -> String {
    format!(
        "{}{}{}",
        qualify(&condition.left, aliases),
        condition.op,
        qualify(&condition.right, aliases)
    )
}

/// Select-list entry for one endpoint.
///
/// No field selects every column, a computed field is rendered from its
/// expression under its alias name, and a plain field is qualified with the
/// endpoint table's alias.
fn select_item(store: &AnalysisStore, endpoint: &Endpoint, table: &str, aliases: &AliasMap) -> String {
    let alias = aliases
        .get(&table_key(table))
        .cloned()
        .unwrap_or_else(|| table.to_string());
    let Some(field) = endpoint.field.as_deref() else {
        return format!("{alias}.*");
    };
    match store.procedures().find_output_field(field) {
        Some(computed) => format!(
            "{} as [{}]",
            computed
                .expression
                .render_with(|column| qualify(column, aliases)),
            computed.alias
        ),
        None => format!("{alias}.{field}"),
    }
}

/// Filters of the procedures whose joins make up the path, deduplicated after
/// rewriting. Same-named procedures elsewhere in the catalog do not contribute.
fn collect_filters(store: &AnalysisStore, procedures: &[usize], aliases: &AliasMap) -> IndexSet<String> {
    let mut filters = IndexSet::new();
    for procedure in procedures
        .iter()
        .filter_map(|index| store.procedures().get(*index))
    {
        for filter in &procedure.where_conditions {
            filters.insert(format!(
                "{} {} {}",
                qualify(&filter.column, aliases),
                filter.op,
                filter.value
            ));
        }
    }
    filters
}
