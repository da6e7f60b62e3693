//! Field to table resolution.

use indexmap::IndexSet;

use crate::catalog::AnalysisStore;

/// Tables that can produce `field_name`.
///
/// A computed field is looked up by its rendered name, e.g.
/// `Total(Orders.Qty * Orders.Price)`, and yields the tables its expression
/// reads; the first matching procedure wins. Any other name yields every
/// table defining a field of that name. Both lookups ignore ASCII case.
///
/// An empty result is returned as is; callers decide on a fallback.
pub fn resolve_tables(store: &AnalysisStore, field_name: &str) -> IndexSet<String> {
    if let Some(field) = store.procedures().find_output_field(field_name) {
        return field.tables.clone();
    }
    store.schema().tables_with_field(field_name.trim())
}
