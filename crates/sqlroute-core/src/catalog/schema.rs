use indexmap::{IndexMap, IndexSet};

use crate::naming::table_key;
use crate::types::TableDefinition;

/// Table definitions by case-insensitive name. A later definition of the
/// same table replaces the earlier one outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: IndexMap<String, TableDefinition>,
}

impl SchemaCatalog {
    pub fn insert(&mut self, table: TableDefinition) {
        self.tables.insert(table_key(&table.table_name), table);
    }

    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.get(&table_key(name))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDefinition> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Names of every table that defines `field`, compared case-insensitively.
    pub fn tables_with_field(&self, field: &str) -> IndexSet<String> {
        self.tables
            .values()
            .filter(|table| table.has_field(field))
            .map(|table| table.table_name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldLocation;

    fn definition(name: &str, fields: &[&str]) -> TableDefinition {
        let mut table = TableDefinition::new(name);
        for field in fields {
            table.add_field(*field, FieldLocation::new("s.sql", 1));
        }
        table
    }

    #[test]
    fn last_definition_wins_without_merging() {
        let mut catalog = SchemaCatalog::default();
        catalog.insert(definition("Orders", &["OrderId", "Legacy"]));
        catalog.insert(definition("ORDERS", &["OrderId", "Placed"]));
        assert_eq!(catalog.len(), 1);
        let orders = catalog.table("orders").unwrap();
        assert_eq!(orders.table_name, "ORDERS");
        assert!(!orders.has_field("Legacy"));
        assert!(orders.has_field("Placed"));
    }

    #[test]
    fn tables_with_field_ignores_case() {
        let mut catalog = SchemaCatalog::default();
        catalog.insert(definition("Orders", &["CustomerId"]));
        catalog.insert(definition("Customers", &["CustomerID"]));
        catalog.insert(definition("Regions", &["RegionId"]));
        let tables: Vec<_> = catalog.tables_with_field("customerid").into_iter().collect();
        assert_eq!(tables, vec!["Orders", "Customers"]);
    }
}
