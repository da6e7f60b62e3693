//! Catalogs built from analysis results.
//!
//! An [`AnalysisStore`] is always built from a complete list of results, either
//! right after a scan or after loading the state file. It is never patched in
//! place; a new scan produces a new store.

mod persist;
mod procedures;
mod schema;

use std::path::Path;

use indexmap::IndexSet;
use serde::Serialize;

use crate::error::PersistError;
use crate::naming::{same_name, table_key};
use crate::types::{AnalysisResult, FieldLocation, TableDefinition};

pub use persist::{
    load_results, results_from_json, results_to_json, save_results, DEFAULT_STATE_FILE,
};
pub use procedures::ProcedureCatalog;
pub use schema::SchemaCatalog;

/// A place where a name is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    /// What was found, e.g. `field Orders.OrderId` or `procedure usp_Load`.
    pub label: String,
    pub location: FieldLocation,
}

/// Analysis results plus the catalogs derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStore {
    results: Vec<AnalysisResult>,
    schema: SchemaCatalog,
    procedures: ProcedureCatalog,
}

impl AnalysisStore {
    /// Folds results in order; later table definitions replace earlier ones.
    pub fn from_results(results: Vec<AnalysisResult>) -> Self {
        let mut schema = SchemaCatalog::default();
        let mut procedures = ProcedureCatalog::default();
        for result in &results {
            match result {
                AnalysisResult::Table(table) => schema.insert(table.clone()),
                AnalysisResult::Procedure(procedure) => procedures.push(procedure.clone()),
            }
        }
        Self {
            results,
            schema,
            procedures,
        }
    }

    pub fn load(path: &Path) -> Result<Self, PersistError> {
        Ok(Self::from_results(load_results(path)?))
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        save_results(path, &self.results)
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn schema(&self) -> &SchemaCatalog {
        &self.schema
    }

    pub fn procedures(&self) -> &ProcedureCatalog {
        &self.procedures
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Defined table names, sorted and deduplicated ignoring case.
    pub fn list_all_tables(&self) -> Vec<String> {
        sorted_unique(self.schema.tables().map(|table| table.table_name.clone()))
    }

    /// Table fields plus rendered computed fields, sorted and deduplicated
    /// ignoring case.
    pub fn list_all_fields(&self) -> Vec<String> {
        let table_fields = self
            .schema
            .tables()
            .flat_map(|table| table.field_names.iter().cloned());
        let computed = self
            .procedures
            .output_fields()
            .map(|field| field.display_name());
        sorted_unique(table_fields.chain(computed))
    }

    /// Fields of one table in definition order; empty for unknown tables.
    pub fn fields_of(&self, table: &str) -> Vec<String> {
        self.schema
            .table(table)
            .map(|table| table.field_names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Names of all procedures in scan order.
    pub fn procedure_names(&self) -> Vec<String> {
        self.procedures
            .iter()
            .map(|procedure| procedure.procedure_name.clone())
            .collect()
    }

    pub fn field_location(&self, table: &str, field: &str) -> Option<&FieldLocation> {
        self.schema.table(table)?.field_location(field)
    }

    pub fn procedure_location(&self, name: &str) -> Option<&FieldLocation> {
        self.procedures.find(name)?.location.as_ref()
    }

    /// Every definition of `name`: procedures, table fields and computed fields.
    /// With a table, only that table's field is considered.
    pub fn locate(&self, name: &str, table: Option<&str>) -> Vec<Definition> {
        if let Some(table) = table {
            return self
                .schema
                .table(table)
                .and_then(|definition| field_definition(definition, name))
                .into_iter()
                .collect();
        }

        let mut found = Vec::new();
        for procedure in self.procedures.iter() {
            if procedure.procedure_name.eq_ignore_ascii_case(name) {
                if let Some(location) = &procedure.location {
                    found.push(Definition {
                        label: format!("procedure {}", procedure.procedure_name),
                        location: location.clone(),
                    });
                }
            }
        }
        found.extend(
            self.schema
                .tables()
                .filter_map(|definition| field_definition(definition, name)),
        );
        for field in self.procedures.output_fields() {
            if field.display_name().eq_ignore_ascii_case(name)
                || field.alias.eq_ignore_ascii_case(name)
            {
                found.push(Definition {
                    label: format!("computed field {}", field.display_name()),
                    location: field.location.clone(),
                });
            }
        }
        found
    }
}

fn field_definition(table: &TableDefinition, name: &str) -> Option<Definition> {
    table
        .field_locations
        .iter()
        .find(|(field, _)| same_name(field, name))
        .map(|(field, location)| Definition {
            label: format!("field {}.{}", table.table_name, field),
            location: location.clone(),
        })
}

fn sorted_unique(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = IndexSet::new();
    let mut unique: Vec<String> = names
        .filter(|name| seen.insert(table_key(name)))
        .collect();
    unique.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{procedure, store_from, table};

    #[test]
    fn listings_are_sorted_and_deduplicated() {
        let store = AnalysisStore::from_results(vec![
            table("orders", &["OrderId", "CustomerId"]),
            table("Customers", &["customerid", "Name"]),
            table("Orders", &["OrderId", "Placed"]),
        ]);
        assert_eq!(store.list_all_tables(), vec!["Customers", "Orders"]);
        assert_eq!(
            store.list_all_fields(),
            vec!["customerid", "Name", "OrderId", "Placed"]
        );
        assert_eq!(store.fields_of("ORDERS"), vec!["OrderId", "Placed"]);
        assert!(store.fields_of("Missing").is_empty());
    }

    #[test]
    fn computed_fields_are_listed() {
        let store = store_from(&[(
            "p.sql",
            "CREATE PROCEDURE P1 AS\nBEGIN\n    SELECT o.Qty * o.Price AS Total FROM Orders o;\nEND",
        )]);
        assert_eq!(
            store.list_all_fields(),
            vec!["Total(Orders.Qty * Orders.Price)"]
        );
    }

    #[test]
    fn locate_finds_procedures_and_fields() {
        let store = store_from(&[
            ("schema.sql", "CREATE TABLE Orders (\n    OrderId INT\n)"),
            (
                "procs.sql",
                "CREATE PROCEDURE OrderId AS\nBEGIN\n    SELECT 1;\nEND",
            ),
        ]);
        let found = store.locate("orderid", None);
        let labels: Vec<_> = found.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["procedure OrderId", "field Orders.OrderId"]);
        assert_eq!(found[1].location, FieldLocation::new("schema.sql", 2));

        let scoped = store.locate("OrderId", Some("orders"));
        assert_eq!(scoped.len(), 1);
        assert_eq!(
            store.procedure_location("orderid"),
            Some(&FieldLocation::new("procs.sql", 1))
        );
    }

    #[test]
    fn store_keeps_results_in_order() {
        let results = vec![
            procedure("P1", &["A"], &[], &[]),
            table("A", &["x"]),
        ];
        let store = AnalysisStore::from_results(results.clone());
        assert_eq!(store.results(), results.as_slice());
        assert_eq!(store.procedures().len(), 1);
        assert_eq!(store.schema().len(), 1);
    }
}
