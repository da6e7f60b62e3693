//! Facts extracted from one script: table definitions and procedure analyses.
//!
//! These are also the persisted records. Attribute names are PascalCase and each
//! record carries a `kind` discriminant so the state file can be read back
//! without guessing which shape a record has.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::common::{ExprText, FieldLocation, FilterPredicate, JoinPredicate};
use crate::naming::same_name;

/// Placeholder table recorded for derived tables and CTE references.
pub const DERIVED_TABLE: &str = "DerivedTable";

/// Columns of one `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDefinition {
    pub table_name: String,
    /// Field names in definition order.
    #[serde(default)]
    pub field_names: IndexSet<String>,
    #[serde(default)]
    pub field_locations: IndexMap<String, FieldLocation>,
}

impl TableDefinition {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            field_names: IndexSet::new(),
            field_locations: IndexMap::new(),
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, location: FieldLocation) {
        let name = name.into();
        self.field_locations.insert(name.clone(), location);
        self.field_names.insert(name);
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_names.iter().any(|field| same_name(field, name))
    }

    pub fn field_location(&self, name: &str) -> Option<&FieldLocation> {
        self.field_locations
            .iter()
            .find(|(field, _)| same_name(field, name))
            .map(|(_, location)| location)
    }
}

/// A projection item with an explicit alias, e.g. `Qty * Price AS Total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputFieldExpr {
    pub alias: String,
    pub expression: ExprText,
    /// Tables referenced by the expression, in first-reference order.
    #[serde(default)]
    pub tables: IndexSet<String>,
    pub location: FieldLocation,
}

impl OutputFieldExpr {
    /// Name under which the field is listed and resolved: `Total(Orders.Qty * Orders.Price)`.
    pub fn display_name(&self) -> String {
        format!("{}({})", self.alias, self.expression)
    }
}

/// Everything learned from one `CREATE PROCEDURE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcedureAnalysis {
    pub procedure_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FieldLocation>,
    #[serde(default)]
    pub tables: IndexSet<String>,
    #[serde(default)]
    pub join_fields: IndexSet<JoinPredicate>,
    #[serde(default)]
    pub where_conditions: IndexSet<FilterPredicate>,
    #[serde(default)]
    pub called_procedures: IndexSet<String>,
    #[serde(default)]
    pub output_fields: IndexMap<String, OutputFieldExpr>,
}

impl ProcedureAnalysis {
    pub fn new(procedure_name: impl Into<String>) -> Self {
        Self {
            procedure_name: procedure_name.into(),
            location: None,
            tables: IndexSet::new(),
            join_fields: IndexSet::new(),
            where_conditions: IndexSet::new(),
            called_procedures: IndexSet::new(),
            output_fields: IndexMap::new(),
        }
    }

    /// Case-insensitive membership in the procedure's table set.
    pub fn uses_table(&self, table: &str) -> bool {
        self.tables.iter().any(|t| same_name(t, table))
    }

    pub fn add_output_field(&mut self, field: OutputFieldExpr) {
        self.output_fields.insert(field.alias.clone(), field);
    }
}

/// One persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalysisResult {
    Table(TableDefinition),
    Procedure(ProcedureAnalysis),
}

impl AnalysisResult {
    pub const TABLE_KIND: &'static str = "table";
    pub const PROCEDURE_KIND: &'static str = "procedure";

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => Self::TABLE_KIND,
            Self::Procedure(_) => Self::PROCEDURE_KIND,
        }
    }
}

impl From<TableDefinition> for AnalysisResult {
    fn from(value: TableDefinition) -> Self {
        Self::Table(value)
    }
}

impl From<ProcedureAnalysis> for AnalysisResult {
    fn from(value: ProcedureAnalysis) -> Self {
        Self::Procedure(value)
    }
}
