use crate::naming::same_name;
use crate::types::{OutputFieldExpr, ProcedureAnalysis};

/// Every analyzed procedure in scan order. Same-named procedures are all kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcedureCatalog {
    procedures: Vec<ProcedureAnalysis>,
}

impl ProcedureCatalog {
    pub fn push(&mut self, procedure: ProcedureAnalysis) {
        self.procedures.push(procedure);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcedureAnalysis> {
        self.procedures.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ProcedureAnalysis> {
        self.procedures.get(index)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// First procedure with the given name.
    pub fn find(&self, name: &str) -> Option<&ProcedureAnalysis> {
        self.procedures
            .iter()
            .find(|procedure| same_name(&procedure.procedure_name, name))
    }

    /// Procedures whose table set contains both tables.
    pub fn using_both(
        &self,
        first: &str,
        second: &str,
    ) -> impl Iterator<Item = &ProcedureAnalysis> {
        let first = first.to_string();
        let second = second.to_string();
        self.procedures
            .iter()
            .filter(move |procedure| procedure.uses_table(&first) && procedure.uses_table(&second))
    }

    /// Every output field of every procedure, in catalog order.
    pub fn output_fields(&self) -> impl Iterator<Item = &OutputFieldExpr> {
        self.procedures
            .iter()
            .flat_map(|procedure| procedure.output_fields.values())
    }

    /// First output field whose rendered name matches `name` case-insensitively.
    pub fn find_output_field(&self, name: &str) -> Option<&OutputFieldExpr> {
        self.output_fields()
            .find(|field| field.display_name().eq_ignore_ascii_case(name.trim()))
    }
}
