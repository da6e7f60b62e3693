//! `CREATE TABLE` extraction.

use std::ops::ControlFlow;

use sqlparser::ast::{visit_statements, CreateTable, Spanned, Statement};

use super::SourceContext;
use crate::naming::base_name;
use crate::types::TableDefinition;

/// Collects a definition for every `CREATE TABLE`, including ones nested in
/// procedure bodies and control-flow blocks.
pub fn extract_tables(statements: &[Statement], ctx: &SourceContext<'_>) -> Vec<TableDefinition> {
    let mut tables = Vec::new();
    for statement in statements {
        let _ = visit_statements(statement, |stmt| {
            if let Statement::CreateTable(create) = stmt {
                tables.push(table_definition(create, ctx));
            }
            ControlFlow::<()>::Continue(())
        });
    }
    tables
}

fn table_definition(create: &CreateTable, ctx: &SourceContext<'_>) -> TableDefinition {
    let mut table = TableDefinition::new(base_name(&create.name));
    let fallback_line = create.name.span().start.line;
    for column in &create.columns {
        let line = match column.name.span.start.line {
            0 => fallback_line,
            line => line,
        };
        table.add_field(column.name.value.clone(), ctx.location(line));
    }
    table
}
