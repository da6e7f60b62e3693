//! `CREATE PROCEDURE` discovery.

use sqlparser::ast::{Spanned, Statement};

use super::SourceContext;
use crate::naming::base_name;
use crate::types::FieldLocation;

/// A procedure found in a batch, borrowed from the parsed statements.
#[derive(Debug, Clone)]
pub struct ProcedureSource<'a> {
    /// Base identifier, without schema.
    pub name: String,
    pub body: &'a [Statement],
    pub location: FieldLocation,
}

/// Finds every `CREATE PROCEDURE` among the batch's statements.
pub fn discover_procedures<'a>(
    statements: &'a [Statement],
    ctx: &SourceContext<'_>,
) -> Vec<ProcedureSource<'a>> {
    statements
        .iter()
        .filter_map(|statement| match statement {
            Statement::CreateProcedure { name, body, .. } => Some(ProcedureSource {
                name: base_name(name),
                body: body.statements().as_slice(),
                location: ctx.location(name.span().start.line),
            }),
            _ => None,
        })
        .collect()
}
