//! Output expression rendering.
//!
//! Aliased projection items are re-rendered with every column reference
//! resolved to its table. Column references stay structured inside
//! [`ExprText`] so route rendering can substitute path aliases later.

use indexmap::IndexSet;
use sqlparser::ast::{
    Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, Spanned,
    UnaryOperator,
};

use super::body::BodyAnalyzer;
use crate::naming::is_variable;
use crate::types::{ExprText, OutputFieldExpr};

impl BodyAnalyzer<'_> {
    pub(super) fn output_field(&mut self, expr: &Expr, alias: &Ident) {
        let mut expression = ExprText::new();
        let mut tables = IndexSet::new();
        self.render_expr(expr, &mut expression, &mut tables);

        let line = match expr.span().start.line {
            0 => alias.span.start.line,
            line => line,
        };
        self.analysis.add_output_field(OutputFieldExpr {
            alias: alias.value.clone(),
            expression,
            tables,
            location: self.ctx.location(line),
        });
    }

    pub(super) fn render_expr(&self, expr: &Expr, out: &mut ExprText, tables: &mut IndexSet<String>) {
        match expr {
            Expr::Identifier(ident) if is_variable(ident) => out.push_text(&ident.value),
            Expr::Identifier(ident) => self.render_column(std::slice::from_ref(ident), out, tables),
            Expr::CompoundIdentifier(idents) => self.render_column(idents, out, tables),
            Expr::BinaryOp { left, op, right } => {
                self.render_expr(left, out, tables);
                out.push_text(&format!(" {op} "));
                self.render_expr(right, out, tables);
            }
            Expr::UnaryOp { op, expr: inner } => {
                out.push_text(&op.to_string());
                if matches!(op, UnaryOperator::Not) {
                    out.push_text(" ");
                }
                self.render_expr(inner, out, tables);
            }
            Expr::Nested(inner) => {
                out.push_text("(");
                self.render_expr(inner, out, tables);
                out.push_text(")");
            }
            Expr::Value(value) => out.push_text(&value.to_string()),
            Expr::Function(function) if is_plain_call(function) => {
                self.render_function(function, out, tables)
            }
            other => out.push_text(&other.to_string()),
        }
    }

    fn render_column(&self, idents: &[Ident], out: &mut ExprText, tables: &mut IndexSet<String>) {
        if let Some(column) = self.resolve_column(idents) {
            tables.insert(column.table.clone());
            out.push_column(column);
        }
    }

    fn render_function(&self, function: &Function, out: &mut ExprText, tables: &mut IndexSet<String>) {
        out.push_text(&function.name.to_string());
        let FunctionArguments::List(list) = &function.args else {
            return;
        };
        out.push_text("(");
        for (index, arg) in list.args.iter().enumerate() {
            if index > 0 {
                out.push_text(", ");
            }
            match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Expr(arg)) => {
                    self.render_expr(arg, out, tables)
                }
                other => out.push_text(&other.to_string()),
            }
        }
        out.push_text(")");
    }
}

/// A call whose text is just `name(arg, ...)`: no `DISTINCT`, `OVER`,
/// `FILTER`, `WITHIN GROUP` or argument clauses.
fn is_plain_call(function: &Function) -> bool {
    if function.filter.is_some()
        || function.over.is_some()
        || function.null_treatment.is_some()
        || !function.within_group.is_empty()
        || !matches!(function.parameters, FunctionArguments::None)
    {
        return false;
    }
    match &function.args {
        FunctionArguments::None => true,
        FunctionArguments::List(list) => {
            list.duplicate_treatment.is_none() && list.clauses.is_empty()
        }
        FunctionArguments::Subquery(_) => false,
    }
}
