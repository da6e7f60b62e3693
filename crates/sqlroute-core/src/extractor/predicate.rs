//! Predicate classification and column resolution.

use sqlparser::ast::{
    BinaryOperator, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, UnaryOperator,
};

use super::body::BodyAnalyzer;
use crate::naming::{is_variable, table_key};
use crate::types::{ColumnRef, ComparisonOp, FilterPredicate, JoinPredicate};

/// Guard against pathological nesting when looking for sub-queries.
const MAX_RECURSION_DEPTH: usize = 100;

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Operand {
    Column(ColumnRef),
    /// Literal, variable or placeholder, already rendered.
    Literal(String),
    Other,
}

impl BodyAnalyzer<'_> {
    /// Classifies the comparisons of a join condition or `WHERE` clause.
    ///
    /// `AND`/`OR` recurse into both sides and parentheses are transparent.
    /// `NOT` is not looked through.
    pub(super) fn condition(&mut self, expr: &Expr) {
        match expr {
            Expr::Nested(inner) => self.condition(inner),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And | BinaryOperator::Or,
                right,
            } => {
                self.condition(left);
                self.condition(right);
            }
            Expr::BinaryOp { left, op, right } => {
                if let Some(op) = ComparisonOp::from_binary_operator(op) {
                    self.comparison(left, op, right);
                }
                self.expr_subqueries(left);
                self.expr_subqueries(right);
            }
            other => self.expr_subqueries(other),
        }
    }

    fn comparison(&mut self, left: &Expr, op: ComparisonOp, right: &Expr) {
        match (self.operand(left), self.operand(right)) {
            (Operand::Column(l), Operand::Column(r)) => {
                self.analysis
                    .join_fields
                    .insert(JoinPredicate::new(l, op, r));
            }
            (Operand::Column(column), Operand::Literal(value)) => {
                self.analysis
                    .where_conditions
                    .insert(FilterPredicate::new(column, op, value));
            }
            // Column goes first, so the operator flips.
            (Operand::Literal(value), Operand::Column(column)) => {
                self.analysis
                    .where_conditions
                    .insert(FilterPredicate::new(column, op.mirrored(), value));
            }
            _ => {}
        }
    }

    pub(super) fn operand(&self, expr: &Expr) -> Operand {
        match expr {
            Expr::Nested(inner) => self.operand(inner),
            Expr::Identifier(ident) if is_variable(ident) => Operand::Literal(ident.value.clone()),
            Expr::Identifier(ident) => self
                .resolve_column(std::slice::from_ref(ident))
                .map_or(Operand::Other, Operand::Column),
            Expr::CompoundIdentifier(idents) => self
                .resolve_column(idents)
                .map_or(Operand::Other, Operand::Column),
            Expr::Value(value) => Operand::Literal(value.to_string()),
            Expr::UnaryOp {
                op: UnaryOperator::Minus | UnaryOperator::Plus,
                expr: inner,
            } if matches!(inner.as_ref(), Expr::Value(_)) => Operand::Literal(expr.to_string()),
            _ => Operand::Other,
        }
    }

    /// Resolves a column reference to its table.
    ///
    /// A qualified column looks its qualifier up in the alias map and keeps the
    /// qualifier when it is unknown. An unqualified column belongs to the only
    /// real table of the enclosing `FROM`; when there is no single table it
    /// falls back to its own name.
    pub(super) fn resolve_column(&self, idents: &[Ident]) -> Option<ColumnRef> {
        let (column, qualifier) = match idents {
            [] => return None,
            [column] => (column, None),
            [.., qualifier, column] => (column, Some(qualifier)),
        };
        let table = match qualifier {
            Some(qualifier) => self
                .aliases
                .get(&table_key(&qualifier.value))
                .cloned()
                .unwrap_or_else(|| qualifier.value.clone()),
            None => self
                .sole_table()
                .unwrap_or_else(|| column.value.clone()),
        };
        Some(ColumnRef::new(table, column.value.clone()))
    }

    fn sole_table(&self) -> Option<String> {
        match self.scopes.last().map(|scope| scope.tables.as_slice()) {
            Some([table]) => Some(table.clone()),
            _ => None,
        }
    }

    /// Analyzes every sub-query nested in an expression.
    pub(super) fn expr_subqueries(&mut self, expr: &Expr) {
        self.visit_expression_for_subqueries(expr, 0);
    }

    fn visit_expression_for_subqueries(&mut self, expr: &Expr, depth: usize) {
        if depth > MAX_RECURSION_DEPTH {
            return;
        }
        let next_depth = depth + 1;
        match expr {
            Expr::Subquery(query) => self.query(query),
            Expr::Exists { subquery, .. } => self.query(subquery),
            Expr::InSubquery {
                expr: inner,
                subquery,
                ..
            } => {
                self.visit_expression_for_subqueries(inner, next_depth);
                self.query(subquery);
            }
            Expr::BinaryOp { left, right, .. } => {
                self.visit_expression_for_subqueries(left, next_depth);
                self.visit_expression_for_subqueries(right, next_depth);
            }
            Expr::UnaryOp { expr: inner, .. }
            | Expr::Nested(inner)
            | Expr::Cast { expr: inner, .. }
            | Expr::IsNull(inner)
            | Expr::IsNotNull(inner) => self.visit_expression_for_subqueries(inner, next_depth),
            Expr::Between {
                expr: inner,
                low,
                high,
                ..
            } => {
                self.visit_expression_for_subqueries(inner, next_depth);
                self.visit_expression_for_subqueries(low, next_depth);
                self.visit_expression_for_subqueries(high, next_depth);
            }
            Expr::InList {
                expr: inner, list, ..
            } => {
                self.visit_expression_for_subqueries(inner, next_depth);
                for item in list {
                    self.visit_expression_for_subqueries(item, next_depth);
                }
            }
            Expr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                if let Some(operand) = operand {
                    self.visit_expression_for_subqueries(operand, next_depth);
                }
                for case_when in conditions {
                    self.visit_expression_for_subqueries(&case_when.condition, next_depth);
                    self.visit_expression_for_subqueries(&case_when.result, next_depth);
                }
                if let Some(else_result) = else_result {
                    self.visit_expression_for_subqueries(else_result, next_depth);
                }
            }
            Expr::Function(function) => match &function.args {
                FunctionArguments::Subquery(query) => self.query(query),
                FunctionArguments::List(list) => {
                    for arg in &list.args {
                        if let FunctionArg::Unnamed(FunctionArgExpr::Expr(arg))
                        | FunctionArg::Named {
                            arg: FunctionArgExpr::Expr(arg),
                            ..
                        } = arg
                        {
                            self.visit_expression_for_subqueries(arg, next_depth);
                        }
                    }
                }
                FunctionArguments::None => {}
            },
            _ => {}
        }
    }
}
