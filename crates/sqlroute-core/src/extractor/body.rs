//! Procedure body analysis.
//!
//! One [`BodyAnalyzer`] walks the statements of one procedure. It keeps an
//! alias map keyed case-insensitively, restored when each query ends so inner
//! aliases never shadow outer ones, plus a stack of scopes so an unqualified
//! column can be resolved against the `FROM` clause that encloses it.

use std::collections::HashMap;
use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_statements, ConditionalStatementBlock, Declare, DeclareAssignment, Delete, Expr,
    FromTable, JoinConstraint, JoinOperator, Query, ReturnStatementValue, Select, SelectItem, Set,
    SetExpr, Statement, TableFactor, TableWithJoins, UpdateTableFromKind,
};

use super::procedure::ProcedureSource;
use super::SourceContext;
use crate::naming::{base_name, dotted_name, same_name, table_key};
use crate::types::{ProcedureAnalysis, DERIVED_TABLE};

/// Real tables of one `FROM` clause, in registration order.
#[derive(Debug, Default)]
pub(super) struct Scope {
    pub(super) tables: Vec<String>,
}

pub(super) struct BodyAnalyzer<'a> {
    pub(super) ctx: &'a SourceContext<'a>,
    /// Folded alias or table name to table name.
    pub(super) aliases: HashMap<String, String>,
    /// Folded CTE names visible at the current point, innermost last.
    ctes: Vec<Vec<String>>,
    pub(super) scopes: Vec<Scope>,
    pub(super) analysis: ProcedureAnalysis,
}

/// Walks a procedure body and returns what it touches.
pub fn analyze_procedure_body(
    source: &ProcedureSource<'_>,
    ctx: &SourceContext<'_>,
) -> ProcedureAnalysis {
    let mut analysis = ProcedureAnalysis::new(source.name.clone());
    analysis.location = Some(source.location.clone());

    let mut analyzer = BodyAnalyzer::new(ctx, analysis);
    for statement in source.body {
        // Nested statements (IF/WHILE blocks, BEGIN..END) are reached through
        // the visitor; each is analyzed on its own.
        let _ = visit_statements(statement, |stmt| {
            analyzer.statement(stmt);
            ControlFlow::<()>::Continue(())
        });
    }
    analyzer.analysis
}

impl<'a> BodyAnalyzer<'a> {
    pub(super) fn new(ctx: &'a SourceContext<'a>, analysis: ProcedureAnalysis) -> Self {
        Self {
            ctx,
            aliases: HashMap::new(),
            ctes: Vec::new(),
            scopes: Vec::new(),
            analysis,
        }
    }

    pub(super) fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Query(query) => self.query(query),
            Statement::Insert(insert) => {
                if let Some(source) = &insert.source {
                    self.query(source);
                }
            }
            Statement::Update {
                table,
                assignments,
                from,
                selection,
                ..
            } => {
                self.scopes.push(Scope::default());
                if let Some(from) = from {
                    let (UpdateTableFromKind::BeforeSet(tables)
                    | UpdateTableFromKind::AfterSet(tables)) = from;
                    self.from_clause(tables);
                }
                if !self.is_alias_of_other_table(&table.relation) {
                    self.from_clause(std::slice::from_ref(table));
                }
                for assignment in assignments {
                    self.expr_subqueries(&assignment.value);
                }
                if let Some(selection) = selection {
                    self.condition(selection);
                }
                self.scopes.pop();
            }
            Statement::Delete(delete) => self.delete(delete),
            Statement::CreateTable(create) => {
                if let Some(query) = &create.query {
                    self.query(query);
                }
            }
            Statement::Execute { name: Some(name), .. } => {
                self.analysis.called_procedures.insert(dotted_name(name));
            }
            Statement::Call(function) => {
                self.analysis
                    .called_procedures
                    .insert(dotted_name(&function.name));
            }
            // Only the control expressions are walked here; the statements of
            // each block are reached through the visitor.
            Statement::If(statement) => {
                self.block_condition(&statement.if_block);
                for block in &statement.elseif_blocks {
                    self.block_condition(block);
                }
                if let Some(block) = &statement.else_block {
                    self.block_condition(block);
                }
            }
            Statement::While(statement) => self.block_condition(&statement.while_block),
            Statement::Case(statement) => {
                if let Some(expr) = &statement.match_expr {
                    self.expr_subqueries(expr);
                }
                for block in &statement.when_blocks {
                    self.block_condition(block);
                }
            }
            Statement::Set(set) => match set {
                Set::SingleAssignment { values, .. }
                | Set::ParenthesizedAssignments { values, .. } => {
                    for value in values {
                        self.expr_subqueries(value);
                    }
                }
                Set::MultipleAssignments { assignments } => {
                    for assignment in assignments {
                        self.expr_subqueries(&assignment.value);
                    }
                }
                _ => {}
            },
            Statement::Declare { stmts } => {
                for declare in stmts {
                    self.declare(declare);
                }
            }
            Statement::Return(statement) => {
                if let Some(ReturnStatementValue::Expr(expr)) = &statement.value {
                    self.expr_subqueries(expr);
                }
            }
            _ => {}
        }
    }

    fn block_condition(&mut self, block: &ConditionalStatementBlock) {
        if let Some(condition) = &block.condition {
            self.expr_subqueries(condition);
        }
    }

    fn declare(&mut self, declare: &Declare) {
        if let Some(
            DeclareAssignment::Expr(expr)
            | DeclareAssignment::Default(expr)
            | DeclareAssignment::DuckAssignment(expr)
            | DeclareAssignment::For(expr)
            | DeclareAssignment::MsSqlAssignment(expr),
        ) = &declare.assignment
        {
            self.expr_subqueries(expr);
        }
        if let Some(query) = &declare.for_query {
            self.query(query);
        }
    }

    fn delete(&mut self, delete: &Delete) {
        self.scopes.push(Scope::default());
        let (FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables)) = &delete.from;
        self.from_clause(tables);
        if let Some(using) = &delete.using {
            self.from_clause(using);
        }
        if let Some(selection) = &delete.selection {
            self.condition(selection);
        }
        self.scopes.pop();
    }

    pub(super) fn query(&mut self, query: &Query) {
        // Inner queries still see outer aliases for correlation.
        let outer_aliases = self.aliases.clone();
        let mut pushed = false;
        if let Some(with) = &query.with {
            let names = with
                .cte_tables
                .iter()
                .map(|cte| table_key(&cte.alias.name.value))
                .collect();
            self.ctes.push(names);
            pushed = true;
            for cte in &with.cte_tables {
                self.query(&cte.query);
            }
        }

        self.set_expr(&query.body);

        if pushed {
            self.ctes.pop();
        }
        self.aliases = outer_aliases;
    }

    fn set_expr(&mut self, body: &SetExpr) {
        match body {
            SetExpr::Select(select) => self.select(select),
            SetExpr::Query(query) => self.query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.set_expr(left);
                self.set_expr(right);
            }
            SetExpr::Values(values) => {
                for row in &values.rows {
                    for expr in row {
                        self.expr_subqueries(expr);
                    }
                }
            }
            SetExpr::Insert(statement)
            | SetExpr::Update(statement)
            | SetExpr::Delete(statement)
            | SetExpr::Merge(statement) => self.statement(statement),
            _ => {}
        }
    }

    fn select(&mut self, select: &Select) {
        self.scopes.push(Scope::default());
        self.from_clause(&select.from);
        if let Some(selection) = &select.selection {
            self.condition(selection);
        }
        for item in &select.projection {
            match item {
                SelectItem::ExprWithAlias { expr, alias } => {
                    self.output_field(expr, alias);
                    self.expr_subqueries(expr);
                }
                SelectItem::UnnamedExpr(expr) => self.expr_subqueries(expr),
                _ => {}
            }
        }
        if let Some(having) = &select.having {
            self.expr_subqueries(having);
        }
        self.scopes.pop();
    }

    /// Registers every table of a `FROM` clause, then classifies the join
    /// conditions once all aliases are known.
    pub(super) fn from_clause(&mut self, from: &[TableWithJoins]) {
        for table in from {
            self.register_table_with_joins(table);
        }
        for table in from {
            self.join_conditions(table);
        }
    }

    fn register_table_with_joins(&mut self, table: &TableWithJoins) {
        self.register_factor(&table.relation);
        for join in &table.joins {
            self.register_factor(&join.relation);
        }
    }

    fn register_factor(&mut self, factor: &TableFactor) {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                let table = base_name(name);
                let alias = alias.as_ref().map(|a| a.name.value.clone());
                if name.0.len() == 1 && self.is_cte(&table) {
                    let key = table_key(alias.as_deref().unwrap_or(&table));
                    self.aliases.insert(key, DERIVED_TABLE.to_string());
                    return;
                }
                self.aliases
                    .entry(table_key(&table))
                    .or_insert_with(|| table.clone());
                if let Some(alias) = alias {
                    self.aliases.insert(table_key(&alias), table.clone());
                }
                self.analysis.tables.insert(table.clone());
                if let Some(scope) = self.scopes.last_mut() {
                    if !scope.tables.iter().any(|t| same_name(t, &table)) {
                        scope.tables.push(table);
                    }
                }
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                if let Some(alias) = alias {
                    self.aliases
                        .insert(table_key(&alias.name.value), DERIVED_TABLE.to_string());
                }
                self.query(subquery);
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.register_table_with_joins(table_with_joins),
            _ => {}
        }
    }

    fn join_conditions(&mut self, table: &TableWithJoins) {
        if let TableFactor::NestedJoin {
            table_with_joins, ..
        } = &table.relation
        {
            self.join_conditions(table_with_joins);
        }
        for join in &table.joins {
            if let TableFactor::NestedJoin {
                table_with_joins, ..
            } = &join.relation
            {
                self.join_conditions(table_with_joins);
            }
            if let Some(on) = join_on_expr(&join.join_operator) {
                self.condition(on);
            }
        }
    }

    fn is_cte(&self, name: &str) -> bool {
        let key = table_key(name);
        self.ctes.iter().any(|names| names.contains(&key))
    }

    /// True when an `UPDATE` target names an alias of a different table, as in
    /// `UPDATE o SET ... FROM Orders o`.
    fn is_alias_of_other_table(&self, factor: &TableFactor) -> bool {
        let TableFactor::Table { name, .. } = factor else {
            return false;
        };
        if name.0.len() != 1 {
            return false;
        }
        let target = base_name(name);
        self.aliases
            .get(&table_key(&target))
            .is_some_and(|table| !same_name(table, &target))
    }
}

pub(super) fn join_on_expr(join_operator: &JoinOperator) -> Option<&Expr> {
    let constraint = match join_operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::StraightJoin(constraint) => constraint,
        JoinOperator::AsOf { constraint, .. } => constraint,
        JoinOperator::CrossApply | JoinOperator::OuterApply => return None,
    };

    if let JoinConstraint::On(expr) = constraint {
        Some(expr)
    } else {
        None
    }
}
