//! Value types shared by extracted facts, the join graph and rendered routes.

use serde::{Deserialize, Serialize};
use sqlparser::ast::BinaryOperator;
use std::fmt;

/// Where a field or procedure was defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldLocation {
    pub file_path: String,
    pub line_number: usize,
}

impl FieldLocation {
    pub fn new(file_path: impl Into<String>, line_number: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line_number,
        }
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_path, self.line_number)
    }
}

/// A column reference with its table already resolved through the alias map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Parses `table.column`; the table is everything before the last dot.
    ///
    /// Text without a dot yields the degenerate reference whose table and
    /// column are both the text itself.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.rsplit_once('.') {
            Some((table, column)) => Self::new(table.trim(), column.trim()),
            None => Self::new(text, text),
        }
    }

    /// Renders the reference with `qualifier` in place of the table name.
    pub fn qualified_by(&self, qualifier: &str) -> String {
        format!("{qualifier}.{}", self.column)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Comparison operators recognised in join and filter predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    /// `<>`
    NotEq,
    /// `!=`
    BangNotEq,
}

/// Operator tokens, longest first so `>=` wins over `>`.
const OPERATOR_TOKENS: &[(&str, ComparisonOp)] = &[
    (">=", ComparisonOp::GtEq),
    ("<=", ComparisonOp::LtEq),
    ("<>", ComparisonOp::NotEq),
    ("!=", ComparisonOp::BangNotEq),
    ("==", ComparisonOp::Eq),
    ("=", ComparisonOp::Eq),
    (">", ComparisonOp::Gt),
    ("<", ComparisonOp::Lt),
];

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::GtEq => ">=",
            Self::LtEq => "<=",
            Self::NotEq => "<>",
            Self::BangNotEq => "!=",
        }
    }

    /// Maps a sqlparser comparison operator; `None` for anything else.
    pub fn from_binary_operator(op: &BinaryOperator) -> Option<Self> {
        match op {
            BinaryOperator::Eq => Some(Self::Eq),
            BinaryOperator::Gt => Some(Self::Gt),
            BinaryOperator::Lt => Some(Self::Lt),
            BinaryOperator::GtEq => Some(Self::GtEq),
            BinaryOperator::LtEq => Some(Self::LtEq),
            BinaryOperator::NotEq => Some(Self::NotEq),
            _ => None,
        }
    }

    /// The operator that keeps the predicate true when its sides are swapped.
    pub fn mirrored(&self) -> Self {
        match self {
            Self::Gt => Self::Lt,
            Self::Lt => Self::Gt,
            Self::GtEq => Self::LtEq,
            Self::LtEq => Self::GtEq,
            other => *other,
        }
    }

    /// Finds the first comparison operator outside quotes and brackets.
    ///
    /// Returns the byte range of the token and the operator.
    pub fn find_in(text: &str) -> Option<(usize, usize, Self)> {
        let bytes = text.as_bytes();
        let mut quote: Option<u8> = None;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'\'' | b'"' => quote = Some(b),
                    b'[' => quote = Some(b']'),
                    _ => {
                        let rest = &text[i..];
                        if let Some((token, op)) =
                            OPERATOR_TOKENS.iter().find(|(token, _)| rest.starts_with(token))
                        {
                            return Some((i, i + token.len(), *op));
                        }
                    }
                },
            }
            i += 1;
        }
        None
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column-to-column comparison describing how two tables relate.
///
/// Persisted in its text form `Orders.CustomerId = Customers.CustomerId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JoinPredicate {
    pub left: ColumnRef,
    pub op: ComparisonOp,
    pub right: ColumnRef,
}

impl JoinPredicate {
    pub fn new(left: ColumnRef, op: ComparisonOp, right: ColumnRef) -> Self {
        Self { left, op, right }
    }

    /// The same predicate seen from the right-hand table.
    pub fn reversed(&self) -> Self {
        Self {
            left: self.right.clone(),
            op: self.op.mirrored(),
            right: self.left.clone(),
        }
    }

    /// Splits on the first comparison token; each side is a column reference.
    pub fn parse(text: &str) -> Result<Self, String> {
        let (start, end, op) = ComparisonOp::find_in(text)
            .ok_or_else(|| format!("no comparison operator in join predicate '{text}'"))?;
        let left = text[..start].trim();
        let right = text[end..].trim();
        if left.is_empty() || right.is_empty() {
            return Err(format!("join predicate '{text}' is missing an operand"));
        }
        Ok(Self::new(ColumnRef::parse(left), op, ColumnRef::parse(right)))
    }
}

impl fmt::Display for JoinPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

impl TryFrom<String> for JoinPredicate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JoinPredicate> for String {
    fn from(value: JoinPredicate) -> Self {
        value.to_string()
    }
}

/// Column-to-literal (or variable) comparison that filters rows.
///
/// Persisted in its text form `Orders.Status = 'Open'`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterPredicate {
    pub column: ColumnRef,
    pub op: ComparisonOp,
    pub value: String,
}

impl FilterPredicate {
    pub fn new(column: ColumnRef, op: ComparisonOp, value: impl Into<String>) -> Self {
        Self {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let (start, end, op) = ComparisonOp::find_in(text)
            .ok_or_else(|| format!("no comparison operator in filter predicate '{text}'"))?;
        let column = text[..start].trim();
        let value = text[end..].trim();
        if column.is_empty() || value.is_empty() {
            return Err(format!("filter predicate '{text}' is missing an operand"));
        }
        Ok(Self::new(ColumnRef::parse(column), op, value))
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}

impl TryFrom<String> for FilterPredicate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FilterPredicate> for String {
    fn from(value: FilterPredicate) -> Self {
        value.to_string()
    }
}

/// One piece of a re-rendered output expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprSegment {
    Column(ColumnRef),
    Text(String),
}

/// An output expression kept as column references interleaved with raw text,
/// so it can be rendered again under a different alias mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExprText {
    pub segments: Vec<ExprSegment>,
}

impl ExprText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(ExprSegment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(ExprSegment::Text(text.to_string()));
        }
    }

    pub fn push_column(&mut self, column: ColumnRef) {
        self.segments.push(ExprSegment::Column(column));
    }

    pub fn append(&mut self, other: ExprText) {
        for segment in other.segments {
            match segment {
                ExprSegment::Text(text) => self.push_text(&text),
                ExprSegment::Column(column) => self.push_column(column),
            }
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.segments.iter().filter_map(|segment| match segment {
            ExprSegment::Column(column) => Some(column),
            ExprSegment::Text(_) => None,
        })
    }

    /// Renders the expression, letting `column` decide how each reference prints.
    pub fn render_with<F>(&self, mut column: F) -> String
    where
        F: FnMut(&ColumnRef) -> String,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                ExprSegment::Column(col) => out.push_str(&column(col)),
                ExprSegment::Text(text) => out.push_str(text),
            }
        }
        out
    }
}

impl fmt::Display for ExprText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(|col| col.to_string()))
    }
}
