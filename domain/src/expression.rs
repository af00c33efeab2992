//! Query-side expressions and the expression builder.
//!
//! An [`Expression`] is what sits on the left of a comparison or inside an
//! `ORDER BY`. It is built fresh for every query from an attribute definition
//! and the table reference the query runs against.

use crate::{AttributeDefinition, AttributeKind, TableRef, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// A column qualified by its table (or alias).
    Column { qualifier: String, name: String },
    Literal(Value),
    /// `left <operator> right`; the operator text is emitted verbatim.
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Function { name: String, args: Vec<Expression> },
}

impl Expression {
    pub fn column<S: Into<String>>(table: &TableRef, name: S) -> Self {
        Expression::Column {
            qualifier: table.qualifier().to_string(),
            name: name.into(),
        }
    }

    pub fn literal<V: Into<Value>>(v: V) -> Self {
        Expression::Literal(v.into())
    }

    pub fn infix<S: Into<String>>(operator: S, left: Expression, right: Expression) -> Self {
        Expression::Infix {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// SQL string concatenation, `left || right`.
    pub fn concat(left: Expression, right: Expression) -> Self {
        Self::infix("||", left, right)
    }

    pub fn function<S: Into<String>>(name: S, args: Vec<Expression>) -> Self {
        Expression::Function {
            name: name.into(),
            args,
        }
    }

    /// Column names this expression reads, in order of appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Column { name, .. } => out.push(name),
            Expression::Literal(_) => {}
            Expression::Infix { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expression::Function { args, .. } => {
                for a in args {
                    a.collect_columns(out);
                }
            }
        }
    }
}

/// Build the expression for `definition` as seen from `table`.
///
/// Native attributes become a direct column reference; derived attributes
/// delegate to their builder function.
pub fn build(definition: &AttributeDefinition, table: &TableRef) -> Expression {
    match &definition.kind {
        AttributeKind::Native { column, .. } => Expression::column(table, column.as_str()),
        AttributeKind::Derived { build, .. } => build(table),
    }
}
