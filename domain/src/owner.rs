//! Tagged references to rows of more than one owner type.
//!
//! A polymorphic child table (notes attached to people or articles, say)
//! stores `<prefix>_type` and `<prefix>_id` columns. An [`OwnerRef`] is that
//! pair, and turns into the equality conditions that find the children.

use crate::{Condition, Expression, Operator, Row, TableRef, Value};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    pub kind: String,
    pub id: i64,
}

impl OwnerRef {
    pub fn new<S: Into<String>>(kind: S, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    /// Conditions matching rows of `table` owned by this reference.
    pub fn conditions(&self, table: &TableRef, prefix: &str) -> Vec<Condition> {
        vec![
            Condition {
                expression: Expression::column(table, format!("{prefix}_type")),
                operator: Operator::Eq,
                value: Value::text(self.kind.as_str()),
            },
            Condition {
                expression: Expression::column(table, format!("{prefix}_id")),
                operator: Operator::Eq,
                value: Value::Integer(self.id),
            },
        ]
    }

    /// Read the owner reference stored on a child row.
    pub fn from_row(row: &Row, prefix: &str) -> Option<Self> {
        let kind = row.get(&format!("{prefix}_type"))?.as_str()?.to_string();
        match row.get(&format!("{prefix}_id"))? {
            Value::Integer(id) => Some(Self { kind, id: *id }),
            _ => None,
        }
    }
}
