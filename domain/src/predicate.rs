//! Predicates handed to the query engine, and the query that carries them.

use serde::{Deserialize, Serialize};

use crate::{Expression, TableRef, Value};

/// Comparison operators. The names double as condition-key suffixes
/// (`name_cont`, `salary_gteq`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    NotEq,
    Cont,
    NotCont,
    Start,
    End,
    Lt,
    Lteq,
    Gt,
    Gteq,
    In,
    NotIn,
    Null,
    NotNull,
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Cont,
        Operator::NotCont,
        Operator::Start,
        Operator::End,
        Operator::Lt,
        Operator::Lteq,
        Operator::Gt,
        Operator::Gteq,
        Operator::In,
        Operator::NotIn,
        Operator::Null,
        Operator::NotNull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::NotEq => "not_eq",
            Operator::Cont => "cont",
            Operator::NotCont => "not_cont",
            Operator::Start => "start",
            Operator::End => "end",
            Operator::Lt => "lt",
            Operator::Lteq => "lteq",
            Operator::Gt => "gt",
            Operator::Gteq => "gteq",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Null => "null",
            Operator::NotNull => "not_null",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// Pattern operators only make sense on text.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Operator::Cont | Operator::NotCont | Operator::Start | Operator::End
        )
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Operator::Lt | Operator::Lteq | Operator::Gt | Operator::Gteq)
    }

    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, Operator::Null | Operator::NotNull)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// A filter: expression, operator, effective (coerced and formatted) value.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub expression: Expression,
    pub operator: Operator,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SortOrder {
    pub expression: Expression,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    Sort(SortOrder),
}

impl Predicate {
    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Predicate::Condition(c) => Some(c),
            Predicate::Sort(_) => None,
        }
    }

    pub fn as_sort(&self) -> Option<&SortOrder> {
        match self {
            Predicate::Sort(s) => Some(s),
            Predicate::Condition(_) => None,
        }
    }
}

/// Everything the engine needs to run one search. Conditions are ANDed.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub table: TableRef,
    pub conditions: Vec<Condition>,
    pub orders: Vec<SortOrder>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl SearchQuery {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    pub fn push(&mut self, predicate: Predicate) {
        match predicate {
            Predicate::Condition(c) => self.conditions.push(c),
            Predicate::Sort(s) => self.orders.push(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
        }
        assert_eq!(Operator::parse("EQ"), Some(Operator::Eq));
        assert_eq!(Operator::parse("like"), None);
    }

    #[test]
    fn push_routes_by_kind() {
        let table = TableRef::new("people");
        let mut q = SearchQuery::new(table.clone());
        q.push(Predicate::Sort(SortOrder {
            expression: Expression::column(&table, "id"),
            direction: SortDirection::Desc,
        }));
        q.push(Predicate::Condition(Condition {
            expression: Expression::column(&table, "name"),
            operator: Operator::Eq,
            value: Value::text("x"),
        }));
        assert_eq!(q.conditions.len(), 1);
        assert_eq!(q.orders.len(), 1);
    }
}
