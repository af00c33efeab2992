//! Attribute definitions: what a searchable name stands for.

use crate::{ColumnType, Expression, TableRef, Value};

/// Builds the expression for a derived attribute. Must be deterministic for a
/// given table reference.
pub type ExpressionFn = fn(&TableRef) -> Expression;

/// Maps a (coerced) comparison value to the value actually compared.
pub type FormatterFn = fn(Value) -> Value;

/// Which request kinds may use an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Both,
    SearchOnly,
    SortOnly,
}

impl Visibility {
    pub fn searchable(&self) -> bool {
        !matches!(self, Visibility::SortOnly)
    }

    pub fn sortable(&self) -> bool {
        !matches!(self, Visibility::SearchOnly)
    }
}

#[derive(Clone, Debug)]
pub enum AttributeKind {
    /// Backed directly by a stored column.
    Native { column: String, column_type: ColumnType },
    /// Computed by `build`; comparison values go through `formatter` first.
    Derived {
        build: ExpressionFn,
        formatter: Option<FormatterFn>,
        value_type: ColumnType,
    },
}

#[derive(Clone, Debug)]
pub struct AttributeDefinition {
    pub kind: AttributeKind,
    pub visibility: Visibility,
}

impl AttributeDefinition {
    pub fn native<S: Into<String>>(column: S, column_type: ColumnType) -> Self {
        Self {
            kind: AttributeKind::Native {
                column: column.into(),
                column_type,
            },
            visibility: Visibility::Both,
        }
    }

    /// A derived text attribute without a formatter.
    pub fn derived(build: ExpressionFn) -> Self {
        Self {
            kind: AttributeKind::Derived {
                build,
                formatter: None,
                value_type: ColumnType::Text,
            },
            visibility: Visibility::Both,
        }
    }

    /// Attach a formatter. No effect on native attributes.
    pub fn with_formatter(mut self, f: FormatterFn) -> Self {
        if let AttributeKind::Derived { formatter, .. } = &mut self.kind {
            *formatter = Some(f);
        }
        self
    }

    /// Override the type values are coerced to. No effect on native attributes.
    pub fn with_type(mut self, ty: ColumnType) -> Self {
        if let AttributeKind::Derived { value_type, .. } = &mut self.kind {
            *value_type = ty;
        }
        self
    }

    pub fn search_only(mut self) -> Self {
        self.visibility = Visibility::SearchOnly;
        self
    }

    pub fn sort_only(mut self) -> Self {
        self.visibility = Visibility::SortOnly;
        self
    }

    pub fn value_type(&self) -> ColumnType {
        match &self.kind {
            AttributeKind::Native { column_type, .. } => *column_type,
            AttributeKind::Derived { value_type, .. } => *value_type,
        }
    }

    pub fn formatter(&self) -> Option<FormatterFn> {
        match &self.kind {
            AttributeKind::Native { .. } => None,
            AttributeKind::Derived { formatter, .. } => *formatter,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self.kind, AttributeKind::Native { .. })
    }

    /// Apply the formatter, if any. Lists are formatted element-wise.
    pub fn format(&self, value: Value) -> Value {
        match (self.formatter(), value) {
            (None, v) => v,
            (Some(f), Value::List(items)) => Value::List(items.into_iter().map(f).collect()),
            (Some(f), v) => f(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_col(t: &TableRef) -> Expression {
        Expression::column(t, "name")
    }

    fn shout(v: Value) -> Value {
        match v {
            Value::Text(s) => Value::Text(s.to_uppercase()),
            other => other,
        }
    }

    #[test]
    fn visibility_partitions() {
        assert!(Visibility::Both.searchable() && Visibility::Both.sortable());
        assert!(Visibility::SearchOnly.searchable() && !Visibility::SearchOnly.sortable());
        assert!(!Visibility::SortOnly.searchable() && Visibility::SortOnly.sortable());
    }

    #[test]
    fn formatter_applies_per_list_element() {
        let def = AttributeDefinition::derived(name_col).with_formatter(shout);
        let got = def.format(Value::List(vec![Value::text("a"), Value::text("b")]));
        assert_eq!(got, Value::List(vec![Value::text("A"), Value::text("B")]));
    }

    #[test]
    fn native_ignores_formatter_and_type_overrides() {
        let def = AttributeDefinition::native("salary", ColumnType::Integer)
            .with_formatter(shout)
            .with_type(ColumnType::Text);
        assert!(def.formatter().is_none());
        assert_eq!(def.value_type(), ColumnType::Integer);
        assert_eq!(def.format(Value::text("x")), Value::text("x"));
    }
}
