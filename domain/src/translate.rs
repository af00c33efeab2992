//! Predicate translator: attribute name + operator + raw value → predicate.
//!
//! Translation is a pure function of the (immutable) registry and the call
//! arguments. Condition keys follow the `<attribute>_<operator>` convention,
//! e.g. `reversed_name_eq` or `salary_gteq`, and sort specs are
//! `"<attribute> [asc|desc]"`.

use tracing::debug;

use crate::expression::build;
use crate::validate::{check_filter_operator, check_sort};
use crate::{
    AttributeRegistry, Condition, CoreError, EntityDescriptor, Expression, Operator, Predicate,
    SearchQuery, SortDirection, SortOrder, TableRef, Value,
};

/// Raw search request: condition keys with their values, sort specs, paging.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchParams {
    pub conditions: Vec<(String, Value)>,
    pub sorts: Vec<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    pub fn sort<S: Into<String>>(mut self, spec: S) -> Self {
        self.sorts.push(spec.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

pub struct PredicateTranslator<'a> {
    registry: &'a AttributeRegistry,
}

impl<'a> PredicateTranslator<'a> {
    pub fn new(registry: &'a AttributeRegistry) -> Self {
        Self { registry }
    }

    /// Translate a filter on `name` against the entity's own table.
    pub fn translate(
        &self,
        entity: &str,
        name: &str,
        operator: Operator,
        raw: Value,
    ) -> Result<Predicate, CoreError> {
        let table = self.registry.entity(entity)?.table_ref();
        self.translate_in(entity, &table, name, operator, raw)
    }

    /// Like [`translate`](Self::translate), against an explicit (possibly
    /// aliased) table reference.
    pub fn translate_in(
        &self,
        entity: &str,
        table: &TableRef,
        name: &str,
        operator: Operator,
        raw: Value,
    ) -> Result<Predicate, CoreError> {
        let def = self.registry.resolve(entity, name)?;
        check_filter_operator(def, operator)
            .map_err(|reason| unsupported(entity, name, operator.as_str(), reason))?;

        let invalid = |reason: String| CoreError::InvalidValue {
            entity: entity.to_string(),
            name: name.to_string(),
            reason,
        };

        let value = if !operator.takes_value() {
            Value::Null
        } else {
            let raw = match (operator.takes_list(), raw) {
                (_, Value::Null) => return Err(invalid("missing value".into())),
                (true, Value::List(items)) if items.is_empty() => {
                    return Err(invalid("empty list".into()))
                }
                (true, Value::List(items)) if items.iter().any(Value::is_null) => {
                    return Err(invalid("missing value in list".into()))
                }
                (true, Value::List(items)) => Value::List(items),
                (true, scalar) => Value::List(vec![scalar]),
                (false, Value::List(_)) => {
                    return Err(invalid(format!("{} expects a single value", operator.as_str())))
                }
                (false, scalar) => scalar,
            };
            let coerced = raw.coerce(def.value_type()).map_err(invalid)?;
            def.format(coerced)
        };

        Ok(Predicate::Condition(Condition {
            expression: build(def, table),
            operator,
            value,
        }))
    }

    /// Translate an ordering on `name`.
    pub fn translate_sort(
        &self,
        entity: &str,
        name: &str,
        direction: SortDirection,
    ) -> Result<Predicate, CoreError> {
        let table = self.registry.entity(entity)?.table_ref();
        self.translate_sort_in(entity, &table, name, direction)
    }

    pub fn translate_sort_in(
        &self,
        entity: &str,
        table: &TableRef,
        name: &str,
        direction: SortDirection,
    ) -> Result<Predicate, CoreError> {
        let def = self.registry.resolve(entity, name)?;
        check_sort(def).map_err(|reason| unsupported(entity, name, direction.as_str(), reason))?;
        Ok(Predicate::Sort(SortOrder {
            expression: build(def, table),
            direction,
        }))
    }

    /// Translate a condition key such as `reversed_name_eq`.
    pub fn translate_key(&self, entity: &str, key: &str, raw: Value) -> Result<Predicate, CoreError> {
        let descriptor = self.registry.entity(entity)?;
        let (name, operator) = split_condition_key(descriptor, key)?;
        self.translate(entity, name, operator, raw)
    }

    /// Translate a sort spec such as `"name desc"`.
    pub fn parse_sort(&self, entity: &str, spec: &str) -> Result<Predicate, CoreError> {
        let mut parts = spec.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let direction = match parts.next() {
            None => SortDirection::Asc,
            Some(d) => SortDirection::parse(d).ok_or_else(|| {
                unsupported(entity, name, d, "sort direction must be asc or desc".into())
            })?,
        };
        if parts.next().is_some() {
            return Err(CoreError::InvalidValue {
                entity: entity.to_string(),
                name: name.to_string(),
                reason: format!("malformed sort spec {spec:?}"),
            });
        }
        self.translate_sort(entity, name, direction)
    }

    /// Translate a whole request into a query for the engine. Queries with
    /// no explicit sort get the entity's default order.
    pub fn build_query(&self, entity: &str, params: &SearchParams) -> Result<SearchQuery, CoreError> {
        let descriptor = self.registry.entity(entity)?;
        let table = descriptor.table_ref();
        let mut query = SearchQuery::new(table.clone());

        for (key, raw) in &params.conditions {
            query.push(self.translate_key(entity, key, raw.clone())?);
        }
        for spec in &params.sorts {
            query.push(self.parse_sort(entity, spec)?);
        }
        if query.orders.is_empty() {
            for (column, direction) in descriptor.default_order() {
                query.orders.push(SortOrder {
                    expression: Expression::column(&table, column.as_str()),
                    direction: *direction,
                });
            }
        }
        query.limit = params.limit;
        query.offset = params.offset;

        debug!(
            entity,
            conditions = query.conditions.len(),
            orders = query.orders.len(),
            "query built"
        );
        Ok(query)
    }
}

/// Split `key` into a registered attribute name and an operator, trying the
/// longest operator suffixes first so `name_not_eq` is not read as
/// `name_not` + `eq`.
pub fn split_condition_key<'k>(
    descriptor: &EntityDescriptor,
    key: &'k str,
) -> Result<(&'k str, Operator), CoreError> {
    let mut ops = Operator::ALL;
    ops.sort_by_key(|op| std::cmp::Reverse(op.as_str().len()));

    let mut first_guess = None;
    for op in ops {
        let Some(name) = key
            .strip_suffix(op.as_str())
            .and_then(|rest| rest.strip_suffix('_'))
        else {
            continue;
        };
        if descriptor.attribute(name).is_some() {
            return Ok((name, op));
        }
        first_guess.get_or_insert(name);
    }
    Err(CoreError::UnknownAttribute {
        entity: descriptor.name().to_string(),
        name: first_guess.unwrap_or(key).to_string(),
    })
}

fn unsupported(entity: &str, name: &str, operator: &str, reason: String) -> CoreError {
    CoreError::UnsupportedOperator {
        entity: entity.to_string(),
        name: name.to_string(),
        operator: operator.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttributeDefinition, ColumnType};

    fn name_col(t: &TableRef) -> Expression {
        Expression::column(t, "name")
    }

    fn doubled_name(t: &TableRef) -> Expression {
        Expression::concat(Expression::column(t, "name"), Expression::column(t, "name"))
    }

    fn reverse(v: Value) -> Value {
        match v {
            Value::Text(s) => Value::Text(s.chars().rev().collect()),
            other => other,
        }
    }

    fn mark_search(v: Value) -> Value {
        Value::Text(format!("only_search{v}"))
    }

    fn registry() -> AttributeRegistry {
        let mut reg = AttributeRegistry::new();
        reg.add_entity(
            EntityDescriptor::new("Person", "people").with_default_order("id", SortDirection::Desc),
        )
        .unwrap();
        for (name, ty) in [
            ("id", ColumnType::Integer),
            ("name", ColumnType::Text),
            ("salary", ColumnType::Integer),
            ("awesome", ColumnType::Boolean),
        ] {
            reg.register("Person", name, AttributeDefinition::native(name, ty))
                .unwrap();
        }
        reg.register(
            "Person",
            "reversed_name",
            AttributeDefinition::derived(name_col).with_formatter(reverse),
        )
        .unwrap();
        reg.register("Person", "doubled_name", AttributeDefinition::derived(doubled_name))
            .unwrap();
        reg.register(
            "Person",
            "only_search",
            AttributeDefinition::derived(doubled_name)
                .with_formatter(mark_search)
                .search_only(),
        )
        .unwrap();
        reg.register(
            "Person",
            "only_sort",
            AttributeDefinition::derived(doubled_name).sort_only(),
        )
        .unwrap();
        reg
    }

    fn condition(p: Predicate) -> Condition {
        match p {
            Predicate::Condition(c) => c,
            other => panic!("expected condition, got {other:?}"),
        }
    }

    #[test]
    fn reversed_name_formats_value() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let c = condition(
            tr.translate("Person", "reversed_name", Operator::Eq, Value::text("abc"))
                .unwrap(),
        );
        assert_eq!(c.expression, Expression::column(&TableRef::new("people"), "name"));
        assert_eq!(c.operator, Operator::Eq);
        assert_eq!(c.value, Value::text("cba"));
    }

    #[test]
    fn doubled_name_keeps_value() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let c = condition(
            tr.translate("Person", "doubled_name", Operator::Eq, Value::text("x"))
                .unwrap(),
        );
        assert_eq!(c.expression, doubled_name(&TableRef::new("people")));
        assert_eq!(c.value, Value::text("x"));
    }

    #[test]
    fn formatter_is_deterministic() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let a = tr.translate("Person", "only_search", Operator::Eq, Value::text("v")).unwrap();
        let b = tr.translate("Person", "only_search", Operator::Eq, Value::text("v")).unwrap();
        assert_eq!(a, b);
        assert_eq!(condition(a).value, Value::text("only_searchv"));
    }

    #[test]
    fn only_search_cannot_sort_and_only_sort_cannot_filter() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        assert!(matches!(
            tr.translate_sort("Person", "only_search", SortDirection::Asc),
            Err(CoreError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            tr.translate("Person", "only_sort", Operator::Eq, Value::text("x")),
            Err(CoreError::UnsupportedOperator { .. })
        ));
        let s = tr
            .translate_sort("Person", "only_sort", SortDirection::Desc)
            .unwrap();
        assert_eq!(s.as_sort().map(|s| s.direction), Some(SortDirection::Desc));
    }

    #[test]
    fn unknown_attribute_propagates() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let err = tr
            .translate("Person", "nickname", Operator::Eq, Value::text("x"))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownAttribute {
                entity: "Person".into(),
                name: "nickname".into()
            }
        );
    }

    #[test]
    fn operator_type_mismatch_is_rejected() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let err = tr
            .translate("Person", "salary", Operator::Cont, Value::text("1"))
            .unwrap_err();
        match err {
            CoreError::UnsupportedOperator { entity, name, operator, .. } => {
                assert_eq!((entity.as_str(), name.as_str(), operator.as_str()), ("Person", "salary", "cont"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn values_are_coerced_before_formatting() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let c = condition(tr.translate("Person", "salary", Operator::Gteq, Value::text("100")).unwrap());
        assert_eq!(c.value, Value::Integer(100));
        let err = tr
            .translate("Person", "salary", Operator::Eq, Value::text("lots"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { .. }));
    }

    #[test]
    fn list_operators() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let c = condition(
            tr.translate(
                "Person",
                "reversed_name",
                Operator::In,
                Value::List(vec![Value::text("ab"), Value::text("cd")]),
            )
            .unwrap(),
        );
        assert_eq!(c.value, Value::List(vec![Value::text("ba"), Value::text("dc")]));

        let c = condition(tr.translate("Person", "id", Operator::In, Value::Integer(3)).unwrap());
        assert_eq!(c.value, Value::List(vec![Value::Integer(3)]));

        assert!(tr
            .translate("Person", "id", Operator::Eq, Value::List(vec![Value::Integer(1)]))
            .is_err());
        assert!(tr
            .translate("Person", "id", Operator::In, Value::List(vec![]))
            .is_err());
        assert!(matches!(
            tr.translate(
                "Person",
                "only_search",
                Operator::In,
                Value::List(vec![Value::text("ab"), Value::Null]),
            ),
            Err(CoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn null_operators_ignore_value() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let c = condition(tr.translate("Person", "name", Operator::NotNull, Value::text("1")).unwrap());
        assert_eq!(c.value, Value::Null);
    }

    #[test]
    fn condition_keys_prefer_longest_operator() {
        let reg = registry();
        let descriptor = reg.entity("Person").unwrap();
        assert_eq!(
            split_condition_key(descriptor, "name_not_eq").unwrap(),
            ("name", Operator::NotEq)
        );
        assert_eq!(
            split_condition_key(descriptor, "reversed_name_eq").unwrap(),
            ("reversed_name", Operator::Eq)
        );
        assert_eq!(
            split_condition_key(descriptor, "name_not_null").unwrap(),
            ("name", Operator::NotNull)
        );
        assert_eq!(
            split_condition_key(descriptor, "nickname_eq").unwrap_err(),
            CoreError::UnknownAttribute {
                entity: "Person".into(),
                name: "nickname".into()
            }
        );
        assert!(split_condition_key(descriptor, "name").is_err());
    }

    #[test]
    fn sort_specs() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let s = tr.parse_sort("Person", "doubled_name desc").unwrap();
        let s = s.as_sort().unwrap();
        assert_eq!(s.direction, SortDirection::Desc);
        assert_eq!(s.expression, doubled_name(&TableRef::new("people")));

        let s = tr.parse_sort("Person", "name").unwrap();
        assert_eq!(s.as_sort().unwrap().direction, SortDirection::Asc);

        assert!(matches!(
            tr.parse_sort("Person", "name sideways"),
            Err(CoreError::UnsupportedOperator { .. })
        ));
        assert!(tr.parse_sort("Person", "name asc extra").is_err());
    }

    #[test]
    fn build_query_applies_default_order() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let q = tr
            .build_query(
                "Person",
                &SearchParams::new()
                    .condition("name_cont", "a")
                    .condition("awesome_eq", "t")
                    .limit(5),
            )
            .unwrap();
        assert_eq!(q.conditions.len(), 2);
        assert_eq!(q.conditions[1].value, Value::Bool(true));
        assert_eq!(q.orders.len(), 1);
        assert_eq!(q.orders[0].direction, SortDirection::Desc);
        assert_eq!(q.limit, Some(5));

        let q = tr
            .build_query("Person", &SearchParams::new().sort("name asc"))
            .unwrap();
        assert_eq!(q.orders.len(), 1);
        assert_eq!(q.orders[0].direction, SortDirection::Asc);
    }

    #[test]
    fn aliased_tables_qualify_expressions() {
        let reg = registry();
        let tr = PredicateTranslator::new(&reg);
        let alias = TableRef::aliased("people", "parents_people");
        let c = condition(
            tr.translate_in("Person", &alias, "reversed_name", Operator::Eq, Value::text("ab"))
                .unwrap(),
        );
        assert_eq!(c.expression, Expression::column(&alias, "name"));
    }
}
