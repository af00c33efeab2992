use std::sync::Arc;

use tracing::{debug, warn};

use crate::translate::{PredicateTranslator, SearchParams};
use crate::{AttributeRegistry, CoreError, OwnerRef, QueryEngine, Row};

/// Application service tying the registry to a query engine.
///
/// It stays generic over the engine so tests can run against the in-memory
/// recording engine and apps against SQLite.
pub struct SearchService<E: QueryEngine> {
    registry: Arc<AttributeRegistry>,
    engine: E,
}

impl<E: QueryEngine> SearchService<E> {
    pub fn new(registry: Arc<AttributeRegistry>, engine: E) -> Self {
        Self { registry, engine }
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Translate `params` for `entity` and run the query.
    pub fn search(&self, entity: &str, params: &SearchParams) -> Result<Vec<Row>, CoreError> {
        self.run(entity, None, params)
    }

    /// Like [`search`](Self::search), restricted to rows owned by `owner`
    /// through the `<prefix>_type` / `<prefix>_id` columns.
    pub fn search_owned(
        &self,
        entity: &str,
        prefix: &str,
        owner: &OwnerRef,
        params: &SearchParams,
    ) -> Result<Vec<Row>, CoreError> {
        self.run(entity, Some((prefix, owner)), params)
    }

    fn run(
        &self,
        entity: &str,
        owned_by: Option<(&str, &OwnerRef)>,
        params: &SearchParams,
    ) -> Result<Vec<Row>, CoreError> {
        let owner = owned_by.map(|(_, o)| format!("{}#{}", o.kind, o.id));
        let translator = PredicateTranslator::new(&self.registry);
        let mut query = translator.build_query(entity, params).inspect_err(|e| {
            warn!(entity, owner = owner.as_deref(), err = %e, "search rejected");
        })?;
        if let Some((prefix, o)) = owned_by {
            let mut conditions = o.conditions(&query.table, prefix);
            conditions.append(&mut query.conditions);
            query.conditions = conditions;
        }
        let rows = self.engine.fetch(&query).inspect_err(|e| {
            warn!(entity, owner = owner.as_deref(), err = %e, "search failed");
        })?;
        debug!(entity, owner = owner.as_deref(), rows = rows.len(), "search ok");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recording_engine::RecordingEngine;
    use crate::{
        AttributeDefinition, ColumnType, EntityDescriptor, Expression, Operator, SortDirection,
        TableRef, Value,
    };

    fn name_col(t: &TableRef) -> Expression {
        Expression::column(t, "name")
    }

    fn reverse(v: Value) -> Value {
        match v {
            Value::Text(s) => Value::Text(s.chars().rev().collect()),
            other => other,
        }
    }

    fn registry() -> Arc<AttributeRegistry> {
        let mut reg = AttributeRegistry::new();
        reg.add_entity(
            EntityDescriptor::new("Person", "people").with_default_order("id", SortDirection::Desc),
        )
        .unwrap();
        reg.register("Person", "name", AttributeDefinition::native("name", ColumnType::Text))
            .unwrap();
        reg.register(
            "Person",
            "reversed_name",
            AttributeDefinition::derived(name_col).with_formatter(reverse),
        )
        .unwrap();
        reg.add_entity(EntityDescriptor::new("Note", "notes")).unwrap();
        reg.register("Note", "note", AttributeDefinition::native("note", ColumnType::Text))
            .unwrap();
        Arc::new(reg)
    }

    fn row(name: &str) -> Row {
        let mut r = Row::new();
        r.insert("name".into(), Value::text(name));
        r
    }

    #[test]
    fn search_hands_translated_query_to_engine() {
        let svc = SearchService::new(registry(), RecordingEngine::new(vec![row("abc")]));
        let rows = svc
            .search("Person", &SearchParams::new().condition("reversed_name_eq", "abc"))
            .unwrap();
        assert_eq!(rows.len(), 1);

        let seen = svc.engine().queries().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].conditions[0].value, Value::text("cba"));
        assert_eq!(seen[0].conditions[0].operator, Operator::Eq);
    }

    #[test]
    fn rejected_search_never_reaches_engine() {
        let svc = SearchService::new(registry(), RecordingEngine::default());
        let err = svc
            .search("Person", &SearchParams::new().condition("nickname_eq", "x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownAttribute { .. }));
        assert!(svc.engine().queries().unwrap().is_empty());
    }

    #[test]
    fn search_owned_prepends_owner_conditions() {
        let svc = SearchService::new(registry(), RecordingEngine::default());
        svc.search_owned(
            "Note",
            "notable",
            &OwnerRef::new("Person", 4),
            &SearchParams::new().condition("note_cont", "hi"),
        )
        .unwrap();
        let seen = svc.engine().queries().unwrap();
        let conds = &seen[0].conditions;
        assert_eq!(conds.len(), 3);
        assert_eq!(conds[0].value, Value::text("Person"));
        assert_eq!(conds[1].value, Value::Integer(4));
        assert_eq!(conds[2].operator, Operator::Cont);
    }

    #[test]
    fn rejected_owned_search_never_reaches_engine() {
        let svc = SearchService::new(registry(), RecordingEngine::new(vec![row("n")]));
        let err = svc
            .search_owned(
                "Note",
                "notable",
                &OwnerRef::new("Person", 4),
                &SearchParams::new().sort("nope desc"),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownAttribute { .. }));
        assert!(svc.engine().queries().unwrap().is_empty());

        let rows = svc
            .search_owned("Note", "notable", &OwnerRef::new("Person", 4), &SearchParams::new())
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
