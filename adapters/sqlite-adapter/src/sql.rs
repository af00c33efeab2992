//! Rendering of expressions and search queries to SQLite SQL.
//!
//! Comparison values always travel as `?N` parameters. Literals embedded in
//! derived expressions are inlined, quoted.

use rusqlite::types::Value as SqlValue;
use search_domain::{Condition, Expression, Operator, SearchQuery, SortDirection, Value};

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Escape `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn to_sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
        // Lists only appear under IN, which expands them.
        Value::List(_) => SqlValue::Text(v.to_string()),
    }
}

pub fn render_expression(expr: &Expression) -> String {
    match expr {
        Expression::Column { qualifier, name } => {
            format!("{}.{}", quote_ident(qualifier), quote_ident(name))
        }
        Expression::Literal(v) => render_literal(v),
        Expression::Infix {
            operator,
            left,
            right,
        } => format!(
            "({} {} {})",
            render_expression(left),
            operator,
            render_expression(right)
        ),
        Expression::Function { name, args } => {
            let args: Vec<String> = args.iter().map(render_expression).collect();
            format!("{}({})", name, args.join(", "))
        }
    }
}

fn render_literal(v: &Value) -> String {
    match v {
        Value::Null => "NULL".into(),
        Value::Bool(b) => (*b as i64).to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => quote_literal(s),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(render_literal).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Collects positional parameters while a statement is rendered.
#[derive(Default)]
struct Params {
    values: Vec<SqlValue>,
}

impl Params {
    fn bind(&mut self, v: SqlValue) -> String {
        self.values.push(v);
        format!("?{}", self.values.len())
    }
}

fn render_condition(c: &Condition, params: &mut Params) -> String {
    let lhs = render_expression(&c.expression);
    let pattern = |params: &mut Params, pat: String| params.bind(SqlValue::Text(pat));
    let text = c.value.to_string();
    match c.operator {
        Operator::Eq => format!("{lhs} = {}", params.bind(to_sql_value(&c.value))),
        Operator::NotEq => format!("{lhs} != {}", params.bind(to_sql_value(&c.value))),
        Operator::Lt => format!("{lhs} < {}", params.bind(to_sql_value(&c.value))),
        Operator::Lteq => format!("{lhs} <= {}", params.bind(to_sql_value(&c.value))),
        Operator::Gt => format!("{lhs} > {}", params.bind(to_sql_value(&c.value))),
        Operator::Gteq => format!("{lhs} >= {}", params.bind(to_sql_value(&c.value))),
        Operator::Cont => format!(
            "{lhs} LIKE {} ESCAPE '\\'",
            pattern(params, format!("%{}%", escape_like(&text)))
        ),
        Operator::NotCont => format!(
            "{lhs} NOT LIKE {} ESCAPE '\\'",
            pattern(params, format!("%{}%", escape_like(&text)))
        ),
        Operator::Start => format!(
            "{lhs} LIKE {} ESCAPE '\\'",
            pattern(params, format!("{}%", escape_like(&text)))
        ),
        Operator::End => format!(
            "{lhs} LIKE {} ESCAPE '\\'",
            pattern(params, format!("%{}", escape_like(&text)))
        ),
        Operator::In | Operator::NotIn => {
            let items: &[Value] = match &c.value {
                Value::List(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            let slots: Vec<String> = items
                .iter()
                .map(|v| params.bind(to_sql_value(v)))
                .collect();
            let not = if c.operator == Operator::NotIn { "NOT " } else { "" };
            format!("{lhs} {not}IN ({})", slots.join(", "))
        }
        Operator::Null => format!("{lhs} IS NULL"),
        Operator::NotNull => format!("{lhs} IS NOT NULL"),
    }
}

/// Render a full `SELECT` for `query`, returning the SQL and its parameters.
pub fn render_query(query: &SearchQuery) -> (String, Vec<SqlValue>) {
    let mut params = Params::default();
    let mut sql = format!("SELECT * FROM {}", quote_ident(&query.table.table));
    if let Some(alias) = &query.table.alias {
        sql.push_str(&format!(" AS {}", quote_ident(alias)));
    }

    if !query.conditions.is_empty() {
        let conds: Vec<String> = query
            .conditions
            .iter()
            .map(|c| render_condition(c, &mut params))
            .collect();
        sql.push_str(&format!(" WHERE {}", conds.join(" AND ")));
    }

    if !query.orders.is_empty() {
        let orders: Vec<String> = query
            .orders
            .iter()
            .map(|o| {
                let dir = match o.direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("{} {}", render_expression(&o.expression), dir)
            })
            .collect();
        sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
    }

    if query.limit.is_some() || query.offset > 0 {
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        let limit = query
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);
        let l = params.bind(SqlValue::Integer(limit));
        let o = params.bind(SqlValue::Integer(offset));
        sql.push_str(&format!(" LIMIT {l} OFFSET {o}"));
    }

    (sql, params.values)
}
