use crate::value::Value;
use serde::Serialize;

///
/// SqlStatement
/// rendered SQL text plus its named parameters, in binding order
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

///
/// SqlJoin
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SqlJoin {
    pub alias: String,
    pub sql: String,
}

///
/// SqlQuery
///
/// Native query of the SQL engine. Conditions are ANDed in order; the first
/// one is always the family restriction of the base query.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqlQuery {
    select: String,
    joins: Vec<SqlJoin>,
    conditions: Vec<String>,
    params: Vec<(String, Value)>,
}

impl SqlQuery {
    pub(crate) const fn new(select: String) -> Self {
        Self {
            select,
            joins: Vec::new(),
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Register a parameter and return its placeholder (`:pN`).
    pub fn bind(&mut self, value: Value) -> String {
        let name = format!("p{}", self.params.len());
        let placeholder = format!(":{name}");
        self.params.push((name, value));

        placeholder
    }

    pub(crate) fn has_join(&self, alias: &str) -> bool {
        self.joins.iter().any(|join| join.alias == alias)
    }

    pub(crate) fn push_join(&mut self, join: SqlJoin) {
        self.joins.push(join);
    }

    pub(crate) fn push_condition(&mut self, condition: String) {
        self.conditions.push(condition);
    }

    /// Add a native condition outside the predicate tree, ANDed with the
    /// rest. Reference the root through the builder's alias and bind values
    /// with [`SqlQuery::bind`] first.
    pub fn and_where(&mut self, condition: impl Into<String>) -> &mut Self {
        self.push_condition(condition.into());
        self
    }

    #[must_use]
    pub fn joins(&self) -> &[SqlJoin] {
        &self.joins
    }

    #[must_use]
    pub fn params(&self) -> &[(String, Value)] {
        &self.params
    }

    /// Bound value of a parameter, by name without the colon.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = self.select.clone();

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.sql);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }

        sql
    }

    #[must_use]
    pub fn into_statement(self) -> SqlStatement {
        SqlStatement {
            sql: self.to_sql(),
            params: self.params,
        }
    }
}
