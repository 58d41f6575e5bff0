use super::{SqlConfig, SqlJoin, SqlQuery, SqlStatement};
use crate::{
    data::Data,
    db::query::{CompareOp, Operand, PredicateLeaf, QueryError, QueryHandler, ValueJoin},
    value::Value,
};
use eavkit_schema::{node::Family, types::AttributeType};

///
/// SqlHandler
///

#[derive(Clone, Debug, Default)]
pub struct SqlHandler {
    config: SqlConfig,
    root_alias: String,
}

impl SqlHandler {
    #[must_use]
    pub fn new(config: SqlConfig) -> Self {
        Self {
            config,
            root_alias: String::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SqlConfig {
        &self.config
    }

    /// One INSERT per stored value row of `data`, in (attribute, position)
    /// order. Unsaved data has no id to reference and yields nothing.
    #[must_use]
    pub fn value_inserts(&self, data: &Data) -> Vec<SqlStatement> {
        let Some(data_id) = data.id() else {
            return Vec::new();
        };
        let c = &self.config;

        data.stored_values()
            .filter_map(|row| {
                let ty = data.family().attribute(row.attribute)?.ty();
                let mut query = SqlQuery::new(String::new());
                let id = query.bind(Value::Reference(data_id));
                let code = query.bind(Value::Text(row.attribute.to_string()));
                let position = query.bind(Value::Int(i64::try_from(row.position).ok()?));
                let value = query.bind(row.value.clone());

                Some(SqlStatement {
                    sql: format!(
                        "INSERT INTO {} ({}, {}, {}, {}) VALUES ({id}, {code}, {position}, {value})",
                        c.value_table,
                        c.data_id_column,
                        c.attribute_column,
                        c.position_column,
                        value_column(ty),
                    ),
                    params: query.into_statement().params,
                })
            })
            .collect()
    }
}

/// Value column holding payloads of `ty`.
fn value_column(ty: AttributeType) -> String {
    format!("{ty}_value")
}

/// Byte-wise, case-sensitive text search. No `LIKE`: it folds ASCII case.
fn text_search(op: CompareOp, column: &str, param: &str) -> String {
    match op {
        CompareOp::StartsWith => format!("substr({column}, 1, length({param})) = {param}"),
        CompareOp::EndsWith => format!(
            "substr({column}, length({column}) - length({param}) + 1) = {param}"
        ),
        _ => format!("instr({column}, {param}) > 0"),
    }
}

fn group(children: Vec<String>, sep: &str, empty: &str) -> String {
    match children.len() {
        0 => empty.to_string(),
        1 => children.into_iter().next().unwrap_or_default(),
        _ => format!("({})", children.join(sep)),
    }
}

impl QueryHandler for SqlHandler {
    type Query = SqlQuery;
    type Fragment = String;

    fn base_query(&mut self, family: &Family, root_alias: &str) -> SqlQuery {
        let c = &self.config;
        self.root_alias = root_alias.to_string();

        let mut query = SqlQuery::new(format!(
            "SELECT DISTINCT {root_alias}.* FROM {} {root_alias}",
            c.data_table
        ));
        let family = query.bind(Value::Text(family.code().to_string()));
        query.push_condition(format!("{root_alias}.{} = {family}", c.family_column));

        query
    }

    fn join(&mut self, query: &mut SqlQuery, join: &ValueJoin) -> Result<(), QueryError> {
        let alias = join.alias.as_str();
        if query.has_join(alias) {
            return Ok(());
        }

        let c = &self.config;
        let code = query.bind(Value::Text(join.attribute.code().to_string()));
        query.push_join(SqlJoin {
            alias: alias.to_string(),
            sql: format!(
                "LEFT JOIN {} {alias} ON {alias}.{} = {}.{} AND {alias}.{} = {code}",
                c.value_table, c.data_id_column, self.root_alias, c.id_column, c.attribute_column,
            ),
        });

        Ok(())
    }

    fn leaf(&mut self, query: &mut SqlQuery, leaf: &PredicateLeaf) -> Result<String, QueryError> {
        let alias = leaf.alias.as_str();
        let column = format!("{alias}.{}", value_column(leaf.attribute.ty()));
        let row = format!("{alias}.{}", self.config.data_id_column);

        let sql = match (leaf.op, &leaf.operand) {
            (CompareOp::IsNull, _) => format!("{row} IS NULL"),
            (CompareOp::IsNotNull, _) => format!("{row} IS NOT NULL"),

            (CompareOp::In, Operand::List(items)) if items.is_empty() => "1 = 0".to_string(),
            (CompareOp::NotIn, Operand::List(items)) if items.is_empty() => {
                format!("{row} IS NOT NULL")
            }
            (op @ (CompareOp::In | CompareOp::NotIn), Operand::List(items)) => {
                let keyword = if op == CompareOp::In { "IN" } else { "NOT IN" };
                let placeholders: Vec<_> = items.iter().map(|v| query.bind(v.clone())).collect();
                format!("{column} {keyword} ({})", placeholders.join(", "))
            }

            (CompareOp::Between, Operand::Range(low, high)) => {
                let low = query.bind(low.clone());
                let high = query.bind(high.clone());
                format!("{column} BETWEEN {low} AND {high}")
            }

            (
                op @ (CompareOp::Contains | CompareOp::StartsWith | CompareOp::EndsWith),
                Operand::Single(Value::Text(needle)),
            ) => {
                let param = query.bind(Value::Text(needle.clone()));
                text_search(op, &column, &param)
            }

            (
                op @ (CompareOp::Eq
                | CompareOp::Ne
                | CompareOp::Lt
                | CompareOp::Lte
                | CompareOp::Gt
                | CompareOp::Gte),
                Operand::Single(value),
            ) => {
                let param = query.bind(value.clone());
                format!("{column} {op} {param}")
            }

            (op, operand) => {
                return Err(QueryError::UnsupportedOperator {
                    attribute: format!("{} with {} operand", leaf.attribute.code(), operand.shape()),
                    op,
                    ty: leaf.attribute.ty(),
                });
            }
        };

        Ok(sql)
    }

    fn and(&mut self, _: &mut SqlQuery, children: Vec<String>) -> String {
        group(children, " AND ", "1 = 1")
    }

    fn or(&mut self, _: &mut SqlQuery, children: Vec<String>) -> String {
        group(children, " OR ", "1 = 0")
    }

    fn filter(&mut self, query: &mut SqlQuery, fragment: String) {
        query.push_condition(fragment);
    }
}
