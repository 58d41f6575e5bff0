//! Runs the SQL engine's output against SQLite and checks it returns the
//! same rows as the in-memory engine.

use eavkit_core::{
    data::{Data, DataId, MemoryStore},
    db::{
        memory::MemoryHandler,
        query::{Condition, EavQueryBuilder},
        sql::{SqlHandler, SqlStatement},
    },
    value::Value,
};
use eavkit_schema::{
    node::{Attribute, Family},
    types::AttributeType,
};
use proptest::prelude::*;
use rusqlite::{Connection, ToSql, types::Value as SqlValue};
use std::sync::Arc;

const TABLES: &str = "
CREATE TABLE eav_data (
    id INTEGER PRIMARY KEY,
    family_code TEXT NOT NULL
);
CREATE TABLE eav_value (
    data_id INTEGER NOT NULL,
    attribute_code TEXT NOT NULL,
    position INTEGER NOT NULL,
    bool_value INTEGER,
    date_value TEXT,
    datetime_value TEXT,
    enum_value TEXT,
    float_value REAL,
    int_value INTEGER,
    reference_value INTEGER,
    text_value TEXT
);
";

const NAMES: [&str; 6] = ["Widget", "widget", "Gadget", "Gizmo", "Doohickey", "50%_off"];
const NEEDLES: [&str; 9] = ["Wi", "wi", "get", "GET", "dg", "G", "%_", "5_", ""];
const TAGS: [&str; 3] = ["red", "blue", "Red"];

fn product() -> Arc<Family> {
    Arc::new(
        Family::builder("product", "Product")
            .attribute(Attribute::new("name", AttributeType::Text))
            .attribute(Attribute::new("price", AttributeType::Int))
            .attribute(Attribute::new("tags", AttributeType::Text).multiple())
            .build()
            .unwrap(),
    )
}

///
/// Row
/// (name, price, tags) of one generated product
///

type Row = (usize, Option<i64>, Vec<usize>);

///
/// Fixture
/// the same rows in a MemoryStore and in SQLite
///

struct Fixture {
    store: MemoryStore,
    conn: Connection,
}

impl Fixture {
    fn new(family: &Arc<Family>, rows: &[Row]) -> Self {
        let mut store = MemoryStore::new();
        for (name, price, tags) in rows {
            let mut data = Data::new(Arc::clone(family));
            data.set("name", NAMES[*name]).unwrap();
            if let Some(price) = price {
                data.set("price", *price).unwrap();
            }
            for tag in tags {
                data.push("tags", TAGS[*tag]).unwrap();
            }
            store.insert(data);
        }

        // another family sharing the tables
        let person = Arc::new(Family::builder("person", "Person").build().unwrap());
        store.insert(Data::new(person));

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(TABLES).unwrap();

        let handler = SqlHandler::default();
        for data in store.iter() {
            let id = i64::try_from(data.id().unwrap().get()).unwrap();
            conn.execute(
                "INSERT INTO eav_data (id, family_code) VALUES (?1, ?2)",
                rusqlite::params![id, data.family().code()],
            )
            .unwrap();

            for insert in handler.value_inserts(data) {
                execute(&conn, &insert);
            }
        }

        Self { store, conn }
    }

    fn memory_ids(&self, condition: &Condition<'_>) -> Vec<u64> {
        condition
            .apply(&mut MemoryHandler)
            .unwrap()
            .execute(&self.store)
            .iter()
            .filter_map(|data| data.id().map(DataId::get))
            .collect()
    }

    fn sql_ids(&self, condition: &Condition<'_>) -> Vec<u64> {
        let statement = condition
            .apply(&mut SqlHandler::default())
            .unwrap()
            .into_statement();

        select_ids(&self.conn, &statement)
    }
}

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Reference(id) => SqlValue::Integer(i64::try_from(id.get()).unwrap()),
        Value::Enum(s) | Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Null => SqlValue::Null,
        other => SqlValue::Text(other.to_string()),
    }
}

fn named_params(statement: &SqlStatement) -> Vec<(String, SqlValue)> {
    statement
        .params
        .iter()
        .map(|(name, value)| (format!(":{name}"), sql_value(value)))
        .collect()
}

fn execute(conn: &Connection, statement: &SqlStatement) {
    let params = named_params(statement);
    let named: Vec<(&str, &dyn ToSql)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect();

    conn.execute(&statement.sql, named.as_slice()).unwrap();
}

fn select_ids(conn: &Connection, statement: &SqlStatement) -> Vec<u64> {
    let params = named_params(statement);
    let named: Vec<(&str, &dyn ToSql)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect();

    let mut stmt = conn.prepare(&statement.sql).unwrap();
    let mut ids: Vec<u64> = stmt
        .query_map(named.as_slice(), |row| row.get::<_, i64>(0))
        .unwrap()
        .map(|id| u64::try_from(id.unwrap()).unwrap())
        .collect();
    ids.sort_unstable();

    ids
}

fn sample() -> Vec<Row> {
    vec![
        (0, Some(50), vec![0]),
        (1, Some(150), vec![1, 2]),
        (3, None, vec![]),
        (5, Some(100), vec![0, 1]),
    ]
}

#[test]
fn text_search_is_case_sensitive_in_both_engines() {
    let family = product();
    let fx = Fixture::new(&family, &sample());
    let eav = EavQueryBuilder::new(Arc::clone(&family));
    let name = eav.attribute_by_code("name").unwrap();

    let cases = [
        (name.starts_with("wid").unwrap(), vec![2]),
        (name.starts_with("Wid").unwrap(), vec![1]),
        (name.ends_with("GET").unwrap(), vec![]),
        (name.ends_with("get").unwrap(), vec![1, 2]),
        (name.contains("%_").unwrap(), vec![4]),
        (name.contains("5_").unwrap(), vec![]),
    ];

    for (condition, expected) in cases {
        assert_eq!(fx.memory_ids(&condition), expected, "{}", condition.predicate());
        assert_eq!(fx.sql_ids(&condition), expected, "{}", condition.predicate());
    }
}

#[test]
fn multiple_attribute_alias_is_one_element_in_sql_too() {
    let family = product();
    let fx = Fixture::new(&family, &sample());
    let eav = EavQueryBuilder::new(Arc::clone(&family));
    let tags = eav.attribute_by_code("tags").unwrap();

    let both = eav.and([tags.eq("red").unwrap(), tags.eq("blue").unwrap()]);
    assert!(fx.sql_ids(&both).is_empty());
    assert!(fx.memory_ids(&both).is_empty());

    let either = eav.or([tags.eq("red").unwrap(), tags.eq("blue").unwrap()]);
    assert_eq!(fx.sql_ids(&either), vec![1, 2, 4]);
    assert_eq!(fx.memory_ids(&either), vec![1, 2, 4]);
}

#[test]
fn native_condition_on_the_root_alias_runs() {
    let family = product();
    let fx = Fixture::new(&family, &sample());
    let eav = EavQueryBuilder::new(Arc::clone(&family));
    eav.filter(eav.attribute_by_code("price").unwrap().gte(50).unwrap())
        .unwrap();

    let mut query = eav.apply(&mut SqlHandler::default()).unwrap();
    let excluded = query.bind(Value::Int(1));
    query.and_where(format!("{}.id <> {excluded}", eav.alias()));

    assert_eq!(select_ids(&fx.conn, &query.into_statement()), vec![2, 4]);
}

///
/// Shape
/// generated description of a predicate tree
///

#[derive(Clone, Debug)]
enum Shape {
    PriceGt(i64),
    PriceBetween(i64, i64),
    PriceNotIn(Vec<i64>),
    PriceNull,
    NameEq(usize),
    NameStartsWith(usize),
    NameEndsWith(usize),
    NameContains(usize),
    TagEq(usize),
    TagIn(Vec<usize>),
    TagNotNull,
    And(Vec<Shape>),
    Or(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let price = 0i64..200;
    let needle = 0..NEEDLES.len();
    let leaf = prop_oneof![
        price.clone().prop_map(Shape::PriceGt),
        (price.clone(), price.clone()).prop_map(|(a, b)| Shape::PriceBetween(a.min(b), a.max(b))),
        prop::collection::vec(price, 0..3).prop_map(Shape::PriceNotIn),
        Just(Shape::PriceNull),
        (0..NAMES.len()).prop_map(Shape::NameEq),
        needle.clone().prop_map(Shape::NameStartsWith),
        needle.clone().prop_map(Shape::NameEndsWith),
        needle.prop_map(Shape::NameContains),
        (0..TAGS.len()).prop_map(Shape::TagEq),
        prop::collection::vec(0..TAGS.len(), 0..3).prop_map(Shape::TagIn),
        Just(Shape::TagNotNull),
    ];

    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Shape::And),
            prop::collection::vec(inner, 0..3).prop_map(Shape::Or),
        ]
    })
}

fn build<'q>(eav: &'q EavQueryBuilder, shape: &Shape) -> Condition<'q> {
    let price = eav.attribute_by_code("price").unwrap();
    let name = eav.attribute_by_code("name").unwrap();
    let tags = eav.attribute_by_code("tags").unwrap();

    match shape {
        Shape::PriceGt(v) => price.gt(*v).unwrap(),
        Shape::PriceBetween(lo, hi) => price.between(*lo, *hi).unwrap(),
        Shape::PriceNotIn(items) => price.not_in(items.clone()).unwrap(),
        Shape::PriceNull => price.is_null().unwrap(),
        Shape::NameEq(i) => name.eq(NAMES[*i]).unwrap(),
        Shape::NameStartsWith(i) => name.starts_with(NEEDLES[*i]).unwrap(),
        Shape::NameEndsWith(i) => name.ends_with(NEEDLES[*i]).unwrap(),
        Shape::NameContains(i) => name.contains(NEEDLES[*i]).unwrap(),
        Shape::TagEq(i) => tags.eq(TAGS[*i]).unwrap(),
        Shape::TagIn(items) => tags.in_list(items.iter().map(|i| TAGS[*i])).unwrap(),
        Shape::TagNotNull => tags.is_not_null().unwrap(),
        Shape::And(children) => eav.and(children.iter().map(|c| build(eav, c))),
        Shape::Or(children) => eav.or(children.iter().map(|c| build(eav, c))),
    }
}

fn row() -> impl Strategy<Value = Row> {
    (
        0..NAMES.len(),
        prop::option::of(0i64..200),
        prop::collection::vec(0..TAGS.len(), 0..3),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sql_and_memory_return_the_same_rows(
        shape in shape(),
        rows in prop::collection::vec(row(), 0..8),
    ) {
        let family = product();
        let fx = Fixture::new(&family, &rows);
        let eav = EavQueryBuilder::new(Arc::clone(&family));
        let condition = build(&eav, &shape);

        prop_assert_eq!(fx.sql_ids(&condition), fx.memory_ids(&condition));
    }
}
