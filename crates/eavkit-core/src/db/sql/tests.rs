use super::*;
use crate::{
    data::{Data, MemoryStore},
    db::query::EavQueryBuilder,
    value::Value,
};
use eavkit_schema::{
    node::{Attribute, Family},
    types::AttributeType,
};
use std::sync::Arc;

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

const BASE: &str = "SELECT DISTINCT e.* FROM eav_data e";

#[test]
fn base_query_restricts_to_family() {
    let eav = EavQueryBuilder::new(product());
    let query = eav.apply(&mut SqlHandler::default()).unwrap();

    assert_eq!(query.to_sql(), format!("{BASE} WHERE e.family_code = :p0"));
    assert_eq!(query.param("p0"), Some(&Value::Text("product".into())));
}

#[test]
fn or_of_two_attributes_joins_each_once() {
    let eav = EavQueryBuilder::new(product());
    let price = eav.attribute_by_code("price").unwrap();
    let name = eav.attribute_by_code("name").unwrap();

    eav.filter(eav.or([price.gt(100).unwrap(), name.eq("Widget").unwrap()])).unwrap();
    let query = eav.apply(&mut SqlHandler::default()).unwrap();

    assert_eq!(
        query.to_sql(),
        "SELECT DISTINCT e.* FROM eav_data e \
         LEFT JOIN eav_value e_price ON e_price.data_id = e.id AND e_price.attribute_code = :p1 \
         LEFT JOIN eav_value e_name ON e_name.data_id = e.id AND e_name.attribute_code = :p3 \
         WHERE e.family_code = :p0 AND (e_price.int_value > :p2 OR e_name.text_value = :p4)"
    );

    let params: Vec<_> = query.params().iter().map(|(_, v)| v.clone()).collect();
    assert_eq!(
        params,
        vec![
            Value::from("product"),
            Value::from("price"),
            Value::Int(100),
            Value::from("name"),
            Value::from("Widget"),
        ]
    );
}

#[test]
fn repeated_attribute_shares_one_join() {
    let eav = EavQueryBuilder::new(product());
    let price = eav.attribute_by_code("price").unwrap();

    eav.filter(eav.and([price.gte(10).unwrap(), price.lte(20).unwrap()])).unwrap();
    let query = eav.apply(&mut SqlHandler::default()).unwrap();

    assert_eq!(query.joins().len(), 1);
    assert!(query
        .to_sql()
        .ends_with("AND (e_price.int_value >= :p2 AND e_price.int_value <= :p3)"));
}

#[test]
fn grouping_is_parenthesized() {
    let eav = EavQueryBuilder::new(product());
    let price = eav.attribute_by_code("price").unwrap();
    let name = eav.attribute_by_code("name").unwrap();

    eav.filter(eav.or([
        eav.and([price.eq(1).unwrap(), name.eq("a").unwrap()]),
        eav.and([price.eq(3).unwrap(), name.eq("b").unwrap()]),
    ])).unwrap();
    let sql = eav.apply(&mut SqlHandler::default()).unwrap().to_sql();

    assert!(sql.ends_with(
        "WHERE e.family_code = :p0 AND \
         ((e_price.int_value = :p2 AND e_name.text_value = :p4) \
         OR (e_price.int_value = :p5 AND e_name.text_value = :p6))"
    ));
}

#[test]
fn empty_groups_render_as_constants() {
    let eav = EavQueryBuilder::new(product());

    eav.filter(eav.and([])).unwrap();
    let all = eav.apply(&mut SqlHandler::default()).unwrap().to_sql();
    assert_eq!(all, format!("{BASE} WHERE e.family_code = :p0 AND 1 = 1"));

    eav.filter(eav.or([eav.and([]), eav.or([])])).unwrap();
    let mixed = eav.apply(&mut SqlHandler::default()).unwrap().to_sql();
    assert_eq!(mixed, format!("{BASE} WHERE e.family_code = :p0 AND (1 = 1 OR 1 = 0)"));
}

#[test]
fn membership_and_presence() {
    let eav = EavQueryBuilder::new(product());
    let price = eav.attribute_by_code("price").unwrap();
    let mut handler = SqlHandler::default();

    let sql = |condition: crate::db::query::Condition<'_>, handler: &mut SqlHandler| {
        let sql = condition.apply(handler).unwrap().to_sql();
        sql.rsplit(" AND ").next().unwrap().to_string()
    };

    assert_eq!(sql(price.in_list([1, 2]).unwrap(), &mut handler), "e_price.int_value IN (:p2, :p3)");
    assert_eq!(sql(price.in_list(Vec::<i64>::new()).unwrap(), &mut handler), "1 = 0");
    assert_eq!(sql(price.not_in([7]).unwrap(), &mut handler), "e_price.int_value NOT IN (:p2)");
    assert_eq!(sql(price.not_in(Vec::<i64>::new()).unwrap(), &mut handler), "e_price.data_id IS NOT NULL");
    assert_eq!(sql(price.is_null().unwrap(), &mut handler), "e_price.data_id IS NULL");
}

#[test]
fn between_binds_both_bounds() {
    let eav = EavQueryBuilder::new(product());
    let query = eav
        .attribute_by_code("price")
        .unwrap()
        .between(5, 10)
        .unwrap()
        .apply(&mut SqlHandler::default())
        .unwrap();

    assert!(query.to_sql().ends_with("e_price.int_value BETWEEN :p2 AND :p3"));
    assert_eq!(query.param("p3"), Some(&Value::Int(10)));
}

#[test]
fn text_search_binds_the_raw_needle() {
    let eav = EavQueryBuilder::new(product());
    let name = eav.attribute_by_code("name").unwrap();

    let query = name.contains("50%_off").unwrap().apply(&mut SqlHandler::default()).unwrap();
    assert!(query.to_sql().ends_with("instr(e_name.text_value, :p2) > 0"));
    assert_eq!(query.param("p2"), Some(&Value::from("50%_off")));

    let query = name.starts_with("Wid").unwrap().apply(&mut SqlHandler::default()).unwrap();
    assert!(query.to_sql().ends_with("substr(e_name.text_value, 1, length(:p2)) = :p2"));
    assert_eq!(query.param("p2"), Some(&Value::from("Wid")));

    let query = name.ends_with("get").unwrap().apply(&mut SqlHandler::default()).unwrap();
    assert!(query.to_sql().ends_with(
        "substr(e_name.text_value, length(e_name.text_value) - length(:p2) + 1) = :p2"
    ));
    assert!(!query.to_sql().contains("LIKE"));
}

#[test]
fn custom_alias_and_config() {
    let config = SqlConfig::from_toml_str(
        r#"
data_table = "items"
value_table = "item_values"
data_id_column = "item_id"
"#,
    )
    .unwrap();
    assert_eq!(config.family_column, "family_code");

    let eav = EavQueryBuilder::with_alias(product(), "p").unwrap();
    eav.filter(eav.attribute_by_code("price").unwrap().is_not_null().unwrap()).unwrap();
    let sql = eav.apply(&mut SqlHandler::new(config)).unwrap().to_sql();

    assert_eq!(
        sql,
        "SELECT DISTINCT p.* FROM items p \
         LEFT JOIN item_values p_price ON p_price.item_id = p.id AND p_price.attribute_code = :p1 \
         WHERE p.family_code = :p0 AND p_price.item_id IS NOT NULL"
    );
}

#[test]
fn native_conditions_extend_the_query_through_the_root_alias() {
    let eav = EavQueryBuilder::new(product());
    let price = eav.attribute_by_code("price").unwrap();
    eav.filter(price.gt(100).unwrap()).unwrap();

    let mut query = eav.apply(&mut SqlHandler::default()).unwrap();
    let id = query.bind(Value::Int(7));
    query.and_where(format!("{}.id <> {id}", eav.alias()));

    assert_eq!(
        query.to_sql(),
        "SELECT DISTINCT e.* FROM eav_data e \
         LEFT JOIN eav_value e_price ON e_price.data_id = e.id AND e_price.attribute_code = :p1 \
         WHERE e.family_code = :p0 AND e_price.int_value > :p2 AND e.id <> :p3"
    );
    assert_eq!(query.param("p3"), Some(&Value::Int(7)));
}

#[test]
fn unknown_config_keys_are_rejected() {
    assert!(SqlConfig::from_toml_str("tables = 1").is_err());
}

#[test]
fn value_inserts_cover_every_row() {
    let family = product();
    let mut store = MemoryStore::new();
    let mut data = Data::new(Arc::clone(&family));

    let handler = SqlHandler::default();
    assert!(handler.value_inserts(&data).is_empty());

    data.set("price", 5).unwrap();
    data.push("tags", "a").unwrap();
    data.push("tags", "b").unwrap();
    let id = store.insert(data);

    let inserts = handler.value_inserts(store.get(id).unwrap());
    assert_eq!(inserts.len(), 3);
    assert_eq!(
        inserts[0].sql,
        "INSERT INTO eav_value (data_id, attribute_code, position, int_value) VALUES (:p0, :p1, :p2, :p3)"
    );
    assert_eq!(inserts[2].params[2].1, Value::Int(1));
    assert_eq!(inserts[2].params[3].1, Value::from("b"));
}
