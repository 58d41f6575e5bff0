use super::{eval::eval, *};
use crate::value::Value;
use eavkit_schema::{node::Attribute, types::AttributeType};
use proptest::prelude::*;
use std::{collections::BTreeMap, sync::Arc};

fn leaf(code: &str, ty: AttributeType, op: CompareOp, operand: Operand) -> Predicate {
    let attribute = Arc::new(Attribute::new(code, ty));
    let alias = JoinAlias::for_attribute("e", &attribute);

    Predicate::Leaf(PredicateLeaf {
        attribute,
        op,
        operand,
        alias,
    })
}

fn price(op: CompareOp, operand: Operand) -> Predicate {
    leaf("price", AttributeType::Int, op, operand)
}

fn name(op: CompareOp, operand: Operand) -> Predicate {
    leaf("name", AttributeType::Text, op, operand)
}

fn alias(code: &str) -> JoinAlias {
    JoinAlias::for_attribute("e", &Attribute::new(code, AttributeType::Int))
}

fn row<'a>(pairs: &[(&str, Option<&'a Value>)]) -> BTreeMap<JoinAlias, Option<&'a Value>> {
    pairs.iter().map(|(code, v)| (alias(code), *v)).collect()
}

#[test]
fn identities_hold_on_any_row() {
    let v = Value::Int(1);

    for binding in [row(&[]), row(&[("price", Some(&v))]), row(&[("price", None)])] {
        assert!(eval(&Predicate::tautology(), &binding));
        assert!(!eval(&Predicate::contradiction(), &binding));
    }
}

#[test]
fn missing_values_only_satisfy_is_null() {
    let binding = row(&[("price", None)]);

    assert!(eval(&price(CompareOp::IsNull, Operand::None), &binding));
    assert!(!eval(&price(CompareOp::IsNotNull, Operand::None), &binding));
    assert!(!eval(&price(CompareOp::Ne, Operand::Single(Value::Int(1))), &binding));
    assert!(!eval(&price(CompareOp::NotIn, Operand::List(vec![])), &binding));
}

#[test]
fn comparisons_follow_the_operand_shape() {
    let v = Value::Int(50);
    let binding = row(&[("price", Some(&v))]);
    let check = |op, operand| eval(&price(op, operand), &binding);

    assert!(check(CompareOp::Eq, Operand::Single(Value::Int(50))));
    assert!(check(CompareOp::Gte, Operand::Single(Value::Int(50))));
    assert!(!check(CompareOp::Gt, Operand::Single(Value::Int(50))));
    assert!(check(CompareOp::Between, Operand::Range(Value::Int(10), Value::Int(50))));
    assert!(!check(CompareOp::Between, Operand::Range(Value::Int(60), Value::Int(10))));
    assert!(check(CompareOp::In, Operand::List(vec![Value::Int(1), Value::Int(50)])));
    assert!(!check(CompareOp::In, Operand::List(vec![])));
    assert!(check(CompareOp::NotIn, Operand::List(vec![])));
    assert!(!check(CompareOp::NotIn, Operand::List(vec![Value::Int(50)])));

    // wrong shape never matches
    assert!(!check(CompareOp::Eq, Operand::List(vec![Value::Int(50)])));
}

#[test]
fn text_search_is_case_sensitive() {
    let v = Value::Text("Widget".into());
    let binding = row(&[("name", Some(&v))]);
    let needle = |s: &str| Operand::Single(Value::Text(s.into()));

    assert!(eval(&name(CompareOp::StartsWith, needle("Wid")), &binding));
    assert!(!eval(&name(CompareOp::StartsWith, needle("wid")), &binding));
    assert!(eval(&name(CompareOp::Contains, needle("dge")), &binding));
    assert!(eval(&name(CompareOp::EndsWith, needle("get")), &binding));
}

#[test]
fn leaves_and_aliases_are_in_reference_order() {
    let tree = Predicate::Or(vec![
        Predicate::And(vec![
            name(CompareOp::Eq, Operand::Single("a".into())),
            price(CompareOp::Gt, Operand::Single(1.into())),
        ]),
        price(CompareOp::IsNull, Operand::None),
    ]);

    let codes: Vec<_> = tree.leaves().iter().map(|l| l.attribute.code()).collect();
    assert_eq!(codes, vec!["name", "price", "price"]);

    let aliases: Vec<_> = tree.join_aliases().iter().map(|a| a.as_str()).collect();
    assert_eq!(aliases, vec!["e_name", "e_price"]);
}

#[test]
fn display_keeps_grouping() {
    let tree = Predicate::Or(vec![
        Predicate::And(vec![
            price(CompareOp::Eq, Operand::Single(1.into())),
            name(CompareOp::In, Operand::List(vec!["a".into(), "b".into()])),
        ]),
        Predicate::tautology(),
        Predicate::contradiction(),
    ]);

    assert_eq!(
        tree.to_string(),
        "((price = 1 AND name in ['a', 'b']) OR true OR false)"
    );
}

proptest! {
    #[test]
    fn groups_reduce_like_all_and_any(flags in prop::collection::vec(any::<bool>(), 0..8)) {
        let v = Value::Int(0);
        let binding = row(&[("price", Some(&v))]);
        let children: Vec<_> = flags
            .iter()
            .map(|&f| if f { Predicate::tautology() } else { Predicate::contradiction() })
            .collect();

        prop_assert_eq!(
            eval(&Predicate::And(children.clone()), &binding),
            flags.iter().all(|&f| f)
        );
        prop_assert_eq!(
            eval(&Predicate::Or(children), &binding),
            flags.iter().any(|&f| f)
        );
    }

    #[test]
    fn between_matches_the_closed_interval(x in -50i64..50, lo in -50i64..50, hi in -50i64..50) {
        let v = Value::Int(x);
        let binding = row(&[("price", Some(&v))]);
        let tree = price(CompareOp::Between, Operand::Range(Value::Int(lo), Value::Int(hi)));

        prop_assert_eq!(eval(&tree, &binding), lo <= x && x <= hi);
    }
}
