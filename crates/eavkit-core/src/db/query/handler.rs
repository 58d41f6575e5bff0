//! Translation contract between the predicate tree and a storage engine.

use super::{
    QueryError,
    predicate::{JoinAlias, Predicate, PredicateLeaf},
};
use eavkit_schema::node::{Attribute, Family};
use std::sync::Arc;

///
/// ValueJoin
/// one attribute's value rows joined under `alias`
///

#[derive(Clone, Debug, PartialEq)]
pub struct ValueJoin {
    pub alias: JoinAlias,
    pub attribute: Arc<Attribute>,
}

impl ValueJoin {
    #[must_use]
    pub fn for_leaf(leaf: &PredicateLeaf) -> Self {
        Self {
            alias: leaf.alias.clone(),
            attribute: Arc::clone(&leaf.attribute),
        }
    }
}

///
/// QueryHandler
///
/// The only engine-specific piece. The walker in this module calls
/// `join` once per leaf it visits, so the same alias is requested again for
/// every leaf on the same attribute; implementations must keep one join per
/// alias.
///

pub trait QueryHandler {
    /// Engine-native query under construction.
    type Query;

    /// Engine-native filter expression.
    type Fragment;

    /// Select every row of `family` under `root_alias`, no filter.
    fn base_query(&mut self, family: &Family, root_alias: &str) -> Self::Query;

    fn join(&mut self, query: &mut Self::Query, join: &ValueJoin) -> Result<(), QueryError>;

    fn leaf(
        &mut self,
        query: &mut Self::Query,
        leaf: &PredicateLeaf,
    ) -> Result<Self::Fragment, QueryError>;

    /// Conjunction; an empty list is the tautology.
    fn and(&mut self, query: &mut Self::Query, children: Vec<Self::Fragment>) -> Self::Fragment;

    /// Disjunction; an empty list is the contradiction.
    fn or(&mut self, query: &mut Self::Query, children: Vec<Self::Fragment>) -> Self::Fragment;

    /// Attach the translated tree to the query.
    fn filter(&mut self, query: &mut Self::Query, fragment: Self::Fragment);
}

/// Translate a whole tree from scratch into a fresh base query.
pub(crate) fn translate<H: QueryHandler + ?Sized>(
    handler: &mut H,
    family: &Family,
    root_alias: &str,
    predicate: Option<&Predicate>,
) -> Result<H::Query, QueryError> {
    let mut query = handler.base_query(family, root_alias);

    if let Some(predicate) = predicate {
        let fragment = walk(handler, &mut query, predicate)?;
        handler.filter(&mut query, fragment);
    }

    Ok(query)
}

fn walk<H: QueryHandler + ?Sized>(
    handler: &mut H,
    query: &mut H::Query,
    predicate: &Predicate,
) -> Result<H::Fragment, QueryError> {
    match predicate {
        Predicate::Leaf(leaf) => {
            handler.join(query, &ValueJoin::for_leaf(leaf))?;
            handler.leaf(query, leaf)
        }
        Predicate::And(children) => {
            let parts = walk_all(handler, query, children)?;
            Ok(handler.and(query, parts))
        }
        Predicate::Or(children) => {
            let parts = walk_all(handler, query, children)?;
            Ok(handler.or(query, parts))
        }
    }
}

fn walk_all<H: QueryHandler + ?Sized>(
    handler: &mut H,
    query: &mut H::Query,
    children: &[Predicate],
) -> Result<Vec<H::Fragment>, QueryError> {
    children
        .iter()
        .map(|child| walk(handler, query, child))
        .collect()
}
