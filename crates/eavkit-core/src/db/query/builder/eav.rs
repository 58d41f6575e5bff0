use super::{AttributeQueryBuilder, BuildState, Condition};
use crate::{
    db::query::{
        QueryError,
        handler::{QueryHandler, translate},
        predicate::{JoinAlias, Operand, OperandShape, Predicate, PredicateLeaf, supports_operator},
    },
    obs::sink::{self, MetricsEvent},
    value::Value,
};
use eavkit_schema::{
    node::{Attribute, Family},
    validate::validate_identifier,
};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    sync::Arc,
};

///
/// EavQueryBuilder
///
/// Bound to one family and one root alias for its whole lifetime. Leaves
/// are built through [`AttributeQueryBuilder`], which registers the join
/// for its attribute here the first time a leaf needs it.
///
/// Not `Sync`: one builder belongs to one logical query.
///

#[derive(Debug)]
pub struct EavQueryBuilder {
    family: Arc<Family>,
    alias: String,
    joins: RefCell<BTreeMap<String, JoinAlias>>,
    tree: RefCell<Option<Predicate>>,
    state: Cell<BuildState>,
}

impl EavQueryBuilder {
    pub const DEFAULT_ALIAS: &'static str = "e";

    #[must_use]
    pub fn new(family: Arc<Family>) -> Self {
        sink::record(MetricsEvent::BuilderCreated {
            family: family.code(),
        });

        Self {
            family,
            alias: Self::DEFAULT_ALIAS.to_string(),
            joins: RefCell::new(BTreeMap::new()),
            tree: RefCell::new(None),
            state: Cell::new(BuildState::Composing),
        }
    }

    /// Builder with a caller-chosen root alias. The alias must be a plain
    /// identifier since join aliases are derived from it.
    pub fn with_alias(family: Arc<Family>, alias: impl Into<String>) -> Result<Self, QueryError> {
        let alias = alias.into();
        if let Err(message) = validate_identifier(&alias) {
            return Err(QueryError::InvalidAlias { alias, message });
        }

        let mut builder = Self::new(family);
        builder.alias = alias;

        Ok(builder)
    }

    #[must_use]
    pub const fn family(&self) -> &Arc<Family> {
        &self.family
    }

    /// Root alias, stable for the lifetime of this builder.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    #[must_use]
    pub fn state(&self) -> BuildState {
        self.state.get()
    }

    /// Start a leaf on `attribute`, which must be one of the bound family's
    /// attributes.
    pub fn attribute(&self, attribute: &Attribute) -> Result<AttributeQueryBuilder<'_>, QueryError> {
        match self.family.attribute(attribute.code()) {
            Some(own) if self.family.has_attribute(attribute) => {
                Ok(AttributeQueryBuilder::new(self, Arc::clone(own)))
            }
            _ => Err(self.fail(self.unknown(attribute.code()))),
        }
    }

    pub fn attribute_by_code(&self, code: &str) -> Result<AttributeQueryBuilder<'_>, QueryError> {
        match self.family.attribute(code) {
            Some(own) => Ok(AttributeQueryBuilder::new(self, Arc::clone(own))),
            None => Err(self.fail(self.unknown(code))),
        }
    }

    /// Conjunction of `conditions`; an empty list matches every row.
    pub fn and<'q>(&'q self, conditions: impl IntoIterator<Item = Condition<'q>>) -> Condition<'q> {
        let children = self.children(conditions);
        tracing::debug!(family = self.family.code(), children = children.len(), "and");

        Condition::new(self, Predicate::And(children))
    }

    /// Disjunction of `conditions`; an empty list matches no row.
    pub fn or<'q>(&'q self, conditions: impl IntoIterator<Item = Condition<'q>>) -> Condition<'q> {
        let children = self.children(conditions);
        tracing::debug!(family = self.family.code(), children = children.len(), "or");

        Condition::new(self, Predicate::Or(children))
    }

    /// Make `condition` the tree that `apply` translates. Replacing the tree
    /// returns the builder to composing. A condition from another builder,
    /// or holding leaves outside this family and alias space, is rejected
    /// and the current tree is kept.
    pub fn filter(&self, condition: Condition<'_>) -> Result<(), QueryError> {
        if !std::ptr::eq(condition.builder(), self) {
            return Err(self.fail(QueryError::InvalidAlias {
                alias: condition.builder().alias().to_string(),
                message: format!(
                    "condition belongs to another builder, expected root alias '{}'",
                    self.alias
                ),
            }));
        }
        for leaf in condition.predicate().leaves() {
            self.check_leaf(leaf).map_err(|err| self.fail(err))?;
        }

        self.tree.replace(Some(condition.into_predicate()));
        self.state.set(BuildState::Composing);

        Ok(())
    }

    /// Drop the current tree; `apply` goes back to the unfiltered query.
    pub fn clear_filter(&self) {
        self.tree.replace(None);
        self.state.set(BuildState::Composing);
    }

    #[must_use]
    pub fn current_filter(&self) -> Option<Predicate> {
        self.tree.borrow().clone()
    }

    /// Join aliases registered so far, in attribute-code order.
    #[must_use]
    pub fn registered_joins(&self) -> Vec<JoinAlias> {
        self.joins.borrow().values().cloned().collect()
    }

    /// Translate the current tree. With no tree this is the base query of
    /// the family: every row, no filter.
    pub fn apply<H: QueryHandler + ?Sized>(&self, handler: &mut H) -> Result<H::Query, QueryError> {
        let tree = self.tree.borrow().clone();

        let query = match &tree {
            Some(predicate) => self.apply_predicate(predicate, handler)?,
            None => {
                let query = translate(handler, &self.family, &self.alias, None)?;
                self.record_applied(0, 0);
                query
            }
        };
        self.state.set(BuildState::Applied);

        Ok(query)
    }

    /// Translate an ad-hoc tree from scratch. The tree is checked against
    /// this builder's family and aliases before the handler sees it.
    pub fn apply_predicate<H: QueryHandler + ?Sized>(
        &self,
        predicate: &Predicate,
        handler: &mut H,
    ) -> Result<H::Query, QueryError> {
        for leaf in predicate.leaves() {
            self.check_leaf(leaf).map_err(|err| self.fail(err))?;
        }

        let query = translate(handler, &self.family, &self.alias, Some(predicate))?;
        self.record_applied(predicate.join_aliases().len(), predicate.leaves().len());

        Ok(query)
    }

    /// Join alias for `attribute`, registering it on first use.
    pub(crate) fn join_for(&self, attribute: &Attribute) -> JoinAlias {
        let mut joins = self.joins.borrow_mut();
        if let Some(alias) = joins.get(attribute.code()) {
            return alias.clone();
        }

        let alias = JoinAlias::for_attribute(&self.alias, attribute);
        sink::record(MetricsEvent::JoinRegistered {
            family: self.family.code(),
            alias: alias.as_str(),
        });
        joins.insert(attribute.code().to_string(), alias.clone());

        alias
    }

    /// Record a failed composition step and hand the error back.
    pub(crate) fn fail(&self, err: QueryError) -> QueryError {
        sink::record(MetricsEvent::BuildFailed {
            family: self.family.code(),
            kind: err.kind(),
        });

        err
    }

    fn unknown(&self, code: &str) -> QueryError {
        QueryError::UnknownAttribute {
            family: self.family.code().to_string(),
            attribute: code.to_string(),
        }
    }

    fn children<'q>(&'q self, conditions: impl IntoIterator<Item = Condition<'q>>) -> Vec<Predicate> {
        conditions
            .into_iter()
            .map(|condition| {
                debug_assert!(std::ptr::eq(condition.builder(), self));
                condition.into_predicate()
            })
            .collect()
    }

    fn check_leaf(&self, leaf: &PredicateLeaf) -> Result<(), QueryError> {
        let attribute = &leaf.attribute;
        if !self.family.has_attribute(attribute) {
            return Err(self.unknown(attribute.code()));
        }

        let expected = JoinAlias::for_attribute(&self.alias, attribute);
        if leaf.alias != expected {
            return Err(QueryError::InvalidAlias {
                alias: leaf.alias.to_string(),
                message: format!("expected '{expected}' under root alias '{}'", self.alias),
            });
        }

        if !supports_operator(attribute.ty(), leaf.op) {
            return Err(QueryError::UnsupportedOperator {
                attribute: attribute.code().to_string(),
                op: leaf.op,
                ty: attribute.ty(),
            });
        }

        let values: Vec<&Value> = match (leaf.op.operand_shape(), &leaf.operand) {
            (OperandShape::None, Operand::None) => Vec::new(),
            (OperandShape::Single, Operand::Single(v)) => vec![v],
            (OperandShape::Range, Operand::Range(lo, hi)) => vec![lo, hi],
            (OperandShape::List, Operand::List(items)) => items.iter().collect(),
            (shape, operand) => {
                return Err(QueryError::TypeMismatch {
                    attribute: attribute.code().to_string(),
                    expected: format!("{shape} operand"),
                    found: format!("{} operand", operand.shape()),
                });
            }
        };

        for value in values {
            // already canonical values survive coercion unchanged
            match value.clone().coerce_for(attribute) {
                Ok(canonical) if &canonical == value => {}
                _ => {
                    return Err(QueryError::TypeMismatch {
                        attribute: attribute.code().to_string(),
                        expected: attribute.ty().to_string(),
                        found: value.kind().to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn record_applied(&self, joins: usize, leaves: usize) {
        sink::record(MetricsEvent::Applied {
            family: self.family.code(),
            joins: u64::try_from(joins).unwrap_or(u64::MAX),
            leaves: u64::try_from(leaves).unwrap_or(u64::MAX),
        });
    }
}
