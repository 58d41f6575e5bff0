mod attribute;
mod eav;


pub use attribute::AttributeQueryBuilder;
pub use eav::EavQueryBuilder;

use crate::db::query::{QueryError, QueryHandler, predicate::Predicate};

///
/// BuildState
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BuildState {
    /// Predicates are being composed; no native query exists yet.
    #[default]
    Composing,
    /// The current tree has been translated by a handler.
    Applied,
}

///
/// Condition
///
/// A predicate sub-tree tied to the builder that produced it. Conditions
/// from one builder share its root alias and join aliases, which is what
/// lets them be combined into a single query.
///

#[derive(Clone, Debug)]
pub struct Condition<'q> {
    eav: &'q EavQueryBuilder,
    predicate: Predicate,
}

impl<'q> Condition<'q> {
    pub(crate) const fn new(eav: &'q EavQueryBuilder, predicate: Predicate) -> Self {
        Self { eav, predicate }
    }

    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[must_use]
    pub fn into_predicate(self) -> Predicate {
        self.predicate
    }

    #[must_use]
    pub const fn builder(&self) -> &'q EavQueryBuilder {
        self.eav
    }

    /// Translate this sub-tree alone against a fresh base query.
    pub fn apply<H: QueryHandler + ?Sized>(&self, handler: &mut H) -> Result<H::Query, QueryError> {
        self.eav.apply_predicate(&self.predicate, handler)
    }
}
