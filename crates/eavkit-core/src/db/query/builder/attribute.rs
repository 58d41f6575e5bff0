use super::{Condition, EavQueryBuilder};
use crate::{
    db::query::{
        QueryError,
        predicate::{CompareOp, Operand, Predicate, PredicateLeaf, supports_operator},
    },
    obs::sink::{self, MetricsEvent},
    value::Value,
};
use eavkit_schema::node::Attribute;
use std::sync::Arc;

///
/// AttributeQueryBuilder
///
/// Builds leaves for one attribute of the owning builder's family. Every
/// method checks the operator against the attribute type and coerces the
/// operands before anything is added to a tree.
///

#[derive(Clone, Debug)]
pub struct AttributeQueryBuilder<'q> {
    eav: &'q EavQueryBuilder,
    attribute: Arc<Attribute>,
}

impl<'q> AttributeQueryBuilder<'q> {
    pub(crate) const fn new(eav: &'q EavQueryBuilder, attribute: Arc<Attribute>) -> Self {
        Self { eav, attribute }
    }

    #[must_use]
    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn eq(&self, value: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::Eq, value.into())
    }

    pub fn ne(&self, value: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::Ne, value.into())
    }

    pub fn lt(&self, value: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::Lt, value.into())
    }

    pub fn lte(&self, value: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::Lte, value.into())
    }

    pub fn gt(&self, value: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::Gt, value.into())
    }

    pub fn gte(&self, value: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::Gte, value.into())
    }

    /// Inclusive on both ends.
    pub fn between(
        &self,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Result<Condition<'q>, QueryError> {
        self.check_op(CompareOp::Between)?;
        let low = self.coerce(low.into())?;
        let high = self.coerce(high.into())?;

        Ok(self.leaf(CompareOp::Between, Operand::Range(low, high)))
    }

    /// Membership; an empty set matches nothing.
    pub fn in_list<I, V>(&self, values: I) -> Result<Condition<'q>, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.list(CompareOp::In, values)
    }

    /// Non-membership; an empty set matches any stored value.
    pub fn not_in<I, V>(&self, values: I) -> Result<Condition<'q>, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.list(CompareOp::NotIn, values)
    }

    /// True when no value is stored for the attribute.
    pub fn is_null(&self) -> Result<Condition<'q>, QueryError> {
        self.check_op(CompareOp::IsNull)?;

        Ok(self.leaf(CompareOp::IsNull, Operand::None))
    }

    pub fn is_not_null(&self) -> Result<Condition<'q>, QueryError> {
        self.check_op(CompareOp::IsNotNull)?;

        Ok(self.leaf(CompareOp::IsNotNull, Operand::None))
    }

    pub fn contains(&self, needle: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::Contains, needle.into())
    }

    pub fn starts_with(&self, prefix: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::StartsWith, prefix.into())
    }

    pub fn ends_with(&self, suffix: impl Into<Value>) -> Result<Condition<'q>, QueryError> {
        self.single(CompareOp::EndsWith, suffix.into())
    }

    fn single(&self, op: CompareOp, value: Value) -> Result<Condition<'q>, QueryError> {
        self.check_op(op)?;
        let value = self.coerce(value)?;

        Ok(self.leaf(op, Operand::Single(value)))
    }

    fn list<I, V>(&self, op: CompareOp, values: I) -> Result<Condition<'q>, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.check_op(op)?;
        let values = values
            .into_iter()
            .map(|v| self.coerce(v.into()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.leaf(op, Operand::List(values)))
    }

    fn check_op(&self, op: CompareOp) -> Result<(), QueryError> {
        if supports_operator(self.attribute.ty(), op) {
            return Ok(());
        }

        Err(self.eav.fail(QueryError::UnsupportedOperator {
            attribute: self.attribute.code().to_string(),
            op,
            ty: self.attribute.ty(),
        }))
    }

    fn coerce(&self, value: Value) -> Result<Value, QueryError> {
        value.coerce_for(&self.attribute).map_err(|err| {
            self.eav.fail(QueryError::TypeMismatch {
                attribute: self.attribute.code().to_string(),
                expected: err.expected,
                found: err.found.to_string(),
            })
        })
    }

    // Only reached once the operands are valid, so a failed leaf never
    // leaves a join behind.
    fn leaf(&self, op: CompareOp, operand: Operand) -> Condition<'q> {
        let alias = self.eav.join_for(&self.attribute);
        sink::record(MetricsEvent::LeafBuilt {
            family: self.eav.family().code(),
            op,
        });

        Condition::new(
            self.eav,
            Predicate::Leaf(PredicateLeaf {
                attribute: Arc::clone(&self.attribute),
                op,
                operand,
                alias,
            }),
        )
    }
}
