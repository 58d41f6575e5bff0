use super::{CompareOp, Operand};
use derive_more::Display;
use eavkit_schema::types::AttributeType;

///
/// OperandShape
/// what an operator expects on its right-hand side
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum OperandShape {
    #[display("no")]
    None,
    #[display("single")]
    Single,
    #[display("range")]
    Range,
    #[display("list")]
    List,
}

///
/// OperatorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperatorClass {
    Equality,
    Ordering,
    Membership,
    Presence,
    TextSearch,
}

impl CompareOp {
    #[must_use]
    pub const fn class(self) -> OperatorClass {
        match self {
            Self::Eq | Self::Ne => OperatorClass::Equality,
            Self::Lt | Self::Lte | Self::Gt | Self::Gte | Self::Between => OperatorClass::Ordering,
            Self::In | Self::NotIn => OperatorClass::Membership,
            Self::IsNull | Self::IsNotNull => OperatorClass::Presence,
            Self::Contains | Self::StartsWith | Self::EndsWith => OperatorClass::TextSearch,
        }
    }

    #[must_use]
    pub const fn operand_shape(self) -> OperandShape {
        match self {
            Self::IsNull | Self::IsNotNull => OperandShape::None,
            Self::Between => OperandShape::Range,
            Self::In | Self::NotIn => OperandShape::List,
            _ => OperandShape::Single,
        }
    }
}

impl Operand {
    #[must_use]
    pub const fn shape(&self) -> OperandShape {
        match self {
            Self::None => OperandShape::None,
            Self::Single(_) => OperandShape::Single,
            Self::Range(..) => OperandShape::Range,
            Self::List(_) => OperandShape::List,
        }
    }
}

/// Whether `op` can be applied to attributes of type `ty`.
#[must_use]
pub const fn supports_operator(ty: AttributeType, op: CompareOp) -> bool {
    match op.class() {
        OperatorClass::Equality | OperatorClass::Membership | OperatorClass::Presence => true,
        OperatorClass::Ordering => ty.supports_ordering(),
        OperatorClass::TextSearch => ty.supports_text_search(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OPS: [CompareOp; 14] = [
        CompareOp::Between,
        CompareOp::Contains,
        CompareOp::EndsWith,
        CompareOp::Eq,
        CompareOp::Gt,
        CompareOp::Gte,
        CompareOp::In,
        CompareOp::IsNotNull,
        CompareOp::IsNull,
        CompareOp::Lt,
        CompareOp::Lte,
        CompareOp::Ne,
        CompareOp::NotIn,
        CompareOp::StartsWith,
    ];

    #[test]
    fn equality_membership_presence_apply_everywhere() {
        for ty in AttributeType::ALL {
            for op in [
                CompareOp::Eq,
                CompareOp::Ne,
                CompareOp::In,
                CompareOp::NotIn,
                CompareOp::IsNull,
                CompareOp::IsNotNull,
            ] {
                assert!(supports_operator(ty, op), "{op} on {ty}");
            }
        }
    }

    #[test]
    fn text_search_is_text_only() {
        let text_ops = [CompareOp::Contains, CompareOp::StartsWith, CompareOp::EndsWith];

        for ty in AttributeType::ALL {
            for op in text_ops {
                assert_eq!(supports_operator(ty, op), ty == AttributeType::Text);
            }
        }
    }

    #[test]
    fn ordering_follows_type_capability() {
        assert!(supports_operator(AttributeType::Date, CompareOp::Between));
        assert!(supports_operator(AttributeType::Float, CompareOp::Lt));
        assert!(!supports_operator(AttributeType::Bool, CompareOp::Gt));
        assert!(!supports_operator(AttributeType::Enum, CompareOp::Gte));
        assert!(!supports_operator(AttributeType::Reference, CompareOp::Lte));
    }

    #[test]
    fn every_operator_has_a_shape() {
        let none = ALL_OPS
            .iter()
            .filter(|op| op.operand_shape() == OperandShape::None)
            .count();
        let lists = ALL_OPS
            .iter()
            .filter(|op| op.operand_shape() == OperandShape::List)
            .count();

        assert_eq!(none, 2);
        assert_eq!(lists, 2);
        assert_eq!(CompareOp::Between.operand_shape(), OperandShape::Range);
    }
}
