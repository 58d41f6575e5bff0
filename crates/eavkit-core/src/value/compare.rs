use super::Value;
use std::cmp::Ordering;

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

impl Value {
    /// Ordering between two values of the same variant; `None` across
    /// variants and for non-orderable pairs.
    #[must_use]
    pub fn cmp_same(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Enum(a), Self::Enum(b)) | (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Reference(a), Self::Reference(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    #[must_use]
    pub fn eq_same(&self, other: &Self) -> bool {
        self.cmp_same(other) == Some(Ordering::Equal)
    }

    /// Case-sensitive substring tests on text values.
    #[must_use]
    pub fn text_matches(&self, needle: &Self, op: TextOp) -> bool {
        let (Self::Text(hay), Self::Text(needle)) = (self, needle) else {
            return false;
        };

        match op {
            TextOp::Contains => hay.contains(needle.as_str()),
            TextOp::StartsWith => hay.starts_with(needle.as_str()),
            TextOp::EndsWith => hay.ends_with(needle.as_str()),
        }
    }
}
