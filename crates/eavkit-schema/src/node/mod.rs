mod attribute;
mod family;

pub use attribute::Attribute;
pub use family::{Family, FamilyBuilder};
