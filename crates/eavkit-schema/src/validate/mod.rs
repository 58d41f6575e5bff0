//! Schema validation: local attribute checks run while a family is built,
//! registry-wide checks run once every family is known.

mod naming;

pub use naming::validate_identifier;

use crate::{err, error::ErrorTree, node::Attribute, registry::FamilyRegistry, types::AttributeType};

/// Local invariants of one attribute.
#[must_use]
pub fn validate_attribute(attribute: &Attribute) -> ErrorTree {
    let mut errs = ErrorTree::new();

    if let Err(message) = validate_identifier(attribute.code()) {
        err!(errs, "attribute code '{}': {message}", attribute.code());
    }

    match attribute.ty() {
        AttributeType::Enum if attribute.choices().is_empty() => {
            errs.add("enum attribute declares no choices");
        }
        AttributeType::Enum => {}
        _ if !attribute.choices().is_empty() => {
            err!(errs, "choices are only valid on enum attributes, not {}", attribute.ty());
        }
        _ => {}
    }

    match (attribute.ty(), attribute.target()) {
        (AttributeType::Reference, None) => errs.add("reference attribute declares no target family"),
        (AttributeType::Reference, Some(_)) => {}
        (ty, Some(target)) => err!(errs, "{ty} attribute cannot target family '{target}'"),
        (_, None) => {}
    }

    errs
}

/// Registry-wide invariants: every reference target and parent is registered.
#[must_use]
pub fn validate_registry(registry: &FamilyRegistry) -> ErrorTree {
    let mut errs = ErrorTree::new();

    for family in registry.families() {
        let mut family_errs = ErrorTree::new();

        if let Some(parent) = family.parent()
            && !registry.has_family(parent)
        {
            err!(family_errs, "extends unknown family '{parent}'");
        }

        for attribute in family.attributes() {
            if let Some(target) = attribute.target()
                && !registry.has_family(target)
            {
                family_errs.add_for(
                    attribute.code(),
                    format!("references unknown family '{target}'"),
                );
            }
        }

        errs.merge_for(family.code(), family_errs);
    }

    errs
}
