use crate::{
    error::ErrorTree,
    node::Attribute,
    validate::{validate_attribute, validate_identifier},
};
use std::{collections::BTreeSet, sync::Arc};

///
/// Family
///
/// A named, ordered set of attributes bound to one data class. Attribute
/// order is insertion order and is what forms and listings display.
///

#[derive(Clone, Debug)]
pub struct Family {
    code: String,
    label: Option<String>,
    data_class: String,
    parent: Option<String>,
    attributes: Vec<Arc<Attribute>>,
}

impl Family {
    #[must_use]
    pub fn builder(code: impl Into<String>, data_class: impl Into<String>) -> FamilyBuilder {
        FamilyBuilder::new(code, data_class)
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display label, falling back to the code.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.code)
    }

    #[must_use]
    pub fn data_class(&self) -> &str {
        &self.data_class
    }

    /// Code of the family this one extends, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    #[must_use]
    pub fn attributes(&self) -> &[Arc<Attribute>] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, code: &str) -> Option<&Arc<Attribute>> {
        self.attributes.iter().find(|a| a.code() == code)
    }

    /// Whether `attribute` is one of this family's attributes: same code and
    /// same definition. A lookalike from another family with the same code
    /// but a different declaration does not belong.
    #[must_use]
    pub fn has_attribute(&self, attribute: &Attribute) -> bool {
        self.attribute(attribute.code())
            .is_some_and(|own| std::ptr::eq(own.as_ref(), attribute) || own.as_ref() == attribute)
    }

    pub fn attribute_codes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.code())
    }
}

///
/// FamilyBuilder
///

#[derive(Debug)]
pub struct FamilyBuilder {
    code: String,
    label: Option<String>,
    data_class: String,
    parent: Option<String>,
    attributes: Vec<Arc<Attribute>>,
    own_codes: BTreeSet<String>,
    errors: ErrorTree,
}

impl FamilyBuilder {
    #[must_use]
    pub fn new(code: impl Into<String>, data_class: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: None,
            data_class: data_class.into(),
            parent: None,
            attributes: Vec::new(),
            own_codes: BTreeSet::new(),
            errors: ErrorTree::new(),
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Start from the parent's resolved attribute list. Call before adding
    /// own attributes; inherited attributes are shared, not copied.
    #[must_use]
    pub fn extends(mut self, parent: &Family) -> Self {
        self.parent = Some(parent.code.clone());
        self.attributes = parent.attributes.clone();
        self
    }

    /// Add an attribute. Redefining an inherited code replaces it in place;
    /// defining the same code twice on this family is an error.
    #[must_use]
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        let code = attribute.code().to_string();

        if !self.own_codes.insert(code.clone()) {
            self.errors
                .add_for(code, "attribute is defined more than once");
            return self;
        }

        let attribute = Arc::new(attribute);
        match self.attributes.iter_mut().find(|a| a.code() == code) {
            Some(slot) => *slot = attribute,
            None => self.attributes.push(attribute),
        }

        self
    }

    #[must_use]
    pub fn attributes<I>(self, attributes: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        attributes.into_iter().fold(self, Self::attribute)
    }

    /// Validate local invariants and freeze the family.
    pub fn build(self) -> Result<Family, ErrorTree> {
        let mut errors = self.errors;

        if let Err(message) = validate_identifier(&self.code) {
            errors.add(format!("family code '{}': {message}", self.code));
        }
        if self.data_class.trim().is_empty() {
            errors.add("data class must not be empty");
        }
        for attribute in &self.attributes {
            errors.merge_for(attribute.code(), validate_attribute(attribute));
        }

        errors.result()?;

        Ok(Family {
            code: self.code,
            label: self.label,
            data_class: self.data_class,
            parent: self.parent,
            attributes: self.attributes,
        })
    }
}
