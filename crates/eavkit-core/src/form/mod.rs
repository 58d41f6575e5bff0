//! Edit-form planning for data instances.
//!
//! Rendering is not done here. A [`DataForm`] walks a family and tells a
//! [`FormBuilder`] which fields to add, with which type and options; the
//! caller's UI layer does the rest.

mod options;


pub use options::{
    DataFormOptions, FamilyOption, ResolvedFormOptions, resolve, resolve_data_class,
    resolve_empty_data, resolve_family, validate_data,
};

use crate::{
    data::Data,
    obs::sink::{self, MetricsEvent},
};
use convert_case::{Case, Casing};
use eavkit_schema::{
    node::{Attribute, Family},
    registry::{FamilyRegistry, RegistryError},
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;
use time::OffsetDateTime;

/// Option bag handed to a form field.
pub type FormOptions = BTreeMap<String, JsonValue>;

/// Option key holding overrides for a multiple attribute's collection field.
pub const COLLECTION_OPTIONS: &str = "collection_options";

///
/// FormError
///

#[derive(Debug, ThisError)]
pub enum FormError {
    #[error(transparent)]
    MissingFamily(#[from] RegistryError),

    #[error("data should belong to data class '{expected}', found '{found}'")]
    UnexpectedData { expected: String, found: String },
}

///
/// FormBuilder
/// receiving end of form planning, implemented by the UI layer
///

pub trait FormBuilder {
    fn add(&mut self, name: &str, form_type: &str, options: FormOptions);
}

///
/// FormField
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub form_type: String,
    pub options: FormOptions,
}

///
/// FormPlan
/// fields in the order they were added
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormPlan {
    pub fields: Vec<FormField>,
}

impl FormPlan {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl FormBuilder for FormPlan {
    fn add(&mut self, name: &str, form_type: &str, options: FormOptions) {
        self.fields.push(FormField {
            name: name.to_string(),
            form_type: form_type.to_string(),
            options,
        });
    }
}

/// Human label for an attribute code (`unit_price` -> `Unit price`).
#[must_use]
pub fn attribute_label(attribute: &Attribute) -> String {
    attribute.code().to_case(Case::Sentence)
}

///
/// DataForm
///
/// Form behavior for data instances. Every step is a provided method so an
/// implementor can replace one step (typically [`DataForm::build_data_form`])
/// and keep the rest.
///

pub trait DataForm {
    fn registry(&self) -> &FamilyRegistry;

    /// Data class used when no family is resolved.
    fn default_data_class(&self) -> &str;

    /// Form type of the field wrapping a multiple attribute.
    fn collection_type(&self) -> &str {
        "collection"
    }

    fn block_prefix(&self) -> &str {
        "eav_data"
    }

    fn resolve_options<'a>(
        &self,
        options: DataFormOptions<'a>,
    ) -> Result<ResolvedFormOptions<'a>, FormError> {
        resolve(self.registry(), self.default_data_class(), options)
    }

    /// Resolve the family (from the data first, then the options) and
    /// populate fields for it, or fall back to the create form.
    fn build_form(&self, form: &mut dyn FormBuilder, options: &ResolvedFormOptions<'_>) {
        let family = options
            .data
            .map(|data| Arc::clone(data.family()))
            .or_else(|| options.family.clone());

        match family {
            Some(family) => {
                self.build_values_form(form, &family, options);
                self.build_data_form(form, &family, options);
            }
            None => self.build_create_form(form, options),
        }
    }

    /// Only the family selector: the family must be known before values.
    fn build_create_form(&self, form: &mut dyn FormBuilder, _options: &ResolvedFormOptions<'_>) {
        form.add("family", "family_selector", FormOptions::new());
    }

    /// Extra fields not backed by attributes. Empty by default.
    fn build_data_form(
        &self,
        _form: &mut dyn FormBuilder,
        _family: &Family,
        _options: &ResolvedFormOptions<'_>,
    ) {
    }

    fn build_values_form(
        &self,
        form: &mut dyn FormBuilder,
        family: &Family,
        options: &ResolvedFormOptions<'_>,
    ) {
        for attribute in family.attributes() {
            self.add_attribute(form, attribute, options);
        }
    }

    fn add_attribute(
        &self,
        form: &mut dyn FormBuilder,
        attribute: &Attribute,
        options: &ResolvedFormOptions<'_>,
    ) {
        if attribute.is_hidden() {
            return;
        }

        if attribute.is_multiple() {
            self.add_multiple_attribute(form, attribute, options);
        } else {
            self.add_single_attribute(form, attribute, options);
        }
    }

    /// Options: label, then the caller's form options, then the
    /// attribute's own; collection options are dropped.
    fn add_single_attribute(
        &self,
        form: &mut dyn FormBuilder,
        attribute: &Attribute,
        options: &ResolvedFormOptions<'_>,
    ) {
        let mut field = FormOptions::new();
        field.insert("label".into(), JsonValue::String(attribute_label(attribute)));
        field.extend(options.form_options.clone());
        field.extend(attribute.form_options());
        field.remove(COLLECTION_OPTIONS);

        form.add(attribute.code(), attribute.form_type(), field);
    }

    /// A collection field whose entries use the attribute's own form type.
    fn add_multiple_attribute(
        &self,
        form: &mut dyn FormBuilder,
        attribute: &Attribute,
        options: &ResolvedFormOptions<'_>,
    ) {
        let mut entry = options.form_options.clone();
        entry.extend(attribute.form_options());
        entry.insert("label".into(), JsonValue::Bool(false));
        let overrides = entry.remove(COLLECTION_OPTIONS);

        let mut collection = FormOptions::new();
        collection.insert("label".into(), JsonValue::String(attribute_label(attribute)));
        collection.insert(
            "entry_type".into(),
            JsonValue::String(attribute.form_type().to_string()),
        );
        collection.insert(
            "entry_options".into(),
            JsonValue::Object(entry.into_iter().collect()),
        );
        collection.insert("allow_add".into(), JsonValue::Bool(true));
        collection.insert("allow_delete".into(), JsonValue::Bool(true));
        collection.insert("required".into(), JsonValue::Bool(attribute.is_required()));
        collection.insert("sortable".into(), JsonValue::Bool(false));
        collection.insert(
            "prototype_name".into(),
            JsonValue::String(format!("__{}__", attribute.code())),
        );

        if let Some(JsonValue::Object(overrides)) = overrides {
            collection.extend(overrides);
        }

        form.add(attribute.code(), self.collection_type(), collection);
    }

    /// Post-submit hook.
    fn on_submit(&self, data: &mut Data) {
        data.touch(OffsetDateTime::now_utc());
    }

    /// Resolve `options` and collect the resulting fields.
    fn plan(&self, options: DataFormOptions<'_>) -> Result<FormPlan, FormError> {
        let resolved = self.resolve_options(options)?;
        let mut plan = FormPlan::default();
        self.build_form(&mut plan, &resolved);

        let family = resolved
            .data
            .map(|data| data.family().code())
            .or_else(|| resolved.family.as_deref().map(Family::code))
            .unwrap_or_default();
        sink::record(MetricsEvent::FormPlanned {
            family,
            fields: u64::try_from(plan.fields.len()).unwrap_or(u64::MAX),
        });

        Ok(plan)
    }
}

///
/// DataFormType
/// the stock [`DataForm`] over a shared registry
///

#[derive(Clone, Debug)]
pub struct DataFormType {
    registry: Arc<FamilyRegistry>,
    data_class: String,
    collection_type: String,
}

impl DataFormType {
    #[must_use]
    pub fn new(registry: Arc<FamilyRegistry>, data_class: impl Into<String>) -> Self {
        Self {
            registry,
            data_class: data_class.into(),
            collection_type: "collection".to_string(),
        }
    }

    #[must_use]
    pub fn with_collection_type(mut self, collection_type: impl Into<String>) -> Self {
        self.collection_type = collection_type.into();
        self
    }
}

impl DataForm for DataFormType {
    fn registry(&self) -> &FamilyRegistry {
        &self.registry
    }

    fn default_data_class(&self) -> &str {
        &self.data_class
    }

    fn collection_type(&self) -> &str {
        &self.collection_type
    }
}
