use crate::types::{AttributeType, Cardinality};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt};

///
/// Attribute
///
/// One typed, named field of a family. Built once while the family is
/// assembled; families hand attributes out behind `Arc` and never mutate them
/// afterwards.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    code: String,
    ty: AttributeType,
    cardinality: Cardinality,
    required: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    choices: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    form_type: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    form_options: BTreeMap<String, JsonValue>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    options: BTreeMap<String, JsonValue>,
}

impl Attribute {
    #[must_use]
    pub fn new(code: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            code: code.into(),
            ty,
            cardinality: Cardinality::One,
            required: false,
            choices: Vec::new(),
            target: None,
            form_type: None,
            form_options: BTreeMap::new(),
            options: BTreeMap::new(),
        }
    }

    //
    // construction
    //

    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.cardinality = Cardinality::Many;
        self
    }

    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_target(mut self, family: impl Into<String>) -> Self {
        self.target = Some(family.into());
        self
    }

    #[must_use]
    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_type = Some(form_type.into());
        self
    }

    #[must_use]
    pub fn with_form_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.form_options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    //
    // read accessors
    //

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub const fn ty(&self) -> AttributeType {
        self.ty
    }

    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self.cardinality, Cardinality::Many)
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn has_choice(&self, choice: &str) -> bool {
        self.choices.iter().any(|c| c == choice)
    }

    /// Family code a reference attribute points at.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub fn option(&self, key: &str) -> Option<&JsonValue> {
        self.options.get(key)
    }

    #[must_use]
    pub const fn options(&self) -> &BTreeMap<String, JsonValue> {
        &self.options
    }

    // hidden attributes never reach the edit form
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.option("hidden").is_some_and(is_truthy)
    }

    #[must_use]
    pub fn form_type(&self) -> &str {
        self.form_type
            .as_deref()
            .unwrap_or_else(|| self.ty.default_form_type())
    }

    /// Options handed to the form widget: the configured ones, plus
    /// `required` and the enum `choices` unless configured explicitly.
    #[must_use]
    pub fn form_options(&self) -> BTreeMap<String, JsonValue> {
        let mut options = self.form_options.clone();
        options
            .entry("required".to_string())
            .or_insert(JsonValue::Bool(self.required));

        if matches!(self.ty, AttributeType::Enum) {
            options.entry("choices".to_string()).or_insert_with(|| {
                JsonValue::Array(self.choices.iter().cloned().map(JsonValue::String).collect())
            });
        }

        options
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

// PHP-style truthiness for option bags coming out of config files
fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => !s.is_empty() && s != "0",
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
    }
}
