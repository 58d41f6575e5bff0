//! TOML family definitions.
//!
//! ```toml
//! default_data_class = "Data"
//!
//! [families.product]
//! label = "Product"
//!
//! [[families.product.attributes]]
//! code = "price"
//! type = "int"
//! required = true
//! ```

use crate::{
    Error,
    error::ErrorTree,
    node::{Attribute, Family},
    registry::FamilyRegistry,
    types::{AttributeType, Cardinality},
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid schema config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// SchemaConfig
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub default_data_class: Option<String>,

    #[serde(default)]
    pub families: BTreeMap<String, FamilyConfig>,
}

///
/// FamilyConfig
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyConfig {
    #[serde(default)]
    pub data_class: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub attributes: Vec<AttributeConfig>,
}

///
/// AttributeConfig
///

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeConfig {
    pub code: String,

    #[serde(rename = "type")]
    pub ty: AttributeType,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub choices: Vec<String>,

    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub form_type: Option<String>,

    #[serde(default)]
    pub form_options: BTreeMap<String, JsonValue>,

    #[serde(default)]
    pub options: BTreeMap<String, JsonValue>,
}

impl AttributeConfig {
    #[must_use]
    pub fn to_attribute(&self) -> Attribute {
        let cardinality = if self.multiple {
            Cardinality::Many
        } else {
            Cardinality::One
        };

        let mut attribute = Attribute::new(self.code.clone(), self.ty)
            .with_cardinality(cardinality)
            .with_required(self.required)
            .with_choices(self.choices.iter().cloned());

        if let Some(target) = &self.target {
            attribute = attribute.with_target(target.clone());
        }
        if let Some(form_type) = &self.form_type {
            attribute = attribute.with_form_type(form_type.clone());
        }
        for (key, value) in &self.form_options {
            attribute = attribute.with_form_option(key.clone(), value.clone());
        }
        for (key, value) in &self.options {
            attribute = attribute.with_option(key.clone(), value.clone());
        }

        attribute
    }
}

impl SchemaConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Build every family (parents before children), register them, then
    /// run registry-wide validation. All problems are collected into one
    /// error tree.
    pub fn into_registry(self) -> Result<FamilyRegistry, Error> {
        let order = self.resolution_order().map_err(Error::Validation)?;
        let mut registry = FamilyRegistry::new();
        let mut errs = ErrorTree::new();

        for code in order {
            let Some(config) = self.families.get(&code) else {
                continue;
            };

            let Some(data_class) = config
                .data_class
                .clone()
                .or_else(|| self.default_data_class.clone())
            else {
                errs.add_for(code, "no data_class and no default_data_class");
                continue;
            };

            let mut builder = Family::builder(code.clone(), data_class);
            if let Some(label) = &config.label {
                builder = builder.label(label.clone());
            }
            if let Some(parent) = &config.extends {
                // a parent that failed to build was already reported
                let Ok(parent) = registry.family(parent) else {
                    continue;
                };
                builder = builder.extends(parent);
            }
            builder = builder.attributes(config.attributes.iter().map(AttributeConfig::to_attribute));

            match builder.build() {
                Ok(family) => {
                    registry.register(family)?;
                }
                Err(tree) => errs.merge_for(code, tree),
            }
        }

        errs.result().map_err(Error::Validation)?;
        registry.validate().map_err(Error::Validation)?;

        tracing::debug!(families = registry.len(), "schema config loaded");

        Ok(registry)
    }

    // Topological order over `extends`; reports unknown parents and cycles.
    fn resolution_order(&self) -> Result<Vec<String>, ErrorTree> {
        let mut errs = ErrorTree::new();
        let mut order = Vec::with_capacity(self.families.len());
        let mut done = BTreeSet::new();

        for start in self.families.keys() {
            let mut chain: Vec<&str> = Vec::new();
            let mut current = Some(start.as_str());

            while let Some(code) = current {
                if done.contains(code) {
                    break;
                }
                if chain.contains(&code) {
                    errs.add_for(code, format!("inheritance cycle: {} -> {code}", chain.join(" -> ")));
                    break;
                }
                chain.push(code);

                current = match self.families.get(code).and_then(|f| f.extends.as_deref()) {
                    Some(parent) if !self.families.contains_key(parent) => {
                        errs.add_for(code, format!("extends unknown family '{parent}'"));
                        None
                    }
                    next => next,
                };
            }

            for code in chain.into_iter().rev() {
                if done.insert(code.to_string()) {
                    order.push(code.to_string());
                }
            }
        }

        errs.result()?;

        Ok(order)
    }
}
