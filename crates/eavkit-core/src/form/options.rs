//! Option resolution for data forms.
//!
//! Stages run in a fixed order and each one only sees what the previous
//! stages produced: family, then data class, then empty data, then the
//! supplied data.

use super::{FormError, FormOptions};
use crate::data::Data;
use eavkit_schema::{node::Family, registry::FamilyRegistry};
use std::sync::Arc;

///
/// FamilyOption
///

#[derive(Clone, Debug, Default)]
pub enum FamilyOption {
    #[default]
    None,
    Family(Arc<Family>),
    Code(String),
}

impl From<Arc<Family>> for FamilyOption {
    fn from(family: Arc<Family>) -> Self {
        Self::Family(family)
    }
}

impl From<&str> for FamilyOption {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

///
/// DataFormOptions
/// caller-supplied options, before resolution
///

#[derive(Clone, Debug, Default)]
pub struct DataFormOptions<'a> {
    pub family: FamilyOption,
    pub data_class: Option<String>,
    pub data: Option<&'a Data>,
    pub form_options: FormOptions,
}

impl<'a> DataFormOptions<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn family(mut self, family: impl Into<FamilyOption>) -> Self {
        self.family = family.into();
        self
    }

    #[must_use]
    pub fn data_class(mut self, data_class: impl Into<String>) -> Self {
        self.data_class = Some(data_class.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: &'a Data) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn form_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.form_options.insert(key.into(), value.into());
        self
    }
}

///
/// ResolvedFormOptions
///

#[derive(Clone, Debug)]
pub struct ResolvedFormOptions<'a> {
    pub family: Option<Arc<Family>>,
    pub data_class: String,
    pub empty_data: Option<Data>,
    pub data: Option<&'a Data>,
    pub form_options: FormOptions,
}

/// Run every stage over `options`.
pub fn resolve<'a>(
    registry: &FamilyRegistry,
    default_data_class: &str,
    options: DataFormOptions<'a>,
) -> Result<ResolvedFormOptions<'a>, FormError> {
    let family = resolve_family(registry, options.family)?;
    let data_class = resolve_data_class(
        family.as_deref(),
        options.data_class.as_deref().unwrap_or(default_data_class),
    );
    let empty_data = resolve_empty_data(family.as_ref());
    let data = validate_data(family.as_deref(), options.data)?;

    Ok(ResolvedFormOptions {
        family,
        data_class,
        empty_data,
        data,
        form_options: options.form_options,
    })
}

/// Codes go through the registry; an unknown code is an error.
pub fn resolve_family(
    registry: &FamilyRegistry,
    family: FamilyOption,
) -> Result<Option<Arc<Family>>, FormError> {
    match family {
        FamilyOption::None => Ok(None),
        FamilyOption::Family(family) => Ok(Some(family)),
        FamilyOption::Code(code) => Ok(Some(Arc::clone(registry.family(&code)?))),
    }
}

/// The family's data class wins over the configured one.
#[must_use]
pub fn resolve_data_class(family: Option<&Family>, configured: &str) -> String {
    family.map_or(configured, Family::data_class).to_string()
}

#[must_use]
pub fn resolve_empty_data(family: Option<&Arc<Family>>) -> Option<Data> {
    family.map(|family| Data::new(Arc::clone(family)))
}

/// Supplied data must belong to a family bound to the resolved family's
/// data class.
pub fn validate_data<'a>(
    family: Option<&Family>,
    data: Option<&'a Data>,
) -> Result<Option<&'a Data>, FormError> {
    let (Some(family), Some(data)) = (family, data) else {
        return Ok(data);
    };

    let found = data.family().data_class();
    if found != family.data_class() {
        return Err(FormError::UnexpectedData {
            expected: family.data_class().to_string(),
            found: found.to_string(),
        });
    }

    Ok(Some(data))
}
