use eavkit_schema::config::ConfigError;
use serde::Deserialize;

///
/// SqlConfig
/// table and column names of the value-per-row storage scheme
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SqlConfig {
    pub data_table: String,
    pub value_table: String,
    pub id_column: String,
    pub data_id_column: String,
    pub attribute_column: String,
    pub family_column: String,
    pub position_column: String,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            data_table: "eav_data".to_string(),
            value_table: "eav_value".to_string(),
            id_column: "id".to_string(),
            data_id_column: "data_id".to_string(),
            attribute_column: "attribute_code".to_string(),
            family_column: "family_code".to_string(),
            position_column: "position".to_string(),
        }
    }
}

impl SqlConfig {
    /// Parse overrides; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}
