//! Message catalog used to render violation codes.
//!
//! Entries are flat dotted keys (`"Github.repos.fetch.name_present"`); nested tables in
//! TOML or JSON sources are flattened on load.

use fxhash::FxHashMap;
use settle_domain::Value;
use std::borrow::Cow;

#[settle_derive::settle_error]
pub enum CatalogError {
    #[error("Catalog parse error{}: {source}", format_context(.context))]
    Parse { source: toml::de::Error, context: Option<Cow<'static, str>> },

    #[error("Catalog encode error{}: {source}", format_context(.context))]
    Encode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The source has a shape that cannot be flattened into messages.
    #[error("Catalog shape error{}: {message}", format_context(.context))]
    Shape { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: FxHashMap<String, String>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(key, message);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(key.into(), message.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    /// Returns [`CatalogError::Parse`] for malformed TOML and [`CatalogError::Shape`]
    /// when a leaf cannot be used as a message.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let table: toml::Table = toml::from_str(raw).context("Parsing catalog")?;
        let value = serde_json::to_value(table).context("Converting catalog")?;
        Self::from_json(&value)
    }

    /// Builds a catalog from a JSON object.
    ///
    /// # Errors
    /// Returns [`CatalogError::Shape`] if `value` is not an object or holds arrays.
    pub fn from_json(value: &Value) -> Result<Self, CatalogError> {
        let Value::Object(map) = value else {
            return Err(CatalogError::Shape {
                message: "catalog root must be a table".into(),
                context: None,
            });
        };

        let mut catalog = Self::new();
        for (key, value) in map {
            catalog.flatten(key.clone(), value)?;
        }
        Ok(catalog)
    }

    fn flatten(&mut self, key: String, value: &Value) -> Result<(), CatalogError> {
        match value {
            Value::Object(map) => {
                for (child, value) in map {
                    self.flatten(format!("{key}.{child}"), value)?;
                }
            },
            Value::String(message) => self.insert(key, message.clone()),
            Value::Bool(_) | Value::Number(_) => self.insert(key, value.to_string()),
            Value::Null | Value::Array(_) => {
                return Err(CatalogError::Shape {
                    message: format!("`{key}` must be a message or a table").into(),
                    context: None,
                });
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn toml_tables_flatten_into_dotted_keys() {
        let catalog = Catalog::from_toml_str(
            r#"
            name_present = "Name is required"

            [Test.model]
            name_present = "The user has no name"

            [Github.repos.fetch]
            empty_name = "Repository name cannot be empty"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("name_present"), Some("Name is required"));
        assert_eq!(catalog.get("Test.model.name_present"), Some("The user has no name"));
        assert_eq!(
            catalog.get("Github.repos.fetch.empty_name"),
            Some("Repository name cannot be empty")
        );
    }

    #[test]
    fn malformed_sources_are_rejected() {
        assert!(matches!(Catalog::from_toml_str("= broken"), Err(CatalogError::Parse { .. })));
        assert!(matches!(Catalog::from_json(&json!(["x"])), Err(CatalogError::Shape { .. })));
        assert!(matches!(
            Catalog::from_json(&json!({ "codes": ["a", "b"] })),
            Err(CatalogError::Shape { .. })
        ));
    }
}
