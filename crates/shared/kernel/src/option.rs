use crate::error::ModelError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use settle_domain::{Kinds, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type CoerceFn = dyn Fn(Value) -> Result<Value, String> + Send + Sync;
type ProduceFn = dyn Fn(&Resolved<'_>) -> Value + Send + Sync;

/// How a supplied value is checked or converted before it is stored.
#[derive(Clone)]
pub enum Coercion {
    /// Accept only values of these kinds, unchanged.
    Kinds(Kinds),
    /// Arbitrary conversion; `Err` carries the reason shown to the caller.
    Custom(Arc<CoerceFn>),
}

impl Coercion {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Round-trips the value through `T`, normalizing it to `T`'s serialized shape.
    #[must_use]
    pub fn typed<T>() -> Self
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        Self::custom(|value| {
            let typed: T = serde_json::from_value(value).map_err(|e| e.to_string())?;
            serde_json::to_value(typed).map_err(|e| e.to_string())
        })
    }

    pub(crate) fn apply(&self, value: Value) -> Result<Value, String> {
        match self {
            Self::Kinds(kinds) if kinds.admits(&value) => Ok(value),
            Self::Kinds(kinds) => Err(format!("expects {kinds}, got {}", Kinds::of(&value))),
            Self::Custom(f) => f(value),
        }
    }
}

impl From<Kinds> for Coercion {
    fn from(kinds: Kinds) -> Self {
        Self::Kinds(kinds)
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kinds(kinds) => f.debug_tuple("Kinds").field(kinds).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Fallback for an absent optional option.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    /// Computed from the options resolved before this one.
    Produce(Arc<ProduceFn>),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Produce(_) => f.write_str("Produce(..)"),
        }
    }
}

/// Read-only view of the options resolved so far, handed to default producers.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    values: &'a BTreeMap<String, Value>,
}

impl<'a> Resolved<'a> {
    pub(crate) const fn new(values: &'a BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    /// Value of an earlier option by accessor name.
    #[must_use]
    pub fn get(&self, accessor: &str) -> Option<&'a Value> {
        self.values.get(accessor)
    }
}

/// Declaration of a single option.
///
/// The external key is what callers pass in; the accessor is what the instance exposes.
///
/// ```rust
/// use settle_kernel::{Kinds, OptionDef};
///
/// let def = OptionDef::new("user").rename("customer").coerce(Kinds::STRING).optional();
/// assert_eq!(def.key(), "user");
/// assert_eq!(def.accessor(), "customer");
/// ```
#[derive(Debug, Clone)]
pub struct OptionDef {
    key: Cow<'static, str>,
    accessor: Option<Cow<'static, str>>,
    coercion: Option<Coercion>,
    optional: bool,
    default: Option<DefaultValue>,
}

impl OptionDef {
    #[must_use]
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self { key: key.into(), accessor: None, coercion: None, optional: false, default: None }
    }

    /// Exposes the option under a different accessor name.
    #[must_use]
    pub fn rename(mut self, accessor: impl Into<Cow<'static, str>>) -> Self {
        self.accessor = Some(accessor.into());
        self
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn coerce(mut self, coercion: impl Into<Coercion>) -> Self {
        self.coercion = Some(coercion.into());
        self
    }

    /// Fixed default; implies [`OptionDef::optional`].
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self.optional = true;
        self
    }

    /// Computed default; implies [`OptionDef::optional`].
    #[must_use]
    pub fn default_from<F>(mut self, produce: F) -> Self
    where
        F: Fn(&Resolved<'_>) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Produce(Arc::new(produce)));
        self.optional = true;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn accessor(&self) -> &str {
        self.accessor.as_deref().unwrap_or(&self.key)
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub const fn coercion(&self) -> Option<&Coercion> {
        self.coercion.as_ref()
    }

    /// Resolves this option's value from the input (or its default).
    pub(crate) fn resolve(
        &self,
        model: &str,
        supplied: Option<&Value>,
        resolved: &BTreeMap<String, Value>,
    ) -> Result<Value, ModelError> {
        let value = match (supplied, &self.default) {
            (Some(value), _) => value.clone(),
            (None, Some(DefaultValue::Value(value))) => value.clone(),
            (None, Some(DefaultValue::Produce(produce))) => produce(&Resolved::new(resolved)),
            (None, None) if self.optional => return Ok(Value::Null),
            (None, None) => {
                return Err(ModelError::MissingKey {
                    model: model.to_owned().into(),
                    key: self.key.to_string().into(),
                    context: None,
                });
            },
        };

        match &self.coercion {
            Some(coercion) => coercion.apply(value).map_err(|message| ModelError::InvalidValue {
                key: self.key.to_string().into(),
                message: message.into(),
                context: None,
            }),
            None => Ok(value),
        }
    }
}

impl From<&'static str> for OptionDef {
    fn from(key: &'static str) -> Self {
        Self::new(key)
    }
}

impl From<String> for OptionDef {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(def: &OptionDef, supplied: Option<Value>) -> Result<Value, ModelError> {
        def.resolve("Test", supplied.as_ref(), &BTreeMap::new())
    }

    #[test]
    fn accessor_defaults_to_key() {
        let def = OptionDef::new("id");
        assert_eq!(def.accessor(), "id");
        assert!(!def.is_optional());

        let renamed = OptionDef::new("basic_auth").rename("something");
        assert_eq!(renamed.key(), "basic_auth");
        assert_eq!(renamed.accessor(), "something");
    }

    #[test]
    fn missing_required_names_the_key() {
        let err = resolve(&OptionDef::new("user").rename("customer"), None).unwrap_err();
        assert!(matches!(err, ModelError::MissingKey { ref key, .. } if key == "user"));
        assert!(err.to_string().contains("user"));
    }

    #[test]
    fn optional_without_default_is_null() {
        let value = resolve(&OptionDef::new("email").optional(), None).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn defaults_imply_optional_and_can_use_earlier_options() {
        let fixed = OptionDef::new("port").with_default(443);
        assert!(fixed.is_optional());
        assert_eq!(resolve(&fixed, None).unwrap(), json!(443));

        let produced = OptionDef::new("url").default_from(|resolved| {
            let host = resolved.get("host").and_then(Value::as_str).unwrap_or("localhost");
            json!(format!("https://{host}"))
        });
        let mut earlier = BTreeMap::new();
        earlier.insert("host".to_owned(), json!("example.com"));
        assert_eq!(produced.resolve("Test", None, &earlier).unwrap(), json!("https://example.com"));
    }

    #[test]
    fn kind_coercion_rejects_mismatches() {
        let def = OptionDef::new("id").coerce(Kinds::INTEGER);
        assert_eq!(resolve(&def, Some(json!(42))).unwrap(), json!(42));

        let err = resolve(&def, Some(json!("42"))).unwrap_err();
        assert!(matches!(err, ModelError::InvalidValue { .. }));
        assert!(err.to_string().contains("expects integer, got string"));
    }

    #[test]
    fn typed_and_custom_coercions() {
        let typed = OptionDef::new("tags").coerce(Coercion::typed::<Vec<String>>());
        assert_eq!(resolve(&typed, Some(json!(["a", "b"]))).unwrap(), json!(["a", "b"]));
        assert!(resolve(&typed, Some(json!("a"))).is_err());

        let upcase = OptionDef::new("code").coerce(Coercion::custom(|value| {
            value.as_str().map(|s| json!(s.to_uppercase())).ok_or_else(|| "must be text".to_owned())
        }));
        assert_eq!(resolve(&upcase, Some(json!("ab"))).unwrap(), json!("AB"));
    }
}
