use crate::error::{ModelError, ModelErrorExt};
use crate::memo::MemoTable;
use crate::model::ModelInner;
use crate::registry::Accessor;
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use settle_domain::Value;
use std::fmt;
use std::sync::Arc;

/// A validated, immutable instance of a [`Model`](crate::Model).
///
/// Option values are fixed at construction. Memos are computed on first read,
/// at most once, and cached for the lifetime of the instance.
pub struct Settings {
    model: Arc<ModelInner>,
    values: Vec<Value>,
    memos: MemoTable,
}

impl Settings {
    pub(crate) fn new(model: Arc<ModelInner>, values: Vec<Value>) -> Self {
        let memos = MemoTable::new(model.registry.memos().len());
        Self { model, values, memos }
    }

    /// Name of the model this instance was built from.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model.name
    }

    /// Whether `name` is an option accessor or a memo of this instance.
    #[must_use]
    pub fn responds_to(&self, name: &str) -> bool {
        self.model.registry.accessor(name).is_some()
    }

    /// Reads an option or memo by accessor name.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownAttribute`] for undeclared names,
    /// [`ModelError::MemoCycle`] when a memo reaches itself, or whatever a memo
    /// computation fails with.
    pub fn get(&self, name: &str) -> Result<Value, ModelError> {
        match self.model.registry.accessor(name) {
            Some(Accessor::Option(index)) => Ok(self.values[index].clone()),
            Some(Accessor::Memo(index)) => {
                self.memos.get_or_compute(index, &self.model.registry.memos()[index], self)
            },
            None => Err(ModelError::UnknownAttribute { name: name.to_owned().into(), context: None }),
        }
    }

    /// Reads an option or memo and deserializes it into `T`.
    ///
    /// # Errors
    /// As [`Settings::get`], plus [`ModelError::Decode`] if the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ModelError> {
        let value = self.get(name)?;
        serde_json::from_value::<T>(value).context(format!("Reading `{name}`"))
    }

    /// Borrowed option value; `None` for memos and undeclared names.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&Value> {
        match self.model.registry.accessor(name)? {
            Accessor::Option(index) => self.values.get(index),
            Accessor::Memo(_) => None,
        }
    }

    /// Option values keyed by accessor, in declaration order.
    pub fn options(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.model.registry.options().iter().map(|def| def.accessor()).zip(&self.values)
    }

    /// Whether the memo `name` has already been computed on this instance.
    #[must_use]
    pub fn is_memoized(&self, name: &str) -> bool {
        match self.model.registry.accessor(name) {
            Some(Accessor::Memo(index)) => self.memos.is_ready(index),
            _ => false,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.options() {
            map.entry(&name, value);
        }
        map.finish()
    }
}

/// Serializes the option values; memos are derived and left out.
impl Serialize for Settings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.options() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
