use crate::Value;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// A set of JSON value kinds an option accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Kinds: u8 {
        const NULL = 1 << 0;
        const BOOL = 1 << 1;
        const INTEGER = 1 << 2;
        const FLOAT = 1 << 3;
        const STRING = 1 << 4;
        const ARRAY = 1 << 5;
        const OBJECT = 1 << 6;

        const NUMBER = Self::INTEGER.bits() | Self::FLOAT.bits();
        const ANY = Self::NULL.bits()
            | Self::BOOL.bits()
            | Self::NUMBER.bits()
            | Self::STRING.bits()
            | Self::ARRAY.bits()
            | Self::OBJECT.bits();
    }
}

impl Kinds {
    /// The single kind of `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::NULL,
            Value::Bool(_) => Self::BOOL,
            Value::Number(n) if n.is_f64() => Self::FLOAT,
            Value::Number(_) => Self::INTEGER,
            Value::String(_) => Self::STRING,
            Value::Array(_) => Self::ARRAY,
            Value::Object(_) => Self::OBJECT,
        }
    }

    /// Whether `value` belongs to this set. Integers are admitted where floats are.
    #[must_use]
    pub fn admits(self, value: &Value) -> bool {
        let kind = Self::of(value);
        self.contains(kind) || (kind == Self::INTEGER && self.contains(Self::FLOAT))
    }
}

impl From<&str> for Kinds {
    fn from(s: &str) -> Self {
        match s {
            "null" => Self::NULL,
            "bool" | "boolean" => Self::BOOL,
            "integer" | "int" => Self::INTEGER,
            "float" => Self::FLOAT,
            "number" => Self::NUMBER,
            "string" | "str" => Self::STRING,
            "array" => Self::ARRAY,
            "object" | "hash" => Self::OBJECT,
            "any" | "*" => Self::ANY,
            _ => Self::empty(),
        }
    }
}

impl fmt::Display for Kinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            return f.write_str("any");
        }
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        f.write_str(&names.join(" | ").to_lowercase())
    }
}

impl Serialize for Kinds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for Kinds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
