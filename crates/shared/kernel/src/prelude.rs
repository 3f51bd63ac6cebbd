//! Everything needed to declare and build settings models.

pub use crate::{
    Catalog, Coercion, Errors, Input, Kinds, Model, ModelError, ModelErrorExt, OptionDef, Policy,
    Settings, Value,
};
