//! Declarations of a single model: options, memos and validators in registration order.

use crate::error::ModelError;
use crate::memo::MemoDef;
use crate::option::OptionDef;
use crate::validator::ValidatorDef;
use fxhash::{FxHashMap, FxHashSet};
use settle_domain::reserved::is_reserved;

/// Where an accessor name points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Accessor {
    Option(usize),
    Memo(usize),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    options: Vec<OptionDef>,
    memos: Vec<MemoDef>,
    validators: Vec<ValidatorDef>,
    keys: FxHashSet<String>,
    accessors: FxHashMap<String, Accessor>,
}

impl Registry {
    pub(crate) fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub(crate) fn memos(&self) -> &[MemoDef] {
        &self.memos
    }

    pub(crate) fn validators(&self) -> &[ValidatorDef] {
        &self.validators
    }

    pub(crate) fn has_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub(crate) fn accessor(&self, name: &str) -> Option<Accessor> {
        self.accessors.get(name).copied()
    }

    /// Checks that `name` may become a new accessor.
    fn claimable(&self, name: &str) -> Result<(), ModelError> {
        if is_reserved(name) {
            return Err(ModelError::reserved(name));
        }
        if self.accessors.contains_key(name) {
            return Err(ModelError::duplicate(name));
        }
        Ok(())
    }

    pub(crate) fn add_option(&mut self, def: OptionDef) -> Result<(), ModelError> {
        self.claimable(def.accessor())?;
        if self.keys.contains(def.key()) {
            return Err(ModelError::duplicate(def.key()));
        }

        self.keys.insert(def.key().to_owned());
        self.accessors.insert(def.accessor().to_owned(), Accessor::Option(self.options.len()));
        self.options.push(def);
        Ok(())
    }

    pub(crate) fn add_memo(&mut self, def: MemoDef) -> Result<(), ModelError> {
        self.claimable(def.name())?;

        self.accessors.insert(def.name().to_owned(), Accessor::Memo(self.memos.len()));
        self.memos.push(def);
        Ok(())
    }

    pub(crate) fn add_validator(&mut self, def: ValidatorDef) {
        self.validators.push(def);
    }

    /// Appends every declaration of `other`, keeping its order.
    ///
    /// All-or-nothing: on the first collision `self` is left untouched.
    pub(crate) fn merge(&mut self, other: &Self) -> Result<(), ModelError> {
        let mut merged = self.clone();
        for def in &other.options {
            merged.add_option(def.clone())?;
        }
        for def in &other.memos {
            merged.add_memo(def.clone())?;
        }
        merged.validators.extend(other.validators.iter().cloned());

        *self = merged;
        Ok(())
    }

    pub(crate) fn shape(&self) -> Shape {
        Shape {
            options: self
                .options
                .iter()
                .map(|def| OptionShape {
                    key: def.key().to_owned(),
                    accessor: def.accessor().to_owned(),
                    optional: def.is_optional(),
                })
                .collect(),
            memos: self.memos.iter().map(|def| def.name().to_owned()).collect(),
            validators: self.validators.len(),
        }
    }
}

/// Introspection snapshot of a model's declarations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Shape {
    pub options: Vec<OptionShape>,
    pub memos: Vec<String>,
    pub validators: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OptionShape {
    pub key: String,
    pub accessor: String,
    pub optional: bool,
}
