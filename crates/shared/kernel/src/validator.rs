use crate::error::ModelError;
use crate::settings::Settings;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type CheckFn = dyn Fn(&Settings, &mut Errors) -> Result<(), ModelError> + Send + Sync;

/// Violation codes collected during a single construction attempt.
///
/// Append-only; adding a code twice keeps one entry.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Errors {
    codes: Vec<Cow<'static, str>>,
}

impl Errors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, code: impl Into<Cow<'static, str>>) {
        let code = code.into();
        if !self.contains(&code) {
            self.codes.push(code);
        }
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(AsRef::as_ref)
    }

    pub(crate) fn into_codes(self) -> Vec<Cow<'static, str>> {
        self.codes
    }
}

impl fmt::Debug for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A check run against every freshly constructed instance.
#[derive(Clone)]
pub struct ValidatorDef {
    check: Arc<CheckFn>,
}

impl ValidatorDef {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Settings, &mut Errors) -> Result<(), ModelError> + Send + Sync + 'static,
    {
        Self { check: Arc::new(check) }
    }

    pub(crate) fn run(&self, settings: &Settings, errors: &mut Errors) -> Result<(), ModelError> {
        (self.check)(settings, errors)
    }
}

impl fmt::Debug for ValidatorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidatorDef(..)")
    }
}
