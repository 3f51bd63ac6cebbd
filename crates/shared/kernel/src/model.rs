use crate::error::ModelError;
use crate::locale::Catalog;
use crate::memo::MemoDef;
use crate::option::OptionDef;
use crate::policy::Policy;
use crate::registry::{Registry, Shape};
use crate::settings::Settings;
use crate::validator::{Errors, ValidatorDef};
use settle_domain::{Input, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Copy-on-write clones keep `id`: a model stays the same model while it gains declarations.
#[derive(Debug, Clone)]
pub(crate) struct ModelInner {
    id: u64,
    pub(crate) name: Cow<'static, str>,
    /// Names of the models this one was derived from, nearest first.
    pub(crate) ancestors: Vec<Cow<'static, str>>,
    /// Ids of the models merged in through [`Model::extend`].
    extended: Vec<u64>,
    pub(crate) registry: Registry,
    catalog: Arc<Catalog>,
    policy: OnceLock<Arc<Policy>>,
}

/// A settings model: the declared options, memos and validators of one scope.
///
/// Declarations go through copy-on-write, so instances built earlier keep the
/// snapshot they were built from and building never touches the declarations.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use settle_kernel::{Input, Model, OptionDef};
///
/// let mut model = Model::new("Test.model");
/// model
///     .option("id")?
///     .memo("square_id", |s| Ok(json!(s.get_as::<i64>("id")?.pow(2))))?
///     .validate(|s, errors| {
///         if s.get_as::<i64>("id")? < 0 {
///             errors.add("id_positive");
///         }
///         Ok(())
///     });
///
/// let settings = model.build(Input::new().with("id", 42))?;
/// assert_eq!(settings.get("square_id")?, json!(1764));
/// # Ok::<(), settle_kernel::ModelError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                id: next_id(),
                name: name.into(),
                ancestors: Vec::new(),
                extended: Vec::new(),
                registry: Registry::default(),
                catalog: Arc::default(),
                policy: OnceLock::new(),
            }),
        }
    }

    /// Starts a child model that inherits every declaration of `self`.
    #[must_use]
    pub fn derive(&self, name: impl Into<Cow<'static, str>>) -> Self {
        let parent = &self.inner;
        let mut ancestors = Vec::with_capacity(parent.ancestors.len() + 1);
        ancestors.push(parent.name.clone());
        ancestors.extend(parent.ancestors.iter().cloned());

        Self {
            inner: Arc::new(ModelInner {
                id: next_id(),
                name: name.into(),
                ancestors,
                extended: parent.extended.clone(),
                registry: parent.registry.clone(),
                catalog: Arc::clone(&parent.catalog),
                policy: OnceLock::new(),
            }),
        }
    }

    /// Replaces the catalog used to render violation messages.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.set_catalog(catalog);
        self
    }

    pub fn set_catalog(&mut self, catalog: Arc<Catalog>) {
        let inner = Arc::make_mut(&mut self.inner);
        inner.catalog = catalog;
        inner.policy = OnceLock::new();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.inner.ancestors.iter().map(AsRef::as_ref)
    }

    /// Declares an option.
    ///
    /// # Errors
    /// Returns [`ModelError::ReservedName`] if the accessor is reserved by the DSL and
    /// [`ModelError::DuplicateName`] if the key or accessor is already declared.
    pub fn option(&mut self, def: impl Into<OptionDef>) -> Result<&mut Self, ModelError> {
        let def = def.into();
        debug!(model = %self.inner.name, key = def.key(), accessor = def.accessor(), "declaring option");
        Arc::make_mut(&mut self.inner).registry.add_option(def)?;
        Ok(self)
    }

    /// Declares a memoized attribute, computed on first read and cached per instance.
    ///
    /// # Errors
    /// Same name rules as [`Model::option`].
    pub fn memo<F>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        compute: F,
    ) -> Result<&mut Self, ModelError>
    where
        F: Fn(&Settings) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        let def = MemoDef::new(name, compute);
        debug!(model = %self.inner.name, memo = def.name(), "declaring memo");
        Arc::make_mut(&mut self.inner).registry.add_memo(def)?;
        Ok(self)
    }

    /// Declares a validator; every validator runs on every construction.
    pub fn validate<F>(&mut self, check: F) -> &mut Self
    where
        F: Fn(&Settings, &mut Errors) -> Result<(), ModelError> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.inner).registry.add_validator(ValidatorDef::new(check));
        self
    }

    /// Merges every declaration of `other` into this model.
    ///
    /// Nothing is merged when any name collides, and extending the same model twice
    /// (directly or through another extended model) is rejected as a duplicate.
    /// Models are told apart by identity, so distinct models may share a name.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateName`] on any collision.
    pub fn extend(&mut self, other: &Self) -> Result<&mut Self, ModelError> {
        let source = &other.inner;
        if self.inner.extended.contains(&source.id) {
            return Err(ModelError::duplicate(&source.name));
        }

        let inner = Arc::make_mut(&mut self.inner);
        inner.registry.merge(&source.registry)?;
        inner.extended.push(source.id);
        inner.extended.extend(&source.extended);

        debug!(model = %inner.name, source = %source.name, "extended model");
        Ok(self)
    }

    /// The model's error policy, created on first use.
    pub fn policy(&self) -> Arc<Policy> {
        let inner = &self.inner;
        Arc::clone(inner.policy.get_or_init(|| {
            Arc::new(Policy::new(
                inner.name.clone(),
                inner.ancestors.clone(),
                Arc::clone(&inner.catalog),
            ))
        }))
    }

    /// Current declarations, for introspection.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.inner.registry.shape()
    }

    /// Builds a validated instance.
    ///
    /// Options are resolved in declaration order, then the input is checked for keys no
    /// option declares, then all validators run. Either every step succeeds or no
    /// instance is produced.
    ///
    /// # Errors
    /// * [`ModelError::MissingKey`] when a required option is absent.
    /// * [`ModelError::InvalidValue`] when a coercion rejects a value.
    /// * [`ModelError::UnknownKey`] for input keys matching no option.
    /// * [`ModelError::Invalid`] with rendered messages when validators report codes.
    /// * Any error a validator returns.
    pub fn build(&self, input: impl Into<Input>) -> Result<Settings, ModelError> {
        let input = input.into();
        let inner = &self.inner;
        let registry = &inner.registry;

        let mut resolved = BTreeMap::new();
        let mut values = Vec::with_capacity(registry.options().len());
        for def in registry.options() {
            let value = def.resolve(&inner.name, input.get(def.key()), &resolved)?;
            resolved.insert(def.accessor().to_owned(), value.clone());
            values.push(value);
        }

        if let Some(key) = input.keys().find(|key| !registry.has_key(key)) {
            return Err(ModelError::UnknownKey {
                model: inner.name.clone(),
                key: key.to_owned().into(),
                context: None,
            });
        }

        let settings = Settings::new(Arc::clone(inner), values);
        let mut errors = Errors::new();
        for validator in registry.validators() {
            validator.run(&settings, &mut errors)?;
        }

        if errors.is_empty() {
            debug!(model = %inner.name, "settings built");
            return Ok(settings);
        }

        debug!(model = %inner.name, codes = ?errors, "settings rejected");
        let messages = self.policy().messages(&errors);
        Err(ModelError::Invalid {
            model: inner.name.clone(),
            codes: errors.into_codes(),
            messages,
            context: None,
        })
    }
}
