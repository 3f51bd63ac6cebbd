use crate::error::ScopeError;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use settle_kernel::{Catalog, Errors, Input, Model, ModelError, OptionDef, Settings, Value};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// State shared by every node of one client tree.
#[derive(Debug)]
struct Shared {
    name: Cow<'static, str>,
    catalog: RwLock<Arc<Catalog>>,
    /// Bumped on every declaration anywhere in the tree; cached settings older
    /// than the current generation are rebuilt.
    generation: AtomicU64,
}

impl Shared {
    fn touch(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Root of a scope tree. Owns the message catalog shared by all of its nodes.
///
/// # Example
///
/// ```rust
/// use settle_kernel::{Input, OptionDef};
/// use settle_scope::Client;
///
/// let client = Client::new("Github");
/// let root = client.root();
/// root.option(OptionDef::new("token"))?;
///
/// let repos = root.scope("repos")?;
/// repos.option("owner")?;
/// let list = repos.operation("list")?;
/// assert_eq!(list.to_string(), "Github.repos.list");
///
/// let settings = list.build(Input::new().with("token", "t").with("owner", "rust-lang"))?;
/// assert_eq!(settings.model(), "Github.repos.list");
/// # Ok::<(), settle_scope::ScopeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    shared: Arc<Shared>,
    root: Arc<Schema>,
}

impl Client {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let shared = Arc::new(Shared {
            name: name.into(),
            catalog: RwLock::default(),
            generation: AtomicU64::new(0),
        });
        let root = Arc::new(Schema::new(&shared, shared.name.clone(), NodeKind::Scope, None));
        Self { shared, root }
    }

    #[must_use]
    pub fn with_catalog(self, catalog: Catalog) -> Self {
        self.set_catalog(catalog);
        self
    }

    /// Replaces the catalog; nodes pick it up on their next `settings()`.
    pub fn set_catalog(&self, catalog: Catalog) {
        *self.shared.catalog.write() = Arc::new(catalog);
        self.shared.touch();
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.shared.catalog.read())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// The node named after the client itself.
    #[must_use]
    pub fn root(&self) -> Arc<Schema> {
        Arc::clone(&self.root)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scope,
    /// Leaf node; cannot have children.
    Operation,
}

impl NodeKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::Operation => "operation",
        }
    }
}

/// A node of the scope tree.
///
/// The node's own declarations live in a private model. Its effective settings
/// model is derived from the parent's effective model and then extended with the
/// node's own declarations, so everything an ancestor declares is inherited.
pub struct Schema {
    name: Cow<'static, str>,
    path: String,
    kind: NodeKind,
    parent: Option<Weak<Schema>>,
    shared: Arc<Shared>,
    own: Mutex<Model>,
    children: Mutex<FxHashMap<String, Arc<Schema>>>,
    cache: Mutex<Option<(u64, Model)>>,
}

impl Schema {
    fn new(
        shared: &Arc<Shared>,
        name: Cow<'static, str>,
        kind: NodeKind,
        parent: Option<&Arc<Self>>,
    ) -> Self {
        let path = match parent {
            Some(parent) => format!("{}.{name}", parent.path),
            None => name.to_string(),
        };

        Self {
            own: Mutex::new(Model::new(path.clone())),
            name,
            path,
            kind,
            parent: parent.map(Arc::downgrade),
            shared: Arc::clone(shared),
            children: Mutex::default(),
            cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dot-joined names from the client down to this node.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Names of the direct children, sorted.
    #[must_use]
    pub fn children(&self) -> Vec<String> {
        let mut names: Vec<_> = self.children.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// The existing direct child `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Self>> {
        self.children.lock().get(name).cloned()
    }

    /// Resolves a dotted path relative to this node; the empty path is the node itself.
    #[must_use]
    pub fn find(self: &Arc<Self>, path: &str) -> Option<Arc<Self>> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(Arc::clone(self), |node, segment| node.get(segment))
    }

    /// Returns the child scope `name`, creating it on first use.
    ///
    /// # Errors
    /// [`ScopeError::Leaf`] on an operation, [`ScopeError::Conflict`] if `name` is
    /// already an operation.
    pub fn scope(self: &Arc<Self>, name: impl Into<Cow<'static, str>>) -> Result<Arc<Self>, ScopeError> {
        self.child(name.into(), NodeKind::Scope)
    }

    /// Returns the child operation `name`, creating it on first use.
    ///
    /// # Errors
    /// As [`Schema::scope`].
    pub fn operation(
        self: &Arc<Self>,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Arc<Self>, ScopeError> {
        self.child(name.into(), NodeKind::Operation)
    }

    fn child(self: &Arc<Self>, name: Cow<'static, str>, kind: NodeKind) -> Result<Arc<Self>, ScopeError> {
        if self.kind == NodeKind::Operation {
            return Err(ScopeError::Leaf { path: self.path.clone().into(), context: None });
        }

        let mut children = self.children.lock();
        if let Some(existing) = children.get(name.as_ref()) {
            if existing.kind != kind {
                return Err(ScopeError::Conflict {
                    path: existing.path.clone().into(),
                    kind: existing.kind.as_str(),
                    context: None,
                });
            }
            return Ok(Arc::clone(existing));
        }

        let node = Arc::new(Self::new(&self.shared, name.clone(), kind, Some(self)));
        debug!(path = %node.path, kind = kind.as_str(), "created node");
        children.insert(name.into_owned(), Arc::clone(&node));
        Ok(node)
    }

    /// Declares an option on this node.
    ///
    /// The declaration is checked against everything the node already inherits.
    ///
    /// # Errors
    /// [`ScopeError::Model`] with a reserved or duplicate name.
    pub fn option(&self, def: impl Into<OptionDef>) -> Result<&Self, ScopeError> {
        let def = def.into();
        self.settings()?.option(def.clone())?;
        self.own.lock().option(def)?;
        self.shared.touch();
        Ok(self)
    }

    /// Declares a memoized attribute on this node.
    ///
    /// # Errors
    /// As [`Schema::option`].
    pub fn memo<F>(&self, name: impl Into<Cow<'static, str>>, compute: F) -> Result<&Self, ScopeError>
    where
        F: Fn(&Settings) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        let name = name.into();
        let compute = Arc::new(compute);
        let probe = Arc::clone(&compute);

        self.settings()?.memo(name.clone(), move |s| probe(s))?;
        self.own.lock().memo(name, move |s| compute(s))?;
        self.shared.touch();
        Ok(self)
    }

    /// Declares a validator on this node; descendants inherit it.
    pub fn validate<F>(&self, check: F) -> &Self
    where
        F: Fn(&Settings, &mut Errors) -> Result<(), ModelError> + Send + Sync + 'static,
    {
        self.own.lock().validate(check);
        self.shared.touch();
        self
    }

    /// Effective settings model of this node, named after its path.
    ///
    /// # Errors
    /// [`ScopeError::Model`] when an ancestor later declared a name this node already
    /// claimed, [`ScopeError::Detached`] if an ancestor no longer exists.
    pub fn settings(&self) -> Result<Model, ScopeError> {
        let generation = self.shared.generation.load(Ordering::Acquire);
        if let Some((cached, model)) = self.cache.lock().as_ref()
            && *cached == generation
        {
            return Ok(model.clone());
        }

        let mut model = match &self.parent {
            Some(parent) => {
                let parent = parent
                    .upgrade()
                    .ok_or_else(|| ScopeError::Detached { path: self.path.clone().into(), context: None })?;
                parent.settings()?.derive(self.path.clone())
            },
            None => Model::new(self.path.clone()).with_catalog(Arc::clone(&self.shared.catalog.read())),
        };
        model.extend(&self.own.lock())?;

        *self.cache.lock() = Some((generation, model.clone()));
        Ok(model)
    }

    /// Builds validated settings for this node.
    ///
    /// # Errors
    /// [`ScopeError::Model`] wrapping the construction failure.
    pub fn build(&self, input: impl Into<Input>) -> Result<Settings, ScopeError> {
        Ok(self.settings()?.build(input)?)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("children", &self.children())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_tree() {
        let client = Client::new("Github");
        let root = client.root();
        let repos = root.scope("repos").unwrap();
        let list = repos.operation("list").unwrap();

        assert_eq!(root.path(), "Github");
        assert_eq!(repos.to_string(), "Github.repos");
        assert_eq!(list.to_string(), "Github.repos.list");
        assert_eq!(list.parent().unwrap().path(), "Github.repos");
        assert!(root.parent().is_none());
    }

    #[test]
    fn children_are_reused() {
        let root = Client::new("Github").root();
        let first = root.scope("repos").unwrap();
        let second = root.scope("repos").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(root.children(), vec!["repos"]);
    }

    #[test]
    fn find_resolves_dotted_paths() {
        let root = Client::new("Github").root();
        let list = root.scope("repos").unwrap().operation("list").unwrap();

        assert!(Arc::ptr_eq(&root.find("repos.list").unwrap(), &list));
        assert!(Arc::ptr_eq(&root.find("").unwrap(), &root));
        assert!(root.find("repos.create").is_none());
        assert!(root.get("list").is_none());
    }

    #[test]
    fn operations_are_leaves() {
        let root = Client::new("Github").root();
        let list = root.operation("list").unwrap();

        assert!(matches!(list.scope("more"), Err(ScopeError::Leaf { .. })));
        assert!(matches!(root.scope("list"), Err(ScopeError::Conflict { kind: "operation", .. })));
    }

    #[test]
    fn settings_are_cached_until_the_tree_changes() {
        let root = Client::new("Github").root();
        let before = root.settings().unwrap();
        assert_eq!(root.settings().unwrap().shape(), before.shape());

        root.option("token").unwrap();
        let after = root.settings().unwrap();
        assert_eq!(after.shape().options.len(), 1);
        assert!(before.shape().options.is_empty());
    }

    #[test]
    fn detached_nodes_report_it() {
        let repos = Client::new("Github").root().scope("repos").unwrap();

        assert!(matches!(repos.settings(), Err(ScopeError::Detached { .. })));
    }
}
