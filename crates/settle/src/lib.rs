//! Facade crate for the settings model engine.
//! Re-exports domain/kernel primitives and, with the `scope` feature, the scope tree.
//! Keep this crate thin: it should compose other crates, not implement behaviour.
//!
//! ## Usage
//! - Add `settle` (the `scope` and `config` features are on by default).
//! - `use settle::prelude::*;` for everything needed to declare and build models.
//!
//! ```rust
//! use settle::prelude::*;
//!
//! let client = Client::new("Github");
//! client.root().option(OptionDef::new("token"))?;
//! let settings = client.root().scope("repos")?.build(Input::new().with("token", "t"))?;
//! assert_eq!(settings.model(), "Github.repos");
//! # Ok::<(), ScopeError>(())
//! ```

pub use settle_domain as domain;
pub use settle_kernel as kernel;
#[cfg(feature = "scope")]
pub use settle_scope as scope;

#[cfg(all(feature = "config", not(target_arch = "wasm32")))]
pub use settle_kernel::config;

pub mod prelude {
    pub use settle_kernel::prelude::*;
    #[cfg(feature = "scope")]
    pub use settle_scope::{Client, NodeKind, Schema, ScopeError, ScopeErrorExt};
}

/// Build-time enabled features (by Cargo feature).
pub const ENABLED: &[&str] = &[
    #[cfg(feature = "scope")]
    "scope",
    #[cfg(feature = "config")]
    "config",
];

#[must_use]
pub fn is_enabled(name: &str) -> bool {
    ENABLED.contains(&name)
}
