//! Settings model engine.
//!
//! A [`Model`] collects option, memo and validator declarations and builds immutable,
//! validated [`Settings`] instances from keyword [`Input`]. Models compose with
//! [`Model::extend`] and inherit with [`Model::derive`]; violation codes are rendered
//! through the model's [`Policy`] and a message [`Catalog`].
//!
//! ```rust
//! use serde_json::json;
//! use settle_kernel::prelude::*;
//!
//! let mut person = Model::new("Person");
//! person
//!     .option(OptionDef::new("first_name").optional())?
//!     .option(OptionDef::new("last_name").optional())?
//!     .memo("name", |s| {
//!         let parts: Vec<String> = ["first_name", "last_name"]
//!             .iter()
//!             .filter_map(|key| s.get_as::<Option<String>>(key).transpose())
//!             .collect::<Result<_, _>>()?;
//!         Ok(json!(parts.join(" ")))
//!     })?
//!     .validate(|s, errors| {
//!         if s.get_as::<String>("name")?.is_empty() {
//!             errors.add("empty_name");
//!         }
//!         Ok(())
//!     });
//!
//! let mut user = Model::new("User");
//! user.extend(&person)?.option(OptionDef::new("email").optional())?;
//!
//! let joe = user.build(Input::new().with("first_name", "Joe").with("last_name", "Doe"))?;
//! assert_eq!(joe.get("name")?, json!("Joe Doe"));
//! # Ok::<(), ModelError>(())
//! ```

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
mod error;
pub mod locale;
mod memo;
mod model;
mod option;
mod policy;
pub mod prelude;
mod registry;
mod settings;
mod validator;

pub use error::{ModelError, ModelErrorExt};
pub use locale::{Catalog, CatalogError};
pub use memo::MemoDef;
pub use model::Model;
pub use option::{Coercion, DefaultValue, OptionDef, Resolved};
pub use policy::Policy;
pub use registry::{OptionShape, Shape};
pub use settings::Settings;
pub use settle_domain as domain;
pub use settle_domain::{Input, Kinds, Value};
pub use validator::{Errors, ValidatorDef};
