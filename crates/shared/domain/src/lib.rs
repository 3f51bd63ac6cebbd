//! # Domain Models
//!
//! Pure data shared by the settings engine and its collaborators.
//! Keep it lean: no I/O and no registry logic, just values and simple helpers.

pub mod input;
pub mod kinds;
pub mod reserved;

pub use input::Input;
pub use kinds::Kinds;

/// Dynamic value carried by options and memoized attributes.
pub type Value = serde_json::Value;
