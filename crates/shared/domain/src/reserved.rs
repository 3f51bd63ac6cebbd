//! Identifiers claimed by the settings DSL itself.
//!
//! An option or memo may not expose an accessor with one of these names.
//! Options can still use a reserved word as their external key when renamed.

pub const OPTIONS: &str = "options";
pub const DATETIME: &str = "datetime";
pub const LOGGER: &str = "logger";
pub const SCOPE: &str = "scope";
pub const BASIC_AUTH: &str = "basic_auth";
pub const KEY_AUTH: &str = "key_auth";
pub const TOKEN_AUTH: &str = "token_auth";

/// The full reserved set, in declaration order.
pub const RESERVED: &[&str] =
    &[OPTIONS, DATETIME, LOGGER, SCOPE, BASIC_AUTH, KEY_AUTH, TOKEN_AUTH];

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}
