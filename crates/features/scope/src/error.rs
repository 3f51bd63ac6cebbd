use settle_kernel::ModelError;
use std::borrow::Cow;

#[settle_derive::settle_error]
pub enum ScopeError {
    #[error("Scope model error{}: {source}", format_context(.context))]
    Model { source: ModelError, context: Option<Cow<'static, str>> },

    #[error("Operation `{path}` cannot have children{}", format_context(.context))]
    Leaf { path: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Node `{path}` already exists as a {kind}{}", format_context(.context))]
    Conflict { path: Cow<'static, str>, kind: &'static str, context: Option<Cow<'static, str>> },

    #[error("Node `{path}` outlived its parent{}", format_context(.context))]
    Detached { path: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal scope error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ScopeError {
    /// The underlying model failure, if this error wraps one.
    #[must_use]
    pub const fn as_model(&self) -> Option<&ModelError> {
        match self {
            Self::Model { source, .. } => Some(source),
            _ => None,
        }
    }
}
