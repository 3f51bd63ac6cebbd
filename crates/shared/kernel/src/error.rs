use std::borrow::Cow;

/// Failures raised by the settings engine.
///
/// Declaration-time failures (`ReservedName`, `DuplicateName`) are reported by
/// [`ModelError::is_name_error`]; construction-time failures (`UnknownKey`, `MissingKey`,
/// `InvalidValue`, `Invalid`) by [`ModelError::is_validation_error`].
#[settle_derive::settle_error]
pub enum ModelError {
    /// The accessor collides with an identifier claimed by the DSL.
    #[error("Reserved name{}: `{name}` is reserved by the settings DSL", format_context(.context))]
    ReservedName { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The option key or accessor is already declared on the model.
    #[error("Duplicate name{}: `{name}` is already defined", format_context(.context))]
    DuplicateName { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The input carries a key no option declares.
    #[error("Unknown option{}: `{key}` is not declared by {model}", format_context(.context))]
    UnknownKey {
        model: Cow<'static, str>,
        key: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A required option is absent from the input.
    #[error("Missing option{}: `{key}` is required by {model}", format_context(.context))]
    MissingKey {
        model: Cow<'static, str>,
        key: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// The option's coercion rejected the supplied (or default) value.
    #[error("Invalid option{}: `{key}` {message}", format_context(.context))]
    InvalidValue {
        key: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// Validators reported violations.
    #[error("Invalid {model}{}: {}", format_context(.context), .messages.join("; "))]
    Invalid {
        model: Cow<'static, str>,
        codes: Vec<Cow<'static, str>>,
        messages: Vec<String>,
        context: Option<Cow<'static, str>>,
    },

    /// Read of a name that is neither an option nor a memo.
    #[error("Unknown attribute{}: `{name}`", format_context(.context))]
    UnknownAttribute { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A memo was read again while it was still being computed.
    #[error("Cyclic memo{}: `{name}` depends on itself", format_context(.context))]
    MemoCycle { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A value could not be converted to the requested type.
    #[error("Decode error{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal model error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ModelError {
    /// Declaration-time failure (reserved or duplicate name).
    #[must_use]
    pub const fn is_name_error(&self) -> bool {
        matches!(self, Self::ReservedName { .. } | Self::DuplicateName { .. })
    }

    /// Construction-time failure (input or validator violations).
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey { .. }
                | Self::MissingKey { .. }
                | Self::InvalidValue { .. }
                | Self::Invalid { .. }
        )
    }

    /// Violation codes reported by validators, empty for every other failure.
    #[must_use]
    pub fn codes(&self) -> &[Cow<'static, str>] {
        match self {
            Self::Invalid { codes, .. } => codes,
            _ => &[],
        }
    }

    pub(crate) fn reserved(name: &str) -> Self {
        Self::ReservedName { name: name.to_owned().into(), context: None }
    }

    pub(crate) fn duplicate(name: &str) -> Self {
        Self::DuplicateName { name: name.to_owned().into(), context: None }
    }
}
