use std::borrow::Cow;

#[settle_derive::settle_error]
pub enum LookupError {
    #[error("Missing key{}: {key}", format_context(.context))]
    Missing { key: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Cycle detected at {name}")]
    Cycle { name: String },
}

fn main() {
    let missing = LookupError::Missing { key: "user".into(), context: None };
    assert_eq!(missing.variant(), "Missing");

    let failed: Result<(), LookupError> = Err(missing);
    let err = failed.context("while building").unwrap_err();
    assert_eq!(err.to_string(), "Missing key (while building): user");

    let cycle = LookupError::Cycle { name: "a".to_owned() };
    assert_eq!(cycle.variant(), "Cycle");
}
