use serde_json::json;
use settle_kernel::prelude::*;

fn other() -> Model {
    let mut other = Model::new("Test.other");
    other
        .option(OptionDef::new("first_name").optional())
        .unwrap()
        .option(OptionDef::new("last_name").optional())
        .unwrap()
        .memo("name", |s| {
            let mut parts = Vec::new();
            for key in ["first_name", "last_name"] {
                if let Some(part) = s.get_as::<Option<String>>(key)? {
                    parts.push(part);
                }
            }
            Ok(json!(parts.join(" ")))
        })
        .unwrap()
        .validate(|s, errors| {
            if s.get_as::<String>("name")?.is_empty() {
                errors.add("empty_name");
            }
            Ok(())
        });
    other
}

fn model() -> Model {
    let mut model = Model::new("Test.model");
    model.extend(&other()).unwrap().option(OptionDef::new("email").optional()).unwrap();
    model
}

#[test]
fn behaves_like_a_model() {
    let input = Input::new()
        .with("first_name", "Joe")
        .with("last_name", "Doe")
        .with("email", "joe@example.com");
    let settings = model().build(input).unwrap();

    assert_eq!(settings.model(), "Test.model");
    assert_eq!(settings.get("email").unwrap(), json!("joe@example.com"));
}

#[test]
fn injects_options_and_memos() {
    let input = Input::new().with("first_name", "Joe").with("last_name", "Doe");
    let settings = model().build(input).unwrap();

    assert_eq!(settings.get("first_name").unwrap(), json!("Joe"));
    assert_eq!(settings.get("last_name").unwrap(), json!("Doe"));
    assert_eq!(settings.get("name").unwrap(), json!("Joe Doe"));
}

#[test]
fn injects_validators() {
    let err = model().build(Input::new().with("email", "joe@example.com")).unwrap_err();

    assert!(err.is_validation_error());
    assert!(err.to_string().contains("name"), "{err}");
}

#[test]
fn merged_order_follows_the_source() {
    let shape = model().shape();
    let keys: Vec<_> = shape.options.iter().map(|o| o.key.as_str()).collect();

    assert_eq!(keys, vec!["first_name", "last_name", "email"]);
    assert_eq!(shape.memos, vec!["name"]);
    assert_eq!(shape.validators, 1);
}

#[test]
fn collisions_fail_without_partial_merge() {
    let mut target = Model::new("Test.target");
    target.option(OptionDef::new("last_name").optional()).unwrap();
    let before = target.shape();

    let err = target.extend(&other()).unwrap_err();
    assert!(err.is_name_error());
    assert_eq!(target.shape(), before);

    let mut reversed = other();
    let err = reversed.extend(&model()).unwrap_err();
    assert!(err.is_name_error());
}

#[test]
fn extending_twice_is_rejected() {
    let other = other();
    let mut model = Model::new("Test.model");
    model.extend(&other).unwrap();

    let err = model.extend(&other).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateName { ref name, .. } if name == "Test.other"));

    let mut nested = Model::new("Test.nested");
    nested.extend(&model).unwrap();
    assert!(nested.extend(&other).unwrap_err().is_name_error());
}

#[test]
fn distinct_models_may_share_a_name() {
    let mut first = Model::new("Test.mixin");
    first.option(OptionDef::new("x").optional()).unwrap();
    let mut second = Model::new("Test.mixin");
    second.option(OptionDef::new("y").optional()).unwrap();

    let mut target = Model::new("Test.target");
    target.extend(&first).unwrap().extend(&second).unwrap();

    let settings = target.build(Input::new().with("x", 1).with("y", 2)).unwrap();
    assert_eq!(settings.get("x").unwrap(), json!(1));
    assert_eq!(settings.get("y").unwrap(), json!(2));
    assert!(target.extend(&second).unwrap_err().is_name_error());
}

#[test]
fn derived_models_are_distinct_from_their_parent() {
    let base = other();
    let child = base.derive("Test.child");

    let mut target = Model::new("Test.target");
    target.extend(&base).unwrap();
    let err = target.extend(&child).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateName { ref name, .. } if name == "first_name"));
}

#[test]
fn source_is_not_linked_after_extend() {
    let mut source = other();
    let mut model = Model::new("Test.model");
    model.extend(&source).unwrap();

    source.option(OptionDef::new("nickname").optional()).unwrap();
    assert!(model.shape().options.iter().all(|o| o.key != "nickname"));
}
