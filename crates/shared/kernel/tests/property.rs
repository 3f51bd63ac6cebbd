use proptest::prelude::*;
use serde_json::json;
use settle_kernel::prelude::*;

fn model() -> Model {
    let mut model = Model::new("Test.property");
    model
        .option(OptionDef::new("id").coerce(Kinds::INTEGER))
        .unwrap()
        .option(OptionDef::new("label").optional().coerce(Kinds::STRING | Kinds::NULL))
        .unwrap()
        .memo("square_id", |s| Ok(json!(s.get_as::<i64>("id")?.pow(2))))
        .unwrap()
        .validate(|s, errors| {
            if s.get_as::<i64>("id")? < 0 {
                errors.add("id_positive");
            }
            Ok(())
        });
    model
}

proptest! {
    #[test]
    fn building_never_changes_declarations(id in -1000i64..1000, label in proptest::option::of("[a-z]{0,8}")) {
        let model = model();
        let before = model.shape();

        let mut input = Input::new().with("id", id);
        if let Some(label) = &label {
            input.insert("label", label.clone());
        }

        match model.build(input) {
            Ok(settings) => {
                prop_assert!(id >= 0);
                prop_assert_eq!(settings.get("square_id").unwrap(), json!(id * id));
                prop_assert_eq!(settings.option("label").cloned().unwrap(), label.map_or(Value::Null, Value::from));
            },
            Err(err) => {
                prop_assert!(id < 0);
                prop_assert_eq!(err.codes(), ["id_positive"]);
            },
        }

        prop_assert_eq!(model.shape(), before);
    }

    #[test]
    fn unknown_keys_are_always_rejected(key in "[a-z]{3,10}") {
        prop_assume!(key != "id" && key != "label");
        let err = model().build(Input::new().with("id", 1).with(key.clone(), true)).unwrap_err();

        let is_unknown = matches!(&err, ModelError::UnknownKey { key: k, .. } if *k == key);
        prop_assert!(is_unknown, "{}", err);
    }
}
