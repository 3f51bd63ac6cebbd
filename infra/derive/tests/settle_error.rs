#[test]
fn settle_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/settle_error_pass.rs");
    t.pass("tests/ui/settle_error_variant_names.rs");
}
