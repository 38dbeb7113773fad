#[test]
fn trellis_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/pass.rs");
    t.compile_fail("tests/ui/missing_context.rs");
    t.compile_fail("tests/ui/tuple_variant.rs");
}
