#[test]
fn macro_tests() {
    let test_cases = trybuild::TestCases::new();
    test_cases.pass("tests/trybuild/01-plain.rs");
    test_cases.pass("tests/trybuild/02-from-nom.rs");
    test_cases.pass("tests/trybuild/03-from-located.rs");
    test_cases.pass("tests/trybuild/04-from-located-module.rs");
    test_cases.pass("tests/trybuild/05-from-external.rs");
    test_cases.pass("tests/trybuild/06-writing-from.rs");
}
