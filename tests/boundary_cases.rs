//! Boundary cases: everything here is expected to fail, either at parse
//! time or evaluation time.

use test_utils::{assert_errors, assert_parse_errors};

#[test]
fn out_of_range_array_index_is_an_error() {
    assert_errors("let arr = [1, 2, 3]; arr[3]");
}

#[test]
fn hash_index_with_a_function_key_is_an_error() {
    assert_errors(r#"let h = {"a": 1}; h[fn(x){x}]"#);
}

#[test]
fn let_redeclaration_in_the_same_scope_is_an_error() {
    assert_errors("let a = 1; let a = 2;");
}

#[test]
fn let_redeclaration_within_the_same_function_body_is_an_error() {
    assert_errors("let f = fn() { let x = 1; let x = 2; x }; f();");
}

#[test]
fn let_in_an_if_branch_may_shadow_an_outer_binding() {
    // The if/else branch gets its own fresh child environment, so this is
    // shadowing, not redeclaration, and does not error.
    use test_utils::assert_evaluates_to;
    assert_evaluates_to("let a = 1; if (true) { let a = 2; a }", "2");
}

#[test]
fn prefix_increment_on_boolean_is_an_error() {
    assert_errors("++true");
}

#[test]
fn division_by_zero_is_an_error() {
    assert_errors("10 / 0");
}

#[test]
fn modulo_by_zero_is_an_error() {
    assert_errors("10 % 0");
}

#[test]
fn unterminated_string_literal_fails_to_parse() {
    assert_parse_errors("\"unterminated");
}

#[test]
fn mixed_type_infix_is_an_error() {
    assert_errors(r#"1 + "x""#);
}

#[test]
fn calling_an_undeclared_function_is_an_error() {
    assert_errors("undeclared_fn(1, 2)");
}

#[test]
fn arity_mismatch_on_a_user_function_is_an_error() {
    assert_errors("let f = fn(x, y) { x + y }; f(1);");
}
