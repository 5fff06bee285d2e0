//! Tests for try/catch and throw

use readlisp::{Error, Evaluator, Expr};

fn eval_lisp(source: &str) -> Result<Expr, Error> {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str(source)
}

#[test]
fn test_catch_thrown_string() {
    let result = eval_lisp(r#"(try (throw "boom") (catch e e))"#).unwrap();
    assert_eq!(result, Expr::string("boom"));
}

#[test]
fn test_throw_without_catch_propagates() {
    let result = eval_lisp(r#"(try (throw "boom"))"#);
    assert_eq!(result, Err(Error::Thrown("boom".to_string())));
}

#[test]
fn test_try_without_failure_returns_body_value() {
    let result = eval_lisp("(try (+ 1 2) (catch e :failed))").unwrap();
    assert_eq!(result, Expr::Int(3));
}

#[test]
fn test_catch_binds_printed_form_of_non_strings() {
    let result = eval_lisp("(try (throw [1 :a]) (catch e e))").unwrap();
    assert_eq!(result, Expr::string("[1 :a]"));
}

#[test]
fn test_catch_runtime_errors() {
    let result = eval_lisp("(try (/ 1 0) (catch e e))").unwrap();
    assert_eq!(result, Expr::string("Division by zero"));

    let result = eval_lisp("(try (nth [1 2] 9) (catch e :caught))").unwrap();
    assert_eq!(result, Expr::keyword("caught"));
}

#[test]
fn test_catch_unbound_symbol() {
    let result = eval_lisp("(try missing (catch e e))").unwrap();
    assert_eq!(result, Expr::string("Unbound symbol: missing"));
}

#[test]
fn test_catch_body_has_several_forms() {
    let result = eval_lisp(r#"(try (throw "x") (catch e (def seen e) (str "got " seen)))"#)
        .unwrap();
    assert_eq!(result, Expr::string("got x"));
}

#[test]
fn test_catch_binding_is_local() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str(r#"(try (throw "x") (catch err err))"#)
        .unwrap();
    assert!(matches!(
        evaluator.eval_str("err"),
        Err(Error::UnboundSymbol { .. })
    ));
}

#[test]
fn test_first_catch_clause_wins() {
    let result = eval_lisp(r#"(try (throw "x") (catch a :first) (catch b :second))"#).unwrap();
    assert_eq!(result, Expr::keyword("first"));
}

#[test]
fn test_nested_try_rethrow() {
    let source = r#"
(try
  (try (throw "inner") (catch e (throw (str e "+outer"))))
  (catch e e))
"#;
    assert_eq!(eval_lisp(source).unwrap(), Expr::string("inner+outer"));
}

#[test]
fn test_throw_from_function() {
    let source = r#"
(def safe-div (fn* [a b] (if (= b 0) (throw "div by zero") (/ a b))))
(try (safe-div 1 0) (catch e e))
"#;
    assert_eq!(eval_lisp(source).unwrap(), Expr::string("div by zero"));
}

#[test]
fn test_catch_outside_try_is_malformed() {
    assert!(matches!(
        eval_lisp("(catch e e)"),
        Err(Error::MalformedSpecialForm { .. })
    ));
}

#[test]
fn test_catch_requires_symbol() {
    assert!(matches!(
        eval_lisp("(try 1 (catch 2 3))"),
        Err(Error::MalformedSpecialForm { .. })
    ));
}

#[test]
fn test_environment_kept_after_failure() {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str("(def kept 1)").unwrap();
    assert!(evaluator.eval_str(r#"(throw "top level")"#).is_err());
    assert_eq!(evaluator.eval_str("kept").unwrap(), Expr::Int(1));
}
