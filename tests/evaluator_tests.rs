//! End-to-end evaluation tests: special forms together with the primitive library

use num_bigint::BigInt;
use readlisp::{pr_str, Error, Evaluator, Expr, InterpreterConfig};

fn eval_lisp(source: &str) -> Result<Expr, Error> {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str(source)
}

fn printed(source: &str) -> String {
    pr_str(&eval_lisp(source).unwrap(), true)
}

// ====================
// Arithmetic and comparison
// ====================

#[test]
fn test_arithmetic_promotion() {
    assert_eq!(eval_lisp("(+ 1 2 3)").unwrap(), Expr::Int(6));
    assert_eq!(eval_lisp("(+ 1 2.5)").unwrap(), Expr::Float(3.5));
    assert_eq!(
        eval_lisp("(* 2 10n)").unwrap(),
        Expr::BigInt(BigInt::from(20))
    );
    assert_eq!(eval_lisp("(- 5)").unwrap(), Expr::Int(-5));
    assert_eq!(eval_lisp("(/ 7 2)").unwrap(), Expr::Int(3));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval_lisp("(/ 1 0)"), Err(Error::DivisionByZero));
}

#[test]
fn test_comparisons() {
    assert_eq!(eval_lisp("(< 1 2 3)").unwrap(), Expr::True);
    assert_eq!(eval_lisp("(>= 3 3 4)").unwrap(), Expr::False);
    assert_eq!(eval_lisp("(= [1 2] [1 2])").unwrap(), Expr::True);
    assert_eq!(eval_lisp("(= '(1 2) [1 2])").unwrap(), Expr::False);
    assert!(matches!(
        eval_lisp("(< 1 2.0)"),
        Err(Error::TypeError { .. })
    ));
}

// ====================
// Functions
// ====================

#[test]
fn test_closures_capture_environment() {
    let source = r#"
(def make-counter (fn* [start]
  (let* [m (hash-map :n start)]
    (fn* [] (assoc! m :n (+ (get m :n) 1)) (get m :n)))))
(def c (make-counter 10))
(c)
(c)
"#;
    assert_eq!(eval_lisp(source).unwrap(), Expr::Int(12));
}

#[test]
fn test_higher_order() {
    let source = r#"
(def map-list (fn* [f xs]
  (if (empty? xs) (list) (cons (f (first xs)) (map-list f (rest xs))))))
(map-list (fn* [x] (* x x)) [1 2 3])
"#;
    assert_eq!(printed(source), "(1 4 9)");
}

#[test]
fn test_fn_body_wrapped_in_do() {
    assert_eq!(
        eval_lisp("((fn* [x] (def y x) (+ y 1)) 4)").unwrap(),
        Expr::Int(5)
    );
}

#[test]
fn test_fn_printing() {
    assert_eq!(printed("(fn* sq [x] (* x x))"), "#<fn sq [x]>");
    assert_eq!(printed("+"), "#<native +>");
}

#[test]
fn test_native_arity_errors_pass_through() {
    assert!(matches!(
        eval_lisp("(first)"),
        Err(Error::InvalidArguments { .. })
    ));
}

// ====================
// Collections
// ====================

#[test]
fn test_sequence_primitives() {
    assert_eq!(printed("(cons 0 [1 2])"), "(0 1 2)");
    assert_eq!(printed("(concat '(1) [2] nil '())"), "(1 2)");
    assert_eq!(printed("(seq \"abc\")"), "(\"a\" \"b\" \"c\")");
    assert_eq!(printed("(seq [])"), "nil");
    assert_eq!(printed("(rest nil)"), "()");
    assert_eq!(printed("(last [1 2 3])"), "3");
    assert_eq!(printed("(count {:a 1 :b 2})"), "2");
    assert_eq!(printed("(vec '(1 2))"), "[1 2]");
}

#[test]
fn test_map_primitives() {
    assert_eq!(printed("(get {:a 1} :a)"), "1");
    assert_eq!(printed("(get {:a 1} :b :none)"), ":none");
    assert_eq!(printed("(keys (assoc {} :x 1))"), "(:x)");
    assert_eq!(printed("(contains? (dissoc {:a 1} :a) :a)"), "false");
}

#[test]
fn test_map_literal_is_immutable() {
    assert_eq!(
        eval_lisp("(assoc! {:a 1} :b 2)"),
        Err(Error::ImmutableMutation)
    );
}

#[test]
fn test_strings_and_printing() {
    assert_eq!(printed("(str \"a\" 1 :k nil \\c)"), "\"a1:kc\"");
    assert_eq!(printed("(pr-str \"a\" \\c 5n)"), "\"\\\"a\\\" \\\\c 5n\"");
}

#[test]
fn test_read_string_round_trip() {
    assert_eq!(
        eval_lisp("(read-string (pr-str '(a \"b\" [1 2.5] {:k 3n})))").unwrap(),
        eval_lisp("'(a \"b\" [1 2.5] {:k 3n})").unwrap()
    );
}

#[test]
fn test_eval_of_read_string() {
    let mut evaluator = Evaluator::new();
    let form = evaluator.eval_str("(read-string \"(+ 40 2)\")").unwrap();
    assert_eq!(evaluator.eval(&form).unwrap(), Expr::Int(42));
}

#[test]
fn test_slurp_reads_file() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("readlisp-slurp-{}.lisp", std::process::id()));
    std::fs::write(&path, "(+ 1 2)").unwrap();
    let source = format!("(slurp \"{}\")", path.display().to_string().replace('\\', "\\\\"));
    assert_eq!(eval_lisp(&source).unwrap(), Expr::string("(+ 1 2)"));
    std::fs::remove_file(path).unwrap();
}

// ====================
// Evaluator API
// ====================

#[test]
fn test_define_and_lookup() {
    let mut evaluator = Evaluator::new();
    evaluator.define("answer", Expr::Int(42));
    assert_eq!(evaluator.eval_str("(+ answer 0)").unwrap(), Expr::Int(42));
    assert_eq!(evaluator.lookup("answer"), Some(Expr::Int(42)));
    assert!(evaluator.lookup("+").is_some());
}

#[test]
fn test_eval_str_returns_last_value() {
    assert_eq!(eval_lisp("1 2 3").unwrap(), Expr::Int(3));
    assert_eq!(eval_lisp("").unwrap(), Expr::Nil);
    assert_eq!(eval_lisp("; nothing here").unwrap(), Expr::Nil);
}

#[test]
fn test_read_errors_surface_from_eval_str() {
    assert!(matches!(
        eval_lisp("(+ 1"),
        Err(Error::MismatchedDelimiter { .. })
    ));
}

#[test]
fn test_prefer_floats_config() {
    let config = InterpreterConfig::from_json(r#"{"reader": {"prefer_floats": true}}"#).unwrap();
    let mut evaluator = Evaluator::with_config(config);
    assert_eq!(evaluator.eval_str("(+ 1 2)").unwrap(), Expr::Float(3.0));
}
