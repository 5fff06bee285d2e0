//! Tests for constant-stack evaluation of tail positions

use readlisp::{Evaluator, Expr};

const ITERATIONS: i64 = 1_000_000;

#[test]
fn test_self_tail_recursion_million() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str("(def count-up (fn* [n acc] (if (= n 0) acc (count-up (- n 1) (+ acc 1)))))")
        .unwrap();
    let result = evaluator
        .eval_str(&format!("(count-up {} 0)", ITERATIONS))
        .unwrap();
    assert_eq!(result, Expr::Int(ITERATIONS));
}

#[test]
fn test_mutual_tail_recursion() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str(
            r#"
(def even? (fn* [n] (if (= n 0) true (odd? (- n 1)))))
(def odd? (fn* [n] (if (= n 0) false (even? (- n 1)))))
"#,
        )
        .unwrap();
    assert_eq!(evaluator.eval_str("(even? 100001)").unwrap(), Expr::False);
    assert_eq!(evaluator.eval_str("(odd? 100001)").unwrap(), Expr::True);
}

#[test]
fn test_tail_through_let_star_and_do() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str(
            r#"
(def walk (fn* [n]
  (let* [m (- n 1)]
    (do :step
      (if (< m 0) :bottom (walk m))))))
"#,
        )
        .unwrap();
    assert_eq!(
        evaluator.eval_str("(walk 200000)").unwrap(),
        Expr::keyword("bottom")
    );
}

#[test]
fn test_tail_through_try_handler() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str(
            r#"
(def retry (fn* [n]
  (try (if (= n 0) :ok (throw "again"))
       (catch e (retry (- n 1))))))
"#,
        )
        .unwrap();
    assert_eq!(
        evaluator.eval_str("(retry 100000)").unwrap(),
        Expr::keyword("ok")
    );
}

#[test]
fn test_scope_count_stays_flat() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str("(def spin (fn* [n] (let* [k n] (if (= k 0) :done (spin (- k 1))))))")
        .unwrap();
    let before = evaluator.environment().scope_count();
    assert_eq!(
        evaluator.eval_str("(spin 100000)").unwrap(),
        Expr::keyword("done")
    );
    assert_eq!(evaluator.environment().scope_count(), before);
}

#[test]
fn test_closures_created_in_loop_survive() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str(
            r#"
(def collect (fn* [n acc]
  (if (= n 0) acc (collect (- n 1) (cons (fn* [] n) acc)))))
(def thunks (collect 3 (list)))
"#,
        )
        .unwrap();
    assert_eq!(
        evaluator
            .eval_str("(list ((first thunks)) ((nth thunks 2)))")
            .unwrap(),
        Expr::seq(vec![Expr::Int(1), Expr::Int(3)])
    );
}
