//! Session tests: statement-at-a-time evaluation and rollback.

use pretty_assertions::assert_eq;
use zyra_eval::{evaluate, Completion, ErrorKind, EvalConfig, EvalError, Session, Value};
use zyra_types::ast::{BinOp, StructMember};
use zyra_types::build::*;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn value_of(completion: Completion) -> Value {
    completion.into_value()
}

// ══════════════════════════════════════════════════════════════════════════════
// Incremental evaluation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_state_persists_between_statements() {
    let mut session = Session::new();
    session.eval_statement(&dec("x", int(40))).unwrap();
    session
        .eval_statement(&expr_stmt(compound(var("x"), BinOp::Add, int(2))))
        .unwrap();
    let result = session
        .eval_statement(&expr_stmt(binary(var("x"), BinOp::Mul, int(1))))
        .unwrap();
    assert_eq!(value_of(result), Value::from(42));
    assert!(session.global_names().contains(&"x".to_string()));
}

#[test]
fn test_failed_statement_rolls_back_globals() {
    let mut session = Session::new();
    session.eval_statement(&dec("x", int(1))).unwrap();

    let err = session
        .eval_statement(&block_stmt(vec![
            expr_stmt(assign(var("x"), int(5))),
            throw(string("boom")),
        ]))
        .unwrap_err();
    assert!(matches!(err, EvalError::UserThrown(_)));
    assert_eq!(session.get_global("x"), Some(Value::from(1)));

    // a failed declaration leaves no binding behind
    session
        .eval_statement(&dec("y", binary(int(1), BinOp::Div, int(0))))
        .unwrap_err();
    assert_eq!(session.get_global("y"), None);
    session.eval_statement(&dec("y", int(2))).unwrap();
}

#[test]
fn test_failed_statement_rolls_back_registry() {
    let mut session = Session::new();
    let err = session
        .eval_statement(&block_stmt(vec![
            union_decl("Temp", vec![field("a", "int32", None)]),
            throw(string("boom")),
        ]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserThrown);
    assert!(!session.evaluator_mut().registry.contains("Temp"));

    session
        .eval_statement(&union_decl("Temp", vec![field("a", "int32", None)]))
        .unwrap();
    assert!(session.evaluator_mut().registry.contains("Temp"));
}

#[test]
fn test_output_survives_rollback() {
    let mut session = Session::new();
    session
        .eval_statement(&block_stmt(vec![
            expr_stmt(call_named("print", vec![string("before")])),
            throw(int(1)),
        ]))
        .unwrap_err();
    assert_eq!(session.take_output(), "before\n");
    assert_eq!(session.output().as_str(), "");
}

// ══════════════════════════════════════════════════════════════════════════════
// Whole programs
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_top_level_return_ends_program() {
    let mut session = Session::new();
    let result = session
        .evaluate(&program(vec![
            dec("x", int(1)),
            ret(binary(var("x"), BinOp::Add, int(1))),
            expr_stmt(call_named("print", vec![string("unreachable")])),
        ]))
        .unwrap();
    assert_eq!(result, Value::from(2));
    assert_eq!(session.output().as_str(), "");
}

#[test]
fn test_program_value_is_last_statement() {
    let result = evaluate(&program(vec![
        dec("s", string("ab")),
        expr_stmt(binary(var("s"), BinOp::Add, int(3))),
    ]))
    .unwrap();
    assert_eq!(result, Value::from("ab3"));
}

#[test]
fn test_types_declared_in_blocks_are_global() {
    let result = evaluate(&program(vec![
        block_stmt(vec![struct_decl(
            "P",
            vec![StructMember::Field(field("x", "int64", Some(int(3))))],
            vec![],
        )]),
        expr_stmt(member(struct_lit("P", vec![]), "x")),
    ]))
    .unwrap();
    assert_eq!(result, Value::from(3));
}

#[test]
fn test_struct_default_sees_declaration_scope() {
    let result = evaluate(&program(vec![
        dec("base", int(10)),
        struct_decl(
            "Cfg",
            vec![StructMember::Field(field(
                "limit",
                "",
                Some(binary(var("base"), BinOp::Mul, int(2))),
            ))],
            vec![],
        ),
        expr_stmt(member(struct_lit("Cfg", vec![]), "limit")),
    ]))
    .unwrap();
    assert_eq!(result, Value::from(20));
}

#[test]
fn test_error_report_json() {
    let err = evaluate(&program(vec![throw(string("bad input"))])).unwrap_err();
    let report = err.report();
    assert_eq!(report.kind, ErrorKind::UserThrown);
    assert_eq!(report.payload.as_deref(), Some("bad input"));
    let json = report.to_json().unwrap();
    assert!(json.contains("\"UserThrown\""), "{json}");
}

#[test]
fn test_config_from_json() {
    let config = EvalConfig::from_json(r#"{"gas_limit": 50}"#).unwrap();
    let mut session = Session::with_config(config);
    let err = session
        .eval_statement(&while_(boolean(true), vec![]))
        .unwrap_err();
    assert!(matches!(err, EvalError::GasExhausted(50)));
}
