// tests/cli_tests.rs
//
// The binary is a thin wrapper over these functions, so they are tested
// directly.

use mace_lang::cli::{
    CliError, EvalOptions, execute_check, execute_eval, execute_filter, execute_message,
    execute_paragraphs, execute_type, json_to_value, parse_vars,
};
use mace_lang::output::to_json;
use mace_lang::{Grammar, ObjectMap, Value};

fn eval_options(expression: &str) -> EvalOptions {
    EvalOptions {
        expression: expression.to_string(),
        ..EvalOptions::default()
    }
}

// ============================================================================
// check / eval
// ============================================================================

#[test]
fn test_check() {
    assert!(execute_check("1 + 2 * x", Grammar::Extended).is_ok());
    assert!(matches!(
        execute_check("1 +", Grammar::Extended),
        Err(CliError::Parse(_))
    ));
    assert!(execute_check("2 ** 3", Grammar::Extended).is_ok());
    assert!(execute_check("2 ** 3", Grammar::Basic).is_err());
}

#[test]
fn test_eval() {
    let report = execute_eval(&eval_options("[1, 2][1] * 10")).unwrap();
    assert_eq!(report.value, Value::Number(20.0));
    assert_eq!(report.identifiers, None);
    assert_eq!(report.into_value(), Value::Number(20.0));
}

#[test]
fn test_eval_with_vars() {
    let options = EvalOptions {
        vars: Some(r#"{"user": {"name": "Ada", "age": 36}}"#.to_string()),
        ..eval_options("user.name + ' ' + (user.age + 1)")
    };
    assert_eq!(execute_eval(&options).unwrap().value, Value::from("Ada 37"));
}

#[test]
fn test_eval_tracking() {
    let options = EvalOptions {
        vars: Some(r#"{"known": 1}"#.to_string()),
        track: true,
        ..eval_options("[known, first, second][0]")
    };
    let report = execute_eval(&options).unwrap();
    assert_eq!(
        report.identifiers,
        Some(vec!["first".to_string(), "second".to_string()])
    );
    assert_eq!(
        to_json(&report.into_value()),
        r#"{"value":1,"identifiers":["first","second"]}"#
    );
}

#[test]
fn test_eval_errors() {
    assert!(matches!(
        execute_eval(&eval_options("(1")),
        Err(CliError::Parse(_))
    ));
    assert!(matches!(
        execute_eval(&eval_options("x.y.z")),
        Err(CliError::Eval(_))
    ));
}

// ============================================================================
// --vars
// ============================================================================

#[test]
fn test_vars_must_be_an_object() {
    match parse_vars(Some("[1, 2]")) {
        Err(CliError::Vars(found)) => assert_eq!(found, "array"),
        other => panic!("expected a vars error, got {:?}", other.map(|_| ())),
    }
    assert!(matches!(parse_vars(Some("{")), Err(CliError::Json(_))));
    assert!(parse_vars(None).is_ok());
}

#[test]
fn test_json_numbers_become_doubles() {
    let value = json_to_value(serde_json::json!({"n": 3, "list": [1.5, null, true]}));
    let mut expected = ObjectMap::new();
    expected.insert("n".to_string(), Value::Number(3.0));
    expected.insert(
        "list".to_string(),
        Value::Array(vec![Value::Number(1.5), Value::Null, Value::Boolean(true)]),
    );
    assert_eq!(value, Value::Object(expected));
}

// ============================================================================
// Layers
// ============================================================================

#[test]
fn test_type_command() {
    let value = execute_type("List<String>{min: limit}", Some(r#"{"limit": 2}"#)).unwrap();
    assert_eq!(
        to_json(&value),
        r#"[{"name":"List","config":{"min":2},"fullname":"List<String>{min: limit}","template":[[{"name":"String","config":{},"fullname":"String","template":[]}]]}]"#
    );
}

#[test]
fn test_message_command() {
    let value = execute_message(
        "Jonathan : Bonjour {{ name }}\nVincent : 'Salut'",
        Some(r#"{"name": "Vincent"}"#),
    )
    .unwrap();
    assert_eq!(
        to_json(&value),
        r#"[{"speaker":"Jonathan","content":"Bonjour Vincent"},{"speaker":"Vincent","content":"Salut"}]"#
    );
}

#[test]
fn test_filter_command() {
    assert_eq!(
        execute_filter(r#"AND(name = "Vincent", NOT(age > 32))"#).unwrap(),
        Value::from("and=(name.eq.Vincent,age.not.gt.32)")
    );
    assert!(matches!(execute_filter("age"), Err(CliError::Parse(_))));
}

#[test]
fn test_paragraphs_command() {
    assert_eq!(
        to_json(&execute_paragraphs("Hello\n\nWorld").unwrap()),
        r#"[{"type":"p","children":[{"text":"Hello"}]},{"type":"p","children":[{"text":""}]},{"type":"p","children":[{"text":"World"}]}]"#
    );
}
