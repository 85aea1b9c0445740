use mace_lang::message::{Message, Segment, Template, parse_message, parse_messages, render_messages, render_messages_async};
use mace_lang::parser::ParseError;
use mace_lang::{Error, EvalContext, IdentifierSource, ResolveError, Value};

fn render(line: &str) -> Message {
    parse_message(line)
        .map(|template| template.render(&mut EvalContext::new()))
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", line, e))
        .unwrap_or_else(|e| panic!("failed to render {:?}: {}", line, e))
}

fn message(speaker: &str, content: &str) -> Message {
    Message {
        speaker: speaker.to_string(),
        content: content.to_string(),
    }
}

#[test]
fn test_quoted_content() {
    assert_eq!(render(r#"Jonathan : "Bonjour Vincent""#), message("Jonathan", "Bonjour Vincent"));
    assert_eq!(render("Jonathan : 'Bonjour Vincent'"), message("Jonathan", "Bonjour Vincent"));
    assert_eq!(render(r#"'Jonathan' : "Bonjour Vincent""#), message("Jonathan", "Bonjour Vincent"));
}

#[test]
fn test_expression_speaker() {
    assert_eq!(render("'Jon' + 'athan':'Bonjour Vincent'"), message("Jonathan", "Bonjour Vincent"));
    assert_eq!(render("'Agent ' + (3 + 4) : 'ok'"), message("Agent 7", "ok"));
}

#[test]
fn test_free_text_content() {
    assert_eq!(render("Jonathan : Bonjour Vincent"), message("Jonathan", "Bonjour Vincent"));
    assert_eq!(
        render("Jonathan : Bonjour Vincent, tu as {{ 32 + 1 }} pièces."),
        message("Jonathan", "Bonjour Vincent, tu as 33 pièces.")
    );
}

#[test]
fn test_free_text_speaker() {
    assert_eq!(render("Jonathan Doe : salut"), message("Jonathan Doe", "salut"));
    assert_eq!(render("{}{{2+2}} : {} {} {{2}} {}}}"), message("{}4", "{} {} 2 {}}}"));
}

#[test]
fn test_quoted_content_is_not_interpolated() {
    assert_eq!(render("Bot : '{{ 1 + 1 }}'"), message("Bot", "{{ 1 + 1 }}"));
}

#[test]
fn test_content_may_contain_colons_and_apostrophes() {
    assert_eq!(
        render("Jonathan : l'heure : {{ 10 + 2 }}h"),
        message("Jonathan", "l'heure : 12h")
    );
}

#[test]
fn test_interpolation_uses_the_context() {
    let template = parse_message("Narrator : {{ name }} a {{ Math_max(age, 18) }} ans").unwrap();
    let mut ctx = EvalContext::new().with_identifiers(IdentifierSource::from_map([
        ("name", Value::from("Vincent")),
        ("age", Value::Number(42.0)),
    ]));
    assert_eq!(
        template.render(&mut ctx).unwrap(),
        message("Narrator", "Vincent a 42 ans")
    );
}

#[test]
fn test_template_segments() {
    let template = Template::parse("a {{ b }} c").unwrap();
    assert_eq!(
        template.segments,
        vec![
            Segment::Text("a ".to_string()),
            Segment::Expr(mace_lang::Expr::Identifier("b".to_string())),
            Segment::Text(" c".to_string()),
        ]
    );
}

#[test]
fn test_malformed_messages() {
    for line in [":", "a:", ":a", "a::a", "no separator", "a : {{ 1 + }}", "a : {{ 1 } }"] {
        assert!(parse_message(line).is_err(), "expected an error for {:?}", line);
    }
}

#[test]
fn test_message_error_reasons() {
    let reason = |line: &str| match parse_message(line) {
        Err(ParseError::Message { reason, .. }) => reason,
        other => panic!("expected a message error for {:?}, got {:?}", line, other),
    };
    assert_eq!(reason(":"), "empty speaker");
    assert_eq!(reason("a:"), "empty content");
    assert_eq!(reason("a::a"), "doubled ':' separator");
}

#[test]
fn test_multiple_lines() {
    let text = "Jonathan : 'Bonjour'\n\nVincent : Salut {{ 1 + 1 }} fois\n";
    assert_eq!(parse_messages(text).unwrap().len(), 2);
    assert_eq!(
        render_messages(text, &mut EvalContext::new()).unwrap(),
        vec![message("Jonathan", "Bonjour"), message("Vincent", "Salut 2 fois")]
    );
}

#[test]
fn test_error_line_numbers() {
    let err = parse_messages("a : 'ok'\n\n:oops").unwrap_err();
    assert_eq!(err.position().line, 3);
}

#[test]
fn test_render_errors_propagate() {
    let mut ctx = EvalContext::new().with_identifiers(IdentifierSource::resolver(
        |_: &str| -> Result<Value, ResolveError> { Err(ResolveError::new("offline")) },
    ));
    assert!(matches!(
        render_messages("a : {{ weather }}", &mut ctx),
        Err(Error::Eval(_))
    ));
}

#[tokio::test]
async fn test_async_rendering() {
    let mut ctx = EvalContext::new().with_identifiers(IdentifierSource::async_resolver(
        |name: String| async move {
            tokio::task::yield_now().await;
            Ok::<Value, ResolveError>(Value::from(name.to_uppercase()))
        },
    ));
    assert_eq!(
        render_messages_async("guide : hello {{ world }}", &mut ctx).await.unwrap(),
        vec![message("guide", "hello WORLD")]
    );
}

#[test]
fn test_messages_serialize() {
    let json = serde_json::to_string(&message("a", "b")).unwrap();
    assert_eq!(json, r#"{"speaker":"a","content":"b"}"#);
}
