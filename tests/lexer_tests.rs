// tests/lexer_tests.rs

use mace_lang::ast::Token;
use mace_lang::lexer::{Grammar, LexError, Lexer};
use proptest::prelude::*;

fn tokens(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input)
        .map(|spanned| spanned.map(|s| s.token))
        .collect()
}

fn single_number(input: &str) -> Result<f64, LexError> {
    let mut lexer = Lexer::new(input);
    match lexer.next_token()? {
        Token::Number(n) => {
            assert_eq!(lexer.next_token()?, Token::Eof, "trailing tokens in {}", input);
            Ok(n)
        }
        other => panic!("expected a number for {}, got {:?}", input, other),
    }
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("&", Token::Ampersand),
        ("?", Token::Question),
        ("~", Token::Tilde),
        ("!", Token::Bang),
        ("|", Token::Pipe),
        ("^", Token::Caret),
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("%", Token::Percent),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        (".", Token::Dot),
        (",", Token::Comma),
        (":", Token::Colon),
        ("<", Token::Lt),
        (">", Token::Gt),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

// ============================================================================
// Multi Character Tokens
// ============================================================================

#[test]
fn test_multi_char_tokens() {
    let test_cases = vec![
        ("==", Token::EqEq),
        ("!=", Token::NotEq),
        ("===", Token::EqEqEq),
        ("!==", Token::NotEqEq),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("<<", Token::Shl),
        (">>", Token::Shr),
        (">>>", Token::UShr),
        ("&&", Token::AmpAmp),
        ("||", Token::PipePipe),
        ("**", Token::StarStar),
        ("?:", Token::Elvis),
        ("++", Token::Increment),
        ("--", Token::Decrement),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_spaced_elvis_is_two_tokens() {
    assert_eq!(
        tokens("? :").unwrap(),
        vec![Token::Question, Token::Colon, Token::Eof]
    );
}

#[test]
fn test_maximal_munch() {
    assert_eq!(
        tokens(">>>>").unwrap(),
        vec![Token::UShr, Token::Gt, Token::Eof]
    );
    assert_eq!(
        tokens("***").unwrap(),
        vec![Token::StarStar, Token::Star, Token::Eof]
    );
    assert_eq!(
        tokens("&&&").unwrap(),
        vec![Token::AmpAmp, Token::Ampersand, Token::Eof]
    );
}

#[test]
fn test_single_equals_only_in_filters() {
    assert!(matches!(
        tokens("a = 1"),
        Err(LexError::UnexpectedCharacter { character: '=', .. })
    ));

    let mut lexer = Lexer::with_grammar("a = 1", Grammar::Filter);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("a".into()));
    assert_eq!(lexer.next_token().unwrap(), Token::Assign);
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    let test_cases = vec![
        ("0", 0.0),
        ("42", 42.0),
        ("3.25", 3.25),
        (".5", 0.5),
        ("1.", 1.0),
        ("12e3", 12000.0),
        ("12E+3", 12000.0),
        ("15e-1", 1.5),
        ("0x43", 67.0),
        ("0XfF", 255.0),
        ("0x123e10", 0x123e10 as f64),
        ("0b101", 5.0),
        ("0B11", 3.0),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single_number(input).unwrap(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_malformed_numbers() {
    for input in ["0b", "0b2", "0x", "1.3.4", "12e", "12e+", "0x23.5", "0b1e3", "9var", "12e0b1"] {
        assert!(
            matches!(tokens(input), Err(LexError::MalformedNumber { .. })),
            "expected malformed number for {}",
            input
        );
    }
}

#[test]
fn test_binary_literals_need_extended_grammar() {
    let mut lexer = Lexer::with_grammar("0b101", Grammar::Basic);
    assert!(matches!(lexer.next_token(), Err(LexError::MalformedNumber { .. })));
}

#[test]
fn test_strings() {
    let test_cases = vec![
        (r#""hello""#, "hello"),
        ("'hello'", "hello"),
        ("`hello`", "hello"),
        (r#""say \"hi\"""#, r#"say "hi""#),
        (r"'it\'s'", "it's"),
        (r"'back\\slash'", r"back\slash"),
        (r"'keep\n'", r"keep\n"),
        (r#"'mixed "quotes"'"#, r#"mixed "quotes""#),
        ("''", ""),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::String(expected.to_string()),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_unterminated_string() {
    let err = tokens("'open").unwrap_err();
    assert!(matches!(err, LexError::UnterminatedString { .. }));
    assert_eq!(err.position().column, 1);
}

#[test]
fn test_unexpected_character() {
    let err = tokens("1 # 2").unwrap_err();
    assert_eq!(
        err,
        LexError::UnexpectedCharacter {
            character: '#',
            position: err.position()
        }
    );
    assert_eq!(err.position().column, 3);
}

// ============================================================================
// Words
// ============================================================================

#[test]
fn test_identifiers() {
    assert_eq!(
        tokens("price $total _x café").unwrap(),
        vec![
            Token::Identifier("price".into()),
            Token::Identifier("$total".into()),
            Token::Identifier("_x".into()),
            Token::Identifier("café".into()),
            Token::Eof
        ]
    );
}

#[test]
fn test_not_prefix_splits_words() {
    assert_eq!(
        tokens("NOTNOTfalse").unwrap(),
        vec![Token::Not, Token::Not, Token::Boolean(false), Token::Eof]
    );
    assert_eq!(
        tokens("NOTtrue").unwrap(),
        vec![Token::Not, Token::Boolean(true), Token::Eof]
    );
}

#[test]
fn test_and_or_are_whole_words() {
    assert_eq!(
        tokens("ANDROID ORE OR").unwrap(),
        vec![
            Token::Identifier("ANDROID".into()),
            Token::Identifier("ORE".into()),
            Token::Or,
            Token::Eof
        ]
    );
}

#[test]
fn test_iterator_stops_after_eof() {
    let lexer = Lexer::new("1 + 2");
    assert_eq!(lexer.count(), 4);

    let items: Vec<_> = Lexer::new("1 # 2").collect();
    assert_eq!(items.len(), 2);
    assert!(items[1].is_err());
}

#[test]
fn test_spans() {
    let spans: Vec<_> = Lexer::new("ab + 12").map(Result::unwrap).collect();
    assert_eq!(spans[0].start.offset, 0);
    assert_eq!(spans[0].end.offset, 2);
    assert_eq!(spans[2].start.offset, 5);
    assert_eq!(spans[2].end.offset, 7);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn decimal_literals_match_float_parsing(
        int in "[0-9]{1,12}",
        frac in proptest::option::of("[0-9]{1,12}"),
        exp in proptest::option::of(-30i32..30),
    ) {
        let mut text = int.clone();
        if let Some(frac) = &frac {
            text.push('.');
            text.push_str(frac);
        }
        if let Some(exp) = exp {
            text.push_str(&format!("e{}", exp));
        }

        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(single_number(&text).unwrap(), expected);
    }

    #[test]
    fn hex_literals_match_integer_parsing(n in 0u64..(1u64 << 52)) {
        prop_assert_eq!(single_number(&format!("0x{:x}", n)).unwrap(), n as f64);
    }
}
