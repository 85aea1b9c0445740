use mace_lang::filter::{CompareOp, FullTextOp, parse_filter};
use mace_lang::{Filter, Value, to_postgrest};

fn query(source: &str) -> String {
    to_postgrest(source).unwrap_or_else(|e| panic!("failed to compile {}: {}", source, e))
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_comparisons() {
    let test_cases = [
        ("age = 32", "age=eq.32"),
        ("age == 32", "age=eq.32"),
        ("age != 32", "age=neq.32"),
        ("age < 32", "age=lt.32"),
        ("age > 32", "age=gt.32"),
        ("age <= 32", "age=lte.32"),
        ("age >= 32", "age=gte.32"),
        ("age > -1.5", "age=gt.-1.5"),
        (r#"name = "Vincent""#, "name=eq.Vincent"),
        ("name = 'Vincent'", "name=eq.Vincent"),
        (r#"name LIKE "Jo*""#, "name=like.Jo*"),
        (r#"name ILIKE "*jo*""#, "name=ilike.*jo*"),
        ("deleted IS null", "deleted=is.null"),
        ("active IS true", "active=is.true"),
        ("id IN (1, 2, 3)", "id=in.(1,2,3)"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(query(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_field_names_starting_with_keywords() {
    let test_cases = [
        ("NOTES = 1", "NOTES=eq.1"),
        ("NOT(NOTES = 1)", "NOTES=not.eq.1"),
        ("NOTICE IS null", "NOTICE=is.null"),
        ("AND(ORDERS > 2, ANDROID = true)", "and=(ORDERS.gt.2,ANDROID.eq.true)"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(query(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_reserved_characters_are_quoted() {
    let test_cases = [
        (r#"name = "a,b""#, r#"name=eq."a,b""#),
        (r#"name = "(x)""#, r#"name=eq."(x)""#),
        (r#"name = " padded""#, r#"name=eq." padded""#),
        (r#"name = """#, r#"name=eq."""#),
        (r#"name IN ("a,b", "c")"#, r#"name=in.("a,b",c)"#),
    ];

    for (input, expected) in test_cases {
        assert_eq!(query(input), expected, "Failed for input: {}", input);
    }
}

// ============================================================================
// Full-text search
// ============================================================================

#[test]
fn test_full_text_search() {
    let test_cases = [
        (r#"FTS(description, "findme")"#, "description=fts.findme"),
        (r#"PLFTS(description, "find me")"#, "description=plfts.find me"),
        (r#"PHFTS(description, "findme")"#, "description=phfts.findme"),
        (r#"WFTS(description, "findme")"#, "description=wfts.findme"),
        (
            r#"FTS(description, "chat", "french")"#,
            "description=fts(french).chat",
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(query(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_full_text_structure() {
    assert_eq!(
        parse_filter(r#"FTS(body, "term", "english")"#).unwrap(),
        Filter::FullText {
            field: "body".to_string(),
            op: FullTextOp::Fts,
            term: "term".to_string(),
            language: Some("english".to_string()),
        }
    );
}

// ============================================================================
// Logical groups
// ============================================================================

#[test]
fn test_logical_groups() {
    let test_cases = [
        (r#"OR(name = "Vincent")"#, "or=(name.eq.Vincent)"),
        (
            r#"OR(name = "Vincent", age > 32)"#,
            "or=(name.eq.Vincent,age.gt.32)",
        ),
        (
            r#"AND(name = "Vincent", NOT(age > 32))"#,
            "and=(name.eq.Vincent,age.not.gt.32)",
        ),
        (
            r#"AND(age > 18, OR(name = "a", name = "b"))"#,
            "and=(age.gt.18,or(name.eq.a,name.eq.b))",
        ),
        (
            r#"OR(FTS(description, "search"), age > 32, NOT(name = "Jonathan"), NOT(FTS(description, "forbid")))"#,
            "or=(description.fts.search,age.gt.32,name.not.eq.Jonathan,description.not.fts.forbid)",
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(query(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_negation_at_the_root() {
    assert_eq!(query("NOT(age > 32)"), "age=not.gt.32");
    assert_eq!(query("NOT(NOT(age > 32))"), "age=gt.32");
    assert_eq!(
        query("NOT(OR(age < 18, age > 65))"),
        "not.or=(age.lt.18,age.gt.65)"
    );
}

#[test]
fn test_parsed_structure() {
    assert_eq!(
        parse_filter("AND(age >= 18, NOT(id IN (1, 2)))").unwrap(),
        Filter::And(vec![
            Filter::Compare {
                field: "age".to_string(),
                op: CompareOp::Gte,
                value: Value::Number(18.0),
            },
            Filter::Not(Box::new(Filter::Compare {
                field: "id".to_string(),
                op: CompareOp::In,
                value: Value::from(vec![1, 2]),
            })),
        ])
    );
}

#[test]
fn test_display_matches_query_string() {
    let filter = parse_filter(r#"OR(name = "Vincent", age > 32)"#).unwrap();
    assert_eq!(filter.to_string(), filter.to_query_string());
}

#[test]
fn test_invalid_filters() {
    for source in [
        "",
        "age 32",
        "age =",
        "age = 1 + 2",
        "age = other_column",
        "OR()",
        "OR(age = 1",
        "NOT age = 1",
        "FTS(description)",
        "32 = age",
        "age = 32 extra",
    ] {
        assert!(parse_filter(source).is_err(), "expected an error for {:?}", source);
    }
}
