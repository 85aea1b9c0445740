use mace_lang::types::{TypeRecord, evaluate_type, format_union, parse_type};
use mace_lang::{EvalContext, IdentifierSource, ObjectMap, Value};

fn records(source: &str) -> Vec<TypeRecord> {
    evaluate_type(source, &mut EvalContext::new()).unwrap()
}

fn simple(name: &str) -> TypeRecord {
    TypeRecord::new(name)
}

#[test]
fn test_simple_type() {
    assert_eq!(records("String"), vec![simple("String")]);
}

#[test]
fn test_single_template() {
    assert_eq!(
        records("List<String>"),
        vec![TypeRecord {
            name: "List".to_string(),
            config: ObjectMap::new(),
            fullname: "List<String>".to_string(),
            template: vec![vec![simple("String")]],
        }]
    );
}

#[test]
fn test_multiple_templates() {
    let map = &records("Map<String, Number>")[0];
    assert_eq!(map.fullname, "Map<String, Number>");
    assert_eq!(map.template, vec![vec![simple("String")], vec![simple("Number")]]);
}

#[test]
fn test_union() {
    assert_eq!(
        records("String | Boolean"),
        vec![simple("String"), simple("Boolean")]
    );
}

#[test]
fn test_nested_template_union() {
    let union = records("Map<String, List<String>> | Boolean");
    assert_eq!(union.len(), 2);
    assert_eq!(union[0].fullname, "Map<String, List<String>>");
    assert_eq!(
        union[0].template[1],
        vec![TypeRecord {
            name: "List".to_string(),
            config: ObjectMap::new(),
            fullname: "List<String>".to_string(),
            template: vec![vec![simple("String")]],
        }]
    );
    assert_eq!(union[1], simple("Boolean"));
}

#[test]
fn test_deeply_nested_closing_angles() {
    let outer = &records("A<B<C<D>>>")[0];
    assert_eq!(outer.fullname, "A<B<C<D>>>");
    assert_eq!(outer.template[0][0].fullname, "B<C<D>>");
    assert_eq!(outer.template[0][0].template[0][0].fullname, "C<D>");
}

#[test]
fn test_template_arguments_can_be_unions() {
    let list = &records("List<String | Number>")[0];
    assert_eq!(list.template, vec![vec![simple("String"), simple("Number")]]);
}

#[test]
fn test_simple_config() {
    let string = &records("String{value: \"Hello\"}")[0];
    assert_eq!(string.fullname, "String{value: \"Hello\"}");
    assert_eq!(string.config.get("value"), Some(&Value::from("Hello")));
}

#[test]
fn test_complex_config() {
    let string = &records("String{value: \"Hello\", values: [1, 2, 3]}")[0];
    assert_eq!(string.fullname, "String{value: \"Hello\", values: [1, 2, 3]}");
    assert_eq!(string.config.get("values"), Some(&Value::from(vec![1, 2, 3])));
}

#[test]
fn test_config_is_evaluated_against_the_context() {
    let mut ctx = EvalContext::new()
        .with_identifiers(IdentifierSource::from_map([("limit", 10.0)]));
    let number = &evaluate_type("Number{max: limit * 2}", &mut ctx).unwrap()[0];
    assert_eq!(number.config.get("max"), Some(&Value::Number(20.0)));
}

#[test]
fn test_canonical_form_round_trips() {
    for source in [
        "String",
        "Map<String, List<String>> | Boolean",
        "String{value: \"Hello\", values: [1, 2, 3]}",
        "List<String | Number>{min: 1}",
        "String{value: \"Hello\", label: \"x\"}",
        "Number{max: 10, min: 0, step: {unit: \"px\", by: 2}}",
    ] {
        let parsed = records(source);
        let rendered = format_union(&parsed);
        assert_eq!(rendered, source);
        assert_eq!(records(&rendered), parsed);
    }
}

#[test]
fn test_records_serialize() {
    let json = serde_json::to_string(&records("List<String>")).unwrap();
    assert_eq!(
        json,
        r#"[{"name":"List","config":{},"fullname":"List<String>","template":[[{"name":"String","config":{},"fullname":"String","template":[]}]]}]"#
    );
}

#[test]
fn test_invalid_types() {
    for source in ["", "List<", "List<>", "Map<String,>", "String |", "3", "List<String>>"] {
        assert!(parse_type(source).is_err(), "expected an error for {:?}", source);
    }
}
