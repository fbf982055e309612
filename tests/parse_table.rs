use rstest::rstest;
use flatjson::{Error, LargeText, ParseOptions, Value};

#[rstest]
fn parse_flattens_into_deterministic_paths() {
    let table = flatjson::parse(r#"{"foo": 3, "bar": [1, 2, 3, 4]}"#).unwrap();
    assert_eq!(table.get_count(".").unwrap(), Some(2));
    assert_eq!(table.get_count("bar").unwrap(), Some(4));
    assert_eq!(table.get("foo"), Some(&Value::Number(3.0)));
    for index in 1..=4 {
        assert_eq!(
            table.get(&format!("bar[{index}]")),
            Some(&Value::Number(index as f64))
        );
    }
}

#[rstest]
fn nested_members_and_quoted_names() {
    let table =
        flatjson::parse(r#"{"a": {"first name": "Ada", "b": [{"c": true}]}}"#).unwrap();
    assert_eq!(
        table.get("a.\"first name\""),
        Some(&Value::String("Ada".to_string()))
    );
    assert_eq!(table.get("a.b[1].c"), Some(&Value::Boolean(true)));
    assert_eq!(table.get_members("a").unwrap().unwrap().len(), 2);
}

#[rstest]
fn strict_rejects_what_lax_accepts() {
    let source = r#"{a: 1,}"#;
    assert!(flatjson::parse(source).is_err());
    let lax = ParseOptions::new().with_strict(false);
    let table = flatjson::parse_with_options(source, &lax).unwrap();
    assert_eq!(table.get_number("a").unwrap(), Some(1.0));
}

#[rstest]
fn strict_flag_variant_mirrors_boolean_flag() {
    let source = r#"[1, 2,]"#;
    assert!(flatjson::parse_with_options(source, &ParseOptions::from_strict_flag("Y")).is_err());
    let table =
        flatjson::parse_with_options(source, &ParseOptions::from_strict_flag("n")).unwrap();
    assert_eq!(table.get_count(".").unwrap(), Some(2));
}

#[rstest]
fn chunked_source_concatenates_without_separators() {
    // The string value straddles the chunk boundary.
    let table = flatjson::parse_chunks(vec!["{\"a\": \"he", "llo\"}"]).unwrap();
    assert_eq!(table.get_string("a").unwrap(), Some("hello".to_string()));
}

#[rstest]
fn line_source_implies_breaks_between_pieces() {
    let lines = vec![
        "{".to_string(),
        "  \"a\": 1,".to_string(),
        "  \"b\": [true]".to_string(),
        "}".to_string(),
    ];
    let table = flatjson::parse_lines(&lines).unwrap();
    assert_eq!(table.get_number("a").unwrap(), Some(1.0));
    assert_eq!(table.get_boolean("b[1]").unwrap(), Some(true));

    // The synthetic break ends a lax bare word at the line boundary.
    let lines = vec!["{a: x".to_string(), ", b: y}".to_string()];
    let lax = ParseOptions::new().with_strict(false);
    let table = flatjson::parse_lines_with_options(&lines, &lax).unwrap();
    assert_eq!(table.get_string("a").unwrap(), Some("x".to_string()));
    assert_eq!(table.get_string("b").unwrap(), Some("y".to_string()));
}

#[rstest]
fn largetext_source_pages_through_the_same_grammar() {
    let mut source = String::from("{\"items\": [");
    for index in 0..2000 {
        if index > 0 {
            source.push(',');
        }
        source.push_str(&format!("{{\"n\": {index}}}"));
    }
    source.push_str("]}");
    let text = LargeText::from(source.as_str());
    assert!(text.pages().count() > 1);

    let table = flatjson::parse_largetext(&text).unwrap();
    assert_eq!(table.get_count("items").unwrap(), Some(2000));
    assert_eq!(table.get_number("items[2000].n").unwrap(), Some(1999.0));
}

#[rstest]
fn errors_carry_line_and_column() {
    let err = flatjson::parse("{\n  \"a\": 1\n  \"b\": 2\n}").unwrap_err();
    match err {
        Error::Parse { line, column, message } => {
            assert_eq!(line, 3);
            assert_eq!(column, 3);
            assert!(message.contains("','"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn line_numbers_account_for_synthetic_breaks() {
    let lines = vec!["{".to_string(), "\"a\" 1}".to_string()];
    let err = flatjson::parse_lines(&lines).unwrap_err();
    match err {
        Error::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn reparsing_rebuilds_the_table_from_scratch() {
    let table = flatjson::parse(r#"{"stale": 1}"#).unwrap();
    assert!(table.exists("stale"));
    let table = flatjson::parse(r#"{"fresh": 2}"#).unwrap();
    assert!(!table.exists("stale"));
    assert!(table.exists("fresh"));
}
