use rstest::rstest;
use flatjson::{
    CachePolicy, Error, JsonWriter, OutputOptions, TextSink, Value,
};

fn compact() -> OutputOptions {
    OutputOptions::default().with_indent(0)
}

#[rstest]
fn round_trip_preserves_leaf_paths_and_values() {
    let source = r#"{
        "name": "say \"hi\"",
        "n": -0.005,
        "flag": false,
        "gap": null,
        "items": [{"x": 1}, {"x": 2}, [3, [4]]],
        "odd name": {"inner": "value"}
    }"#;
    let table = flatjson::parse(source).unwrap();

    let mut writer = JsonWriter::to_text(&compact());
    writer.append_subtree(&table, ".").unwrap();
    let emitted = writer.into_output().unwrap().to_string();

    let reparsed = flatjson::parse(&emitted).unwrap();
    let mut paths: Vec<&str> = table.paths().collect();
    let mut reparsed_paths: Vec<&str> = reparsed.paths().collect();
    paths.sort_unstable();
    reparsed_paths.sort_unstable();
    assert_eq!(paths, reparsed_paths);
    for path in paths {
        assert_eq!(table.get(path), reparsed.get(path), "at path {path}");
    }
}

#[rstest]
fn escaping_survives_a_parse_round_trip() {
    let original = "quote \" backslash \\ control \u{1} tab \t euro \u{20AC} clef \u{1D11E}";
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_object().unwrap();
    writer.write_string("s", original).unwrap();
    let emitted = writer.into_output().unwrap().to_string();

    let table = flatjson::parse(&emitted).unwrap();
    assert_eq!(table.get_string("s").unwrap(), Some(original.to_string()));
}

#[rstest]
fn close_all_balances_any_open_sequence() {
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_array().unwrap();
    writer.open_object().unwrap();
    writer.open_array_named("a").unwrap();
    writer.append_number(1.0).unwrap();
    writer.open_object().unwrap();
    writer.open_object_named("b").unwrap();
    writer.close_all().unwrap();
    let emitted = writer.into_output().unwrap().to_string();
    assert_eq!(emitted, r#"[{"a":[1,{"b":{}}]}]"#);
    assert!(flatjson::parse(&emitted).is_ok());
}

#[rstest]
fn mismatched_close_is_a_state_error() {
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_object().unwrap();
    writer.open_array_named("a").unwrap();
    assert!(matches!(
        writer.close_object().unwrap_err(),
        Error::WriterState(_)
    ));
    writer.close_array().unwrap();
    writer.close_object().unwrap();
    assert_eq!(writer.into_output().unwrap().to_string(), r#"{"a":[]}"#);
}

#[rstest]
fn suppressed_writes_do_not_flip_the_comma_state() {
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_object().unwrap();
    writer.write_opt_string("skipped", None).unwrap();
    writer.write_number("first", 1.0).unwrap();
    writer.write_opt_boolean("also_skipped", None).unwrap();
    writer.write_number("second", 2.0).unwrap();
    assert_eq!(
        writer.into_output().unwrap().to_string(),
        r#"{"first":1,"second":2}"#
    );
}

#[rstest]
fn indented_output_nests_by_level() {
    let mut writer = JsonWriter::to_text(&OutputOptions::default().with_indent(4));
    writer.open_object().unwrap();
    writer.open_array_named("rows").unwrap();
    writer.append_number(1.0).unwrap();
    let emitted = writer.into_output().unwrap().to_string();
    assert_eq!(emitted, "{\n    \"rows\": [\n        1\n    ]\n}");
}

#[rstest]
fn stream_sink_writes_header_block_first() {
    let options = OutputOptions::default()
        .with_cache(CachePolicy::Allow)
        .with_etag("v3")
        .with_indent(0);
    let mut writer = JsonWriter::to_stream(Vec::new(), options);
    writer.open_object().unwrap();
    writer.write_boolean("ok", true).unwrap();
    writer.close_object().unwrap();
    let bytes = writer.into_stream().unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "Content-Type: application/json\nCache-Control: public\nETag: \"v3\"\n\n{\"ok\":true}"
    );
}

#[rstest]
fn headerless_stream_is_just_the_document() {
    let options = OutputOptions::default()
        .with_emit_header(false)
        .with_indent(0);
    let mut writer = JsonWriter::to_stream(Vec::new(), options);
    writer.open_array().unwrap();
    writer.append_string("x".repeat(40_000).as_str()).unwrap();
    writer.close_array().unwrap();
    let bytes = writer.into_stream().unwrap();
    assert_eq!(bytes.len(), 40_004);
    assert!(bytes.starts_with(b"[\""));
}

#[rstest]
fn subtree_write_embeds_a_parsed_fragment() {
    let table = flatjson::parse(r#"{"profile": {"city": "X", "ids": [1, 2]}}"#).unwrap();
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_object().unwrap();
    writer.write_string("kind", "wrapped").unwrap();
    writer.write_subtree("data", &table, "profile").unwrap();
    assert_eq!(
        writer.into_output().unwrap().to_string(),
        r#"{"kind":"wrapped","data":{"city":"X","ids":[1,2]}}"#
    );
}

#[rstest]
fn subtree_write_for_an_unknown_path_emits_nothing() {
    let table = flatjson::parse(r#"{"a": 1}"#).unwrap();
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_object().unwrap();
    // Neither a member name nor a separator may leak out, so a real
    // write that follows still opens the object.
    writer.write_subtree("gone", &table, "absent").unwrap();
    writer.write_number("a", 1.0).unwrap();
    writer.write_subtree("also_gone", &table, "a.b.c").unwrap();
    assert_eq!(writer.into_output().unwrap().to_string(), r#"{"a":1}"#);

    let mut writer = JsonWriter::to_text(&compact());
    writer.open_array().unwrap();
    writer.append_subtree(&table, "missing").unwrap();
    writer.append_boolean(true).unwrap();
    assert_eq!(writer.into_output().unwrap().to_string(), "[true]");
}

#[rstest]
fn raw_fragments_are_spliced_verbatim() {
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_object().unwrap();
    writer.write_number("a", 1.0).unwrap();
    writer.write_raw("\"b\":[true]").unwrap();
    assert_eq!(
        writer.into_output().unwrap().to_string(),
        r#"{"a":1,"b":[true]}"#
    );
}

#[rstest]
fn number_edge_formats() {
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_array().unwrap();
    writer.append_number(-0.005).unwrap();
    writer.append_number(0.0).unwrap();
    writer.append_number(f64::NAN).unwrap();
    writer.append_number(2.5e-4).unwrap();
    writer.append_number(1e3).unwrap();
    let emitted = writer.into_output().unwrap().to_string();
    assert_eq!(emitted, "[-0.005,0,null,0.00025,1000]");

    let table = flatjson::parse(&emitted).unwrap();
    assert_eq!(table.get("[1]"), Some(&Value::Number(-0.005)));
    assert_eq!(table.get("[3]"), Some(&Value::Null));
}

#[rstest]
fn text_sink_collects_into_large_text() {
    let mut writer = JsonWriter::to_text(&compact());
    writer.open_array().unwrap();
    for index in 0..10_000 {
        writer.append_number(index as f64).unwrap();
    }
    let output = writer.into_output().unwrap();
    assert!(output.pages().count() > 1);
    let table = flatjson::parse_largetext(&output).unwrap();
    assert_eq!(table.get_count(".").unwrap(), Some(10_000));
    assert_eq!(table.get_number("[10000]").unwrap(), Some(9999.0));
}

#[rstest]
fn unused_text_sink_yields_empty_output() {
    let writer: JsonWriter<TextSink> = JsonWriter::to_text(&compact());
    let output = writer.into_output().unwrap();
    assert!(output.is_empty());
}
