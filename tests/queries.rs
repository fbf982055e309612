use rstest::rstest;
use flatjson::{Error, PathArg, ValueTable};

fn fixture() -> ValueTable {
    flatjson::parse(
        r#"{
            "name": "Ada",
            "age": 37,
            "admin": true,
            "score": "12.5",
            "missing_value": null,
            "joined": "2019-04-01",
            "seen": "2024-02-29T12:00:00.5+01:30",
            "tags": ["a", null, true, 7],
            "lucky": [1, null, 3],
            "profile": {"city": "London", "zip": "E1"}
        }"#,
    )
    .unwrap()
}

#[rstest]
fn exists_and_soft_missing_lookups() {
    let table = fixture();
    assert!(table.exists("name"));
    assert!(!table.exists("nope"));
    assert_eq!(table.get_string("nope").unwrap(), None);
    assert_eq!(table.get_number("nope").unwrap(), None);
    assert_eq!(table.get_boolean("missing_value").unwrap(), None);
    assert_eq!(table.get_count("nope").unwrap(), None);
    assert_eq!(table.get_members("nope").unwrap(), None);
}

#[rstest]
fn string_accessor_coerces_scalars() {
    let table = fixture();
    assert_eq!(table.get_string("name").unwrap(), Some("Ada".to_string()));
    assert_eq!(table.get_string("age").unwrap(), Some("37".to_string()));
    assert_eq!(table.get_string("admin").unwrap(), Some("true".to_string()));
    assert!(matches!(
        table.get_string("profile"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[rstest]
fn number_accessor_converts_numeric_strings_only() {
    let table = fixture();
    assert_eq!(table.get_number("age").unwrap(), Some(37.0));
    assert_eq!(table.get_number("score").unwrap(), Some(12.5));
    assert!(matches!(
        table.get_number("name"),
        Err(Error::Conversion { .. })
    ));
    assert!(matches!(
        table.get_number("admin"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[rstest]
fn boolean_accessor_does_not_coerce() {
    let table = fixture();
    assert_eq!(table.get_boolean("admin").unwrap(), Some(true));
    assert!(matches!(
        table.get_boolean("name"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[rstest]
fn temporal_accessors() {
    let table = fixture();
    let date = table.get_datetime("joined").unwrap().unwrap();
    assert_eq!(date.to_string(), "2019-04-01T00:00:00");

    let plain = table.get_timestamp("seen").unwrap().unwrap();
    assert_eq!(plain.offset_minutes, None);
    let zoned = table.get_timestamp_tz("seen").unwrap().unwrap();
    assert_eq!(zoned.offset_minutes, Some(90));
    assert!(matches!(
        table.get_datetime("name"),
        Err(Error::Conversion { .. })
    ));
}

#[rstest]
fn aggregate_accessors_enforce_kinds() {
    let table = fixture();
    assert_eq!(table.get_count("profile").unwrap(), Some(2));
    assert_eq!(table.get_count("tags").unwrap(), Some(4));
    let members = table.get_members("profile").unwrap().unwrap();
    assert_eq!(members, vec!["city", "zip"]);
    assert!(matches!(
        table.get_count("name"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        table.get_members("tags"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[rstest]
fn array_accessors_work_element_wise() {
    let table = fixture();
    assert_eq!(
        table.get_string_array("tags").unwrap().unwrap(),
        vec![
            Some("a".to_string()),
            None,
            Some("true".to_string()),
            Some("7".to_string()),
        ]
    );
    assert_eq!(
        table.get_number_array("lucky").unwrap().unwrap(),
        vec![Some(1.0), None, Some(3.0)]
    );
    assert!(table.get_number_array("tags").is_err());
}

#[rstest]
fn positional_substitution_in_paths() {
    let table = fixture();
    let args = [PathArg::from("tags"), PathArg::from(1usize)];
    assert_eq!(
        table.get_string_with("%s[%d]", &args).unwrap(),
        Some("a".to_string())
    );
    assert!(table.exists_with("%0[%1]", &args));
    assert_eq!(
        table.get_count_with("%0", &args[..1]).unwrap(),
        Some(4)
    );
    assert_eq!(
        table.get_value_with("%s[%d]", &args),
        table.get_value("tags[1]")
    );
    assert!(table.get_value("tags[9]").is_none());
}

#[rstest]
fn wildcard_search_picks_deepest_tied_candidates() {
    let table = flatjson::parse(
        r#"{"items":[{"name":"A","magical":true},{"name":"B","magical":"rather not"}]}"#,
    )
    .unwrap();

    let hits = table.find_paths_like("items[%]", Some(".magical"), Some("true"));
    assert_eq!(hits, vec!["items[1]".to_string()]);
    assert_eq!(
        table.get_string(&format!("{}.name", hits[0])).unwrap(),
        Some("A".to_string())
    );

    let hits = table.find_paths_like("items[%]", Some(".magical"), Some("%not"));
    assert_eq!(hits, vec!["items[2]".to_string()]);

    let hits = table.find_paths_like("items[%].magical", None, None);
    assert_eq!(
        hits,
        vec!["items[1].magical".to_string(), "items[2].magical".to_string()]
    );
}

#[rstest]
fn wildcard_search_without_hits_is_empty() {
    let table = fixture();
    assert!(table.find_paths_like("profile.%", None, Some("Paris")).is_empty());
    assert!(table.find_paths_like("absent.%", None, None).is_empty());
}

#[rstest]
fn subtree_to_value_rebuilds_nested_shape() {
    let table = fixture();
    let profile = table.to_value("profile").unwrap();
    assert_eq!(
        profile,
        serde_json::json!({"city": "London", "zip": "E1"})
    );
    let tags = table.to_value("tags").unwrap();
    assert_eq!(tags, serde_json::json!(["a", null, true, 7]));
}
