use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

use fastex_core::config::Config;
use fastex_core::dataset::{load_jsonl, read_jsonl};
use fastex_core::labels::{only_labels_changed, LabelValues};
use fastex_core::schema::FieldKind;
use fastex_core::traits::RecordObserver;
use fastex_core::{Error, Scalar, Value};

#[test]
fn read_jsonl_skips_blank_lines() {
    let input = "\n{\"str\": \"a value\", \"int\": 1, \"bool\": true}\n{\"str\": \"another value\", \"int\": 2, \"bool\": false}\n   \n";
    let records = read_jsonl(Cursor::new(input), Path::new("<memory>")).expect("read");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("str"), Some(&Value::text("a value")));
    assert_eq!(records[1].get("bool"), Some(&Value::Scalar(Scalar::Bool(false))));
}

#[test]
fn load_jsonl_reports_bad_line_number() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data.jsonl");
    fs::write(&path, "{\"a\": 1}\n{not json}\n").unwrap();

    match load_jsonl(&path) {
        Err(Error::Json { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a JSON error, got {:?}", other),
    }
}

#[test]
fn load_jsonl_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let err = load_jsonl(&tmp.path().join("nope.jsonl")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "got {:?}", err);
}

#[test]
fn scalar_text_forms() {
    let v: Value = serde_json::from_str(r#"{"n": 3, "f": 2.5, "b": true, "s": "x"}"#).unwrap();
    let text = |k: &str| match v.get(k) {
        Some(Value::Scalar(s)) => s.to_string(),
        other => panic!("expected scalar at {}, got {:?}", k, other),
    };
    assert_eq!(text("n"), "3");
    assert_eq!(text("f"), "2.5");
    assert_eq!(text("b"), "True");
    assert_eq!(text("s"), "x");
}

#[test]
fn null_children_count_as_absent() {
    let v: Value = serde_json::from_str(r#"{"archived": null}"#).unwrap();
    assert!(v.get("archived").is_none());
    assert!(v.get("missing").is_none());
}

#[test]
fn config_reads_schema_and_resolves_input() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fex.toml");
    fs::write(
        &path,
        r#"
[data]
input = "data/records.jsonl"

[[schema.fields]]
name = "text"
type = "text"

[[schema.fields]]
name = "label"
type = "multiclass"
values = ["positive", "negative"]

[[schema.fields]]
name = "meta"
type = "meta_t"

[[schema.types]]
name = "meta_t"
fields = [{ name = "note", type = "text" }, { name = "votes", type = "counts" }]
"#,
    )
    .unwrap();

    let config = Config::from_file(&path);
    let schema = config.schema().expect("schema").expect("schema present");
    assert_eq!(schema.text_fields().collect::<Vec<_>>(), ["text", "meta.note"]);
    assert!(schema.has_field("meta.votes.up"), "counts sub-keys are known");
    assert!(!schema.has_field("meta.nope"));
    assert_eq!(schema.field("label").map(|f| &f.kind), Some(&FieldKind::Multiclass));

    let input = config.input_path().expect("input").expect("input present");
    assert_eq!(input, tmp.path().join("data/records.jsonl"));
}

#[test]
fn config_without_schema_is_none() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fex.toml");
    fs::write(&path, "[data]\ninput = \"/abs/records.jsonl\"\n").unwrap();

    let config = Config::from_file(&path);
    assert!(config.schema().expect("schema").is_none());
    assert_eq!(config.input_path().unwrap(), Some("/abs/records.jsonl".into()));
}

#[test]
fn unresolved_type_degrades_to_leaf() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fex.toml");
    fs::write(&path, "[[schema.fields]]\nname = \"extra\"\ntype = \"ghost\"\n").unwrap();

    let schema = Config::from_file(&path).schema().unwrap().unwrap();
    assert!(schema.has_field("extra"));
    assert_eq!(schema.diagnostics().len(), 1);
}

#[test]
fn label_values_collects_observed_labels() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fex.toml");
    fs::write(
        &path,
        r#"
[[schema.fields]]
name = "label"
type = "multilabel"
values = ["b"]

[[schema.fields]]
name = "body"
type = "text"
"#,
    )
    .unwrap();
    let schema = Config::from_file(&path).schema().unwrap().unwrap();

    let mut labels = LabelValues::from_schema(&schema);
    for line in [r#"{"label": ["c", "a"]}"#, r#"{"label": "a"}"#, r#"{"label": null, "body": "x"}"#] {
        labels.observe(&serde_json::from_str(line).unwrap());
    }

    assert_eq!(labels.values("label"), Some(vec!["a", "b", "c"]));
    assert_eq!(labels.values("body"), None, "text fields are not tracked");
    assert_eq!(labels.fields().collect::<Vec<_>>(), ["label"]);
}

#[test]
fn config_declares_label_validation() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fex.toml");
    fs::write(
        &path,
        r#"
[[schema.fields]]
name = "id"
type = "text"
regex-validation = "[A-Z]{2}-[0-9]+"

[[schema.fields]]
name = "topics"
type = "multilabel"
values = ["sports", "politics"]
"#,
    )
    .unwrap();

    let schema = Config::from_file(&path).schema().expect("schema").expect("schema present");
    assert!(schema.validate("id", &Value::text("AB-12")));
    assert!(!schema.validate("id", &Value::text("ab-12")));
    let topics: Value = serde_json::from_str(r#"["sports", "politics"]"#).unwrap();
    assert!(schema.validate("topics", &topics));
    assert!(!schema.validate("topics", &Value::text("weather")));
}

#[test]
fn updates_may_only_touch_labels() {
    let original: Value = serde_json::from_str(r#"{"text": "hi", "meta": {"n": 1}}"#).unwrap();
    let labelled: Value =
        serde_json::from_str(r#"{"text": "hi", "meta": {"n": 1}, "_fex": {"label": "pos"}}"#).unwrap();
    let partial: Value = serde_json::from_str(r#"{"_fex": {"label": "neg"}}"#).unwrap();
    let edited: Value = serde_json::from_str(r#"{"text": "bye", "_fex": {}}"#).unwrap();
    let added: Value = serde_json::from_str(r#"{"text": "hi", "extra": 1}"#).unwrap();

    assert!(only_labels_changed(&original, &labelled));
    assert!(only_labels_changed(&labelled, &partial));
    assert!(!only_labels_changed(&original, &edited), "changing a data key is refused");
    assert!(!only_labels_changed(&original, &added), "new data keys are refused");
    assert!(!only_labels_changed(&original, &Value::text("x")));
}
