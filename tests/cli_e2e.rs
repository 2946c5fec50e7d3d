use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn xsdcat_bin() -> &'static str {
    env!("CARGO_BIN_EXE_xsdcat")
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn test_temp_dir(tag: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("xsdcat-cli-e2e-{tag}-{}-{ts}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_xsdcat(args: &[&str]) -> Output {
    Command::new(xsdcat_bin())
        .args(args)
        .output()
        .expect("run xsdcat")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn cli_element_prints_type() {
    let schema = fixture("library.xsd");
    let out = run_xsdcat(&["element", "-s", &schema, "--ns", "urn:library", "--name", "library"]);
    assert!(out.status.success(), "element failed: {}", String::from_utf8_lossy(&out.stderr));
    let text = stdout(&out);
    assert!(text.starts_with("{urn:library}library at "), "unexpected output: {text}");
    assert!(text.trim_end().ends_with("type anonymous xs:complexType"), "unexpected output: {text}");
}

#[test]
fn cli_base_type_json() {
    let schema = fixture("library.xsd");
    let out = run_xsdcat(&[
        "base-type", "-s", &schema, "--ns", "urn:types", "--name", "Price", "--json",
    ]);
    assert!(out.status.success(), "base-type failed: {}", String::from_utf8_lossy(&out.stderr));
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid json");
    assert_eq!(value["base"], "decimal");
    assert_eq!(value["type"], "{urn:types}Price");
}

#[test]
fn cli_facets_lists_levels() {
    let schema = fixture("library.xsd");
    let out = run_xsdcat(&["facets", "-s", &schema, "--ns", "urn:types", "--name", "Price"]);
    assert!(out.status.success(), "facets failed: {}", String::from_utf8_lossy(&out.stderr));
    let text = stdout(&out);
    assert!(text.contains("level 0 Price"));
    assert!(text.contains("  fractionDigits = 2"));
    assert!(text.contains("level 1 Amount"));
    assert!(text.contains("  totalDigits = 9"));
    assert!(!text.contains("fractionDigits = 4"));
}

#[test]
fn cli_resolve_instance() {
    let schema = fixture("library.xsd");
    let xml = fixture("library.xml");
    let out = run_xsdcat(&["resolve", "-s", &schema, "-i", &xml, "--json"]);
    assert!(out.status.success(), "resolve failed: {}", String::from_utf8_lossy(&out.stderr));

    let rows: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid json");
    let rows = rows.as_array().expect("array");
    let format = rows
        .iter()
        .find(|r| r["path"] == "/library/book/format")
        .expect("format row");
    assert!(format["definition"].as_str().unwrap().contains("{urn:library}format"));

    let magazine = rows
        .iter()
        .find(|r| r["path"] == "/library/magazine")
        .expect("magazine row");
    assert!(magazine["definition"].is_null());
}

#[test]
fn cli_not_found_exits_2() {
    let schema = fixture("library.xsd");
    let out = run_xsdcat(&["element", "-s", &schema, "--ns", "urn:library", "--name", "nope"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn cli_cycle_exits_1() {
    let schema = fixture("cycle_a.xsd");
    let out = run_xsdcat(&["base-type", "-s", &schema, "--ns", "urn:cycle-b", "--name", "Loop"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("malformed restriction chain"));
}

#[test]
fn cli_max_depth_limits_chain() {
    let dir = test_temp_dir("depth");
    let schema = dir.join("deep.xsd");
    fs::write(
        &schema,
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                      xmlns:d="urn:deep" targetNamespace="urn:deep">
               <xs:simpleType name="A"><xs:restriction base="d:B"/></xs:simpleType>
               <xs:simpleType name="B"><xs:restriction base="d:C"/></xs:simpleType>
               <xs:simpleType name="C"><xs:restriction base="xs:string"/></xs:simpleType>
           </xs:schema>"#,
    )
    .expect("write xsd");
    let schema = schema.to_str().unwrap();

    let ok = run_xsdcat(&["base-type", "-s", schema, "--ns", "urn:deep", "--name", "A"]);
    assert!(ok.status.success());
    assert_eq!(stdout(&ok).trim(), "string");

    let limited = run_xsdcat(&[
        "base-type", "-s", schema, "--ns", "urn:deep", "--name", "A", "--max-depth", "2",
    ]);
    assert_eq!(limited.status.code(), Some(1));
}

#[test]
fn cli_missing_schema_exits_1() {
    let out = run_xsdcat(&["element", "-s", "/nonexistent/none.xsd", "--name", "x"]);
    assert_eq!(out.status.code(), Some(1));
}
