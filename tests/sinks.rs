mod helpers;

use fanlog::test_utils::SharedBuffer;
use fanlog::{Context, Level, StructuredHandler, TextHandler};
use helpers::{TestRegistry, TEST_HOST};
use std::sync::Arc;

#[test]
fn test_text_handler_at_warning() {
    let test = TestRegistry::new();
    let out = SharedBuffer::new();
    test.registry
        .register(Arc::new(TextHandler::new(out.clone())), Level::Warning);

    test.registry.info("skip").unwrap();
    test.registry.debug("skip too").unwrap();
    assert!(out.is_empty());

    test.registry.warning("seen").unwrap();
    let line = out.contents();
    assert!(line.contains("seen"));
    assert!(line.contains("name = <root>"));
    assert!(line.starts_with(&format!("({}) [", TEST_HOST)));
    assert!(line.contains("] WARNING: seen "));
    assert!(line.ends_with('\n'));
    out.clear();

    test.registry.get_logger("svc").error("boom").unwrap();
    let line = out.contents();
    assert!(line.contains("ERROR: boom"));
    assert!(line.contains("name = svc"));
    assert!(!line.contains("<root>"));
}

#[test]
fn test_text_handler_renders_caller_fields() {
    let test = TestRegistry::new();
    let out = SharedBuffer::new();
    test.registry
        .register(Arc::new(TextHandler::new(out.clone())), Level::Debug);

    test.registry
        .infom("login", Context::new().with("user", "ada").with("attempt", 2))
        .unwrap();
    let line = out.contents();
    assert!(line.contains("user = ada"));
    assert!(line.contains("attempt = 2"));
    assert!(line.contains(&format!("hostname = {}", TEST_HOST)));
    assert_eq!(line.lines().count(), 1);
}

#[test]
fn test_structured_handler_at_debug() {
    let test = TestRegistry::new();
    let out = SharedBuffer::new();
    test.registry
        .register(Arc::new(StructuredHandler::new(out.clone())), Level::Debug);

    test.registry.debug("hi").unwrap();

    let record: serde_json::Value = serde_json::from_str(out.contents().trim_end()).unwrap();
    assert_eq!(record["v"], 0);
    assert_eq!(record["msg"], "hi");
    assert_eq!(record["level"], 20);
    assert_eq!(record["name"], "<root>");
    assert_eq!(record["hostname"], TEST_HOST);
    assert_eq!(record["pid"], std::process::id());
    assert!(record["time"].is_string());
}

#[test]
fn test_structured_level_codes() {
    let test = TestRegistry::new();
    let out = SharedBuffer::new();
    test.registry
        .register(Arc::new(StructuredHandler::new(out.clone())), Level::Debug);

    for level in Level::ALL {
        test.registry.log(level, level).unwrap();
    }

    let contents = out.contents();
    let records: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), Level::ALL.len());
    for (record, level) in records.iter().zip(Level::ALL) {
        assert_eq!(record["msg"], level.to_string());
    }
    let codes: Vec<u64> = records.iter().map(|r| r["level"].as_u64().unwrap()).collect();
    assert_eq!(codes, vec![20, 30, 40, 50, 60, 60]);
}

#[test]
fn test_text_and_structured_handlers_see_the_same_event() {
    let test = TestRegistry::new();
    let text = SharedBuffer::new();
    let json = SharedBuffer::new();
    test.registry
        .register(Arc::new(StructuredHandler::new(json.clone())), Level::Debug);
    test.registry
        .register(Arc::new(TextHandler::new(text.clone())), Level::Debug);

    test.registry
        .warningm("shared", Context::new().with("k", "v"))
        .unwrap();

    let record: serde_json::Value = serde_json::from_str(json.contents().trim_end()).unwrap();
    assert_eq!(record["k"], "v");
    // the structured handler works on a copy, so the text handler still sees
    // the original time value and no structured-only keys
    let line = text.contents();
    assert!(line.contains("k = v"));
    assert!(!line.contains("msg = "));
    assert!(!line.contains("v = 0"));
}
