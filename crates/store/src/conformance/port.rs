use super::{check, TestResult};
use crate::persist::PersistencePort;

pub(super) fn run_port_tests<P, F>(factory: &F) -> Vec<TestResult>
where
    P: PersistencePort,
    F: Fn() -> P,
{
    vec![
        TestResult::from_result("port", "missing_key_is_none", missing_key_is_none(factory)),
        TestResult::from_result("port", "set_then_get", set_then_get(factory)),
        TestResult::from_result("port", "set_overwrites", set_overwrites(factory)),
        TestResult::from_result("port", "remove_deletes_key", remove_deletes_key(factory)),
        TestResult::from_result(
            "port",
            "remove_missing_key_is_ok",
            remove_missing_key_is_ok(factory),
        ),
        TestResult::from_result("port", "keys_are_independent", keys_are_independent(factory)),
        TestResult::from_result(
            "port",
            "values_are_stored_verbatim",
            values_are_stored_verbatim(factory),
        ),
    ]
}

fn missing_key_is_none<P: PersistencePort, F: Fn() -> P>(factory: &F) -> Result<(), String> {
    let port = factory();
    let value = port.get("absent").map_err(|e| e.to_string())?;
    check(value.is_none(), || format!("expected None, got {:?}", value))
}

fn set_then_get<P: PersistencePort, F: Fn() -> P>(factory: &F) -> Result<(), String> {
    let mut port = factory();
    port.set("k", "v").map_err(|e| e.to_string())?;
    let value = port.get("k").map_err(|e| e.to_string())?;
    check(value.as_deref() == Some("v"), || {
        format!("expected Some(\"v\"), got {:?}", value)
    })
}

fn set_overwrites<P: PersistencePort, F: Fn() -> P>(factory: &F) -> Result<(), String> {
    let mut port = factory();
    port.set("k", "first").map_err(|e| e.to_string())?;
    port.set("k", "second").map_err(|e| e.to_string())?;
    let value = port.get("k").map_err(|e| e.to_string())?;
    check(value.as_deref() == Some("second"), || {
        format!("expected the later value, got {:?}", value)
    })
}

fn remove_deletes_key<P: PersistencePort, F: Fn() -> P>(factory: &F) -> Result<(), String> {
    let mut port = factory();
    port.set("k", "v").map_err(|e| e.to_string())?;
    port.remove("k").map_err(|e| e.to_string())?;
    let value = port.get("k").map_err(|e| e.to_string())?;
    check(value.is_none(), || format!("key survived remove: {:?}", value))
}

fn remove_missing_key_is_ok<P: PersistencePort, F: Fn() -> P>(factory: &F) -> Result<(), String> {
    let mut port = factory();
    port.remove("absent").map_err(|e| e.to_string())
}

fn keys_are_independent<P: PersistencePort, F: Fn() -> P>(factory: &F) -> Result<(), String> {
    let mut port = factory();
    port.set("a", "1").map_err(|e| e.to_string())?;
    port.set("b", "2").map_err(|e| e.to_string())?;
    port.remove("a").map_err(|e| e.to_string())?;
    let b = port.get("b").map_err(|e| e.to_string())?;
    check(b.as_deref() == Some("2"), || {
        format!("removing 'a' disturbed 'b': {:?}", b)
    })
}

fn values_are_stored_verbatim<P: PersistencePort, F: Fn() -> P>(
    factory: &F,
) -> Result<(), String> {
    let mut port = factory();
    let payload = "{\"nested\": \"quotes \\\" and\\nnewlines\", \"unicode\": \"zürich\"}";
    port.set("k", payload).map_err(|e| e.to_string())?;
    let value = port.get("k").map_err(|e| e.to_string())?;
    check(value.as_deref() == Some(payload), || {
        format!("payload changed: {:?}", value)
    })
}
