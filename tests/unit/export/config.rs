use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_are_sensible() {
    let cfg = ExportConfig::default();
    assert_eq!(cfg.ready_poll_interval(), Duration::from_millis(5));
    assert_eq!(cfg.ready_timeout(), Duration::from_secs(2));
    assert_eq!(cfg.background_rgba, [0, 0, 0, 255]);
    assert!(cfg.overwrite);
    assert_eq!(cfg.loop_policy, ExternalLoopPolicy::Loop);
}

#[test]
fn json_keeps_defaults_for_missing_keys() {
    let cfg = ExportConfig::from_json_str(r#"{"ready_timeout_ms": 50, "loop_policy": "hold_last"}"#)
        .unwrap();
    assert_eq!(cfg.ready_timeout_ms, 50);
    assert_eq!(cfg.loop_policy, ExternalLoopPolicy::HoldLast);
    assert_eq!(cfg.ready_poll_ms, ExportConfig::default().ready_poll_ms);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ExportConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ScenecraftError::Serde(_)));
}

#[test]
fn json_file_round_trips_through_disk() {
    let path = std::env::temp_dir().join(format!("scenecraft-cfg-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, r#"{"overwrite": false}"#).unwrap();
    let cfg = ExportConfig::from_json_file(&path).unwrap();
    assert!(!cfg.overwrite);
    let _ = std::fs::remove_file(&path);

    assert!(ExportConfig::from_json_file(&path).is_err());
}

#[test]
fn overrides_replace_fields() {
    let cfg = ExportConfig::default().apply_overrides(env(&[
        (ENV_READY_TIMEOUT_MS, "250"),
        (ENV_READY_POLL_MS, "1"),
        (ENV_OVERWRITE, "no"),
    ]));
    assert_eq!(cfg.ready_timeout_ms, 250);
    assert_eq!(cfg.ready_poll_ms, 1);
    assert!(!cfg.overwrite);
}

#[test]
fn invalid_overrides_are_ignored() {
    let cfg = ExportConfig::default().apply_overrides(env(&[
        (ENV_READY_TIMEOUT_MS, "soon"),
        (ENV_READY_POLL_MS, "0"),
        (ENV_OVERWRITE, "maybe"),
    ]));
    assert_eq!(cfg, ExportConfig::default());
}
