//! Golden fixtures for the pass-chain JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use cascade_core::{CascadeError, ChainConfig};

// ---- Golden fixtures (JSON contracts) ----
const CHAIN_TWO_PASS_JSON: &str = include_str!("../fixtures/chain_two_pass.json");
const CHAIN_BAD_RESOLUTION_JSON: &str = include_str!("../fixtures/chain_bad_resolution.json");
const CHAIN_MISSING_KEY_JSON: &str = include_str!("../fixtures/chain_missing_key.json");
const CHAIN_EMPTY_JSON: &str = include_str!("../fixtures/chain_empty.json");

fn write_temp_fixture(name: &str, contents: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    p.push(format!("cascade_contract_tests_{name}_{ts}.json"));
    fs::write(&p, contents).expect("write fixture");
    p
}

#[test]
fn golden_two_pass_chain_parses() {
    let path = write_temp_fixture("chain_two_pass", CHAIN_TWO_PASS_JSON);

    let cfg = ChainConfig::from_json_path(&path).expect("chain_two_pass.json should parse");
    assert_eq!(cfg.passes.len(), 2);

    let res = cfg.resolution.expect("resolution present");
    assert_eq!((res.width, res.height), (640, 480));

    assert_eq!(cfg.passes[0].label.as_deref(), Some("invert"));
    assert!(cfg.passes[1].label.is_none());
    assert!(cfg.passes[1].fragment.ends_with("grayscale.frag"));

    let _ = fs::remove_file(path);
}

#[test]
fn golden_empty_chain_is_legal() {
    let path = write_temp_fixture("chain_empty", CHAIN_EMPTY_JSON);

    let cfg = ChainConfig::from_json_path(&path).expect("chain_empty.json should parse");
    assert!(cfg.passes.is_empty());
    assert!(cfg.resolution.is_none());

    let _ = fs::remove_file(path);
}

#[test]
fn golden_bad_resolution_is_rejected() {
    let path = write_temp_fixture("chain_bad_resolution", CHAIN_BAD_RESOLUTION_JSON);

    let err = ChainConfig::from_json_path(&path)
        .expect_err("chain_bad_resolution.json must fail (negative width)");
    match &err {
        CascadeError::InvalidConfig { msg, .. } => {
            assert!(msg.contains("non-positive"), "{msg}");
        }
        other => panic!("unexpected error: {other}"),
    }

    let _ = fs::remove_file(path);
}

#[test]
fn golden_missing_key_is_rejected() {
    let path = write_temp_fixture("chain_missing_key", CHAIN_MISSING_KEY_JSON);

    let err = ChainConfig::from_json_path(&path)
        .expect_err("chain_missing_key.json must fail (pass without fragment)");
    assert!(matches!(err, CascadeError::Json { .. }), "{err}");

    let _ = fs::remove_file(path);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = ChainConfig::from_json_path("/nonexistent/cascade/chain.json")
        .expect_err("must fail");
    assert!(matches!(err, CascadeError::Io { .. }), "{err}");
}
