//! Browser-side smoke tests for the wasm bindings. Run with
//! `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use mj_handcheck::wasm_api::check_hand;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn check_hand_solves_winning_hand() {
    let out = check_hand("b1 b2 b3 c4 c5 c6 w7 w8 w9 he he he b5 b5", false, true);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["success"], true);
    assert_eq!(v["solution"]["score"], 18);
    assert!(v["solution"]["free"].as_array().unwrap().is_empty());
}

#[wasm_bindgen_test]
fn check_hand_reports_waits() {
    let out = check_hand("b1 b2 b3 c4 c5 c6 w7 w8 w9 he he he b5", true, true);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["waits"], serde_json::json!(["b5"]));
}

#[wasm_bindgen_test]
fn check_hand_rejects_garbage() {
    let out = check_hand("b1 xx", false, true);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["success"], false);
    assert!(v["error"].as_str().unwrap().contains("Invalid hand"));
}
