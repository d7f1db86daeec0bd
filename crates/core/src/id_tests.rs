// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

// --- define_id! macro tests ---

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::from_string("tst-k"), 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn define_id_new_carries_prefix_and_is_unique() {
    let a = TestId::new();
    let b = TestId::new();
    assert!(a.as_str().starts_with(TestId::PREFIX));
    assert_ne!(a, b);
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("tst-abcdefghijklmnopqrs");
    assert_eq!(id.suffix(), "abcdefghijklmnopqrs");
}

// --- short() tests ---

#[test]
fn define_id_short_truncates() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

// --- IdBuf tests ---

#[test]
fn id_buf_round_trips_through_display() {
    let buf = IdBuf::new("hello");
    assert_eq!(buf.as_str(), "hello");
    assert_eq!(buf.to_string(), "hello");
    assert!(!buf.is_empty());
}

#[test]
fn id_buf_empty_is_empty() {
    assert!(IdBuf::empty().is_empty());
}

#[test]
fn id_buf_serde_round_trips() {
    let buf = IdBuf::new("round-trip-me");
    let json = serde_json::to_string(&buf).unwrap();
    let back: IdBuf = serde_json::from_str(&json).unwrap();
    assert_eq!(buf, back);
}

#[test]
fn id_buf_rejects_oversized_string_on_deserialize() {
    let too_long = "a".repeat(ID_MAX_LEN + 1);
    let json = serde_json::to_string(&too_long).unwrap();
    assert!(serde_json::from_str::<IdBuf>(&json).is_err());
}
