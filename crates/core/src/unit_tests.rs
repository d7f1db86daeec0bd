// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn equality_against_str() {
    let id = UnitId::new("worker-1");
    assert_eq!(id, "worker-1");
    assert_eq!(id, *"worker-1");
}

#[test]
fn broadcast_identifier_is_recognized() {
    let id = UnitId::new(crate::UNIVERSAL_IDENTIFIER);
    assert!(id.is_broadcast());
    assert!(!UnitId::new("worker-1").is_broadcast());
}

#[test]
fn display_round_trips_through_string() {
    let id = UnitId::from("worker-2".to_string());
    assert_eq!(id.to_string(), "worker-2");
    assert_eq!(id.as_str(), "worker-2");
}
