// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Payload Validation

use hackathon_tasks::events::{FieldType, Schema, SchemaError};
use proptest::prelude::*;
use serde_json::json;

fn participant() -> Schema {
    Schema::new("WithParticipantId").field("participant_id", FieldType::Integer)
}

proptest! {
    /// Property: any integer id is accepted and passed through unchanged
    #[test]
    fn prop_integer_ids_accepted(id in any::<i64>()) {
        let kwargs = participant().validate_value(json!({ "participant_id": id })).unwrap();
        prop_assert_eq!(kwargs.get("participant_id"), Some(&json!(id)));
    }

    /// Property: string ids are rejected with the offending field named
    #[test]
    fn prop_string_ids_rejected(id in "[0-9]{1,10}") {
        let err = participant().validate_value(json!({ "participant_id": id })).unwrap_err();
        let is_wrong_type = matches!(err, SchemaError::WrongType { ref field, .. } if field == "participant_id");
        prop_assert!(is_wrong_type);
    }

    /// Property: undeclared fields never reach the handler
    #[test]
    fn prop_extra_fields_dropped(id in any::<i64>(), key in "[a-z]{1,12}", value in any::<i32>()) {
        prop_assume!(key != "participant_id");
        let kwargs = participant()
            .validate_value(json!({ "participant_id": id, key.clone(): value }))
            .unwrap();
        prop_assert_eq!(kwargs.len(), 1);
        prop_assert!(!kwargs.contains_key(&key));
    }

    /// Property: forbidding extras rejects exactly the undeclared keys
    #[test]
    fn prop_forbidden_extras_rejected(key in "[a-z]{1,12}") {
        prop_assume!(key != "participant_id");
        let schema = participant().forbid_extra();
        let err = schema
            .validate_value(json!({ "participant_id": 1, key.clone(): true }))
            .unwrap_err();
        let is_unknown = matches!(err, SchemaError::UnknownField(ref field) if *field == key);
        prop_assert!(is_unknown);
    }
}
