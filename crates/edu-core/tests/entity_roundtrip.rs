//! Serde roundtrip and JsonSchema validation tests for entity and result types.

use std::collections::BTreeMap;

use chrono::Utc;
use schemars::schema_for;
use edu_core::audit_detail::{ProxyDetail, StatusChangedDetail};
use edu_core::entities::*;
use edu_core::enums::*;
use edu_core::responses::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(
    entry_roundtrip,
    Entry,
    Entry {
        id: "ent-a3f8b2c1".into(),
        school_id: "sch-001".into(),
        category_id: "cat-teachers".into(),
        column_id: "col-teacher-count".into(),
        value: "25".into(),
        status: EntryStatus::Approved,
        created_by: Some("usr-0000beef".into()),
        approved_by: Some("usr-0000cafe".into()),
        approved_at: Some(Utc::now()),
        rejected_by: None,
        rejected_at: None,
        rejection_reason: None,
        proxy_created_by: Some("usr-0000beef".into()),
        proxy_reason: Some("bulk entry".into()),
        proxy_original_entity: Some("sch-001".into()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    column_roundtrip,
    Column,
    Column {
        id: "col-email".into(),
        category_id: "cat-contacts".into(),
        name: "Director email".into(),
        column_type: ColumnType::Email,
        is_required: true,
        validation: ValidationRules {
            min: None,
            max: None,
            pattern: Some(r"^[^@]+@edu\.gov$".into()),
            unique: true,
            message: Some("Use the official domain".into()),
        },
        options: vec![],
        order_index: 2,
    }
);

roundtrip_and_validate!(
    category_roundtrip,
    Category,
    Category {
        id: "cat-teachers".into(),
        name: "Teachers".into(),
        assignment: CategoryAssignment::Sectors,
        status: CategoryStatus::Active,
    }
);

roundtrip_and_validate!(
    school_roundtrip,
    School,
    School {
        id: "sch-001".into(),
        sector_id: "sec-01".into(),
        region_id: "reg-01".into(),
        name: "School No. 1".into(),
        admin_id: Some("usr-0000beef".into()),
    }
);

roundtrip_and_validate!(
    actor_roundtrip,
    Actor,
    Actor::sector_admin("usr-0000cafe", "sec-01").with_final_approval(true)
);

roundtrip_and_validate!(
    audit_log_entry_roundtrip,
    AuditLogEntry,
    AuditLogEntry {
        id: "aud-deadbeef".into(),
        actor_id: Some("usr-0000cafe".into()),
        action: AuditAction::StatusChanged,
        entity_type: EntityType::DataEntry,
        entity_id: "ent-a3f8b2c1".into(),
        before: Some(serde_json::json!({"status": "pending"})),
        after: Some(serde_json::json!({"status": "sector_approved"})),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    notification_roundtrip,
    Notification,
    Notification {
        id: "ntf-00000001".into(),
        recipient_id: "usr-0000beef".into(),
        notification_type: NotificationType::ProxyDataEntry,
        title: "Data entered on your behalf".into(),
        message: "A sector administrator entered data.".into(),
        related_entity_type: EntityType::Category,
        related_entity_id: "cat-teachers".into(),
        is_read: false,
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    status_changed_detail_roundtrip,
    StatusChangedDetail,
    StatusChangedDetail {
        from: "pending".into(),
        to: "rejected".into(),
        reason: Some("numbers do not match last year".into()),
    }
);

roundtrip_and_validate!(
    proxy_detail_roundtrip,
    ProxyDetail,
    ProxyDetail {
        school_id: "sch-001".into(),
        category_id: "cat-teachers".into(),
        original_entity: "sch-001".into(),
        reason: "bulk entry".into(),
        affected_count: 3,
        auto_approved: false,
    }
);

roundtrip_and_validate!(
    save_result_roundtrip,
    SaveResult,
    SaveResult {
        success: false,
        saved_count: 1,
        field_errors: BTreeMap::from([("col-email".to_string(), "Invalid email address".to_string())]),
        failures: vec![],
        error: Some("1 field(s) failed validation".into()),
    }
);

roundtrip_and_validate!(
    proxy_submit_result_roundtrip,
    ProxySubmitResult,
    ProxySubmitResult {
        success: true,
        submitted_count: 1,
        auto_approved: false,
        failures: vec![RowFailure {
            column_id: "col-2".into(),
            reason: "This field is required".into(),
        }],
        error: None,
    }
);

roundtrip_and_validate!(
    transition_decision_roundtrip,
    TransitionDecision,
    TransitionDecision::deny("scope mismatch")
);
