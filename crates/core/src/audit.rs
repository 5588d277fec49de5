//! Audit trail constants and utility functions (PRD-14).
//!
//! Every mutating operation writes an audit row; failed mutations are
//! recorded with status `failure` before the error is surfaced to the
//! caller. This module holds the shared vocabulary and the sensitive-field
//! redaction applied to detail payloads.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known action values for audit entries.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const SUSPEND: &str = "suspend";
    pub const REACTIVATE: &str = "reactivate";
    pub const INVITE: &str = "invite";
    pub const ACCEPT_INVITATION: &str = "accept_invitation";
    pub const SUBMIT_DECISION: &str = "submit_decision";
    pub const RECORD_SIGNAL: &str = "record_signal";
    pub const STATUS_CHANGE: &str = "status_change";
    pub const TIER_CHANGE: &str = "tier_change";
    pub const LOGIN: &str = "login";
    pub const REVOKE: &str = "revoke";
}

// ---------------------------------------------------------------------------
// Outcome status
// ---------------------------------------------------------------------------

/// Whether the audited operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Success,
    Failure,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "success",
            AuditStatus::Failure => "failure",
        }
    }
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Fields that should be redacted from audit details before storage.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "access_token",
    "refresh_token",
    "api_key",
    "private_key",
    "authorization",
    "credential",
];

/// Redact sensitive fields from a JSON value.
///
/// Replaces the value of any key containing a [`SENSITIVE_FIELDS`] substring
/// with `"[REDACTED]"`, recursing into nested objects and arrays.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_field() {
        let input = serde_json::json!({"email": "alice@example.com", "password": "s3cret"});
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["email"], "alice@example.com");
        assert_eq!(result["password"], "[REDACTED]");
    }

    #[test]
    fn redacts_token_field() {
        let input = serde_json::json!({"invitation_token": "abc123", "role": "viewer"});
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["invitation_token"], "[REDACTED]");
        assert_eq!(result["role"], "viewer");
    }

    #[test]
    fn handles_nested_objects() {
        let input = serde_json::json!({"outer": {"api_key": "hidden", "name": "test"}});
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["outer"]["api_key"], "[REDACTED]");
        assert_eq!(result["outer"]["name"], "test");
    }

    #[test]
    fn handles_arrays() {
        let input = serde_json::json!([{"secret": "hidden"}, {"data": "visible"}]);
        let result = redact_sensitive_fields(&input);
        assert_eq!(result[0]["secret"], "[REDACTED]");
        assert_eq!(result[1]["data"], "visible");
    }

    #[test]
    fn non_object_values_unchanged() {
        let input = serde_json::json!("plain_string");
        assert_eq!(redact_sensitive_fields(&input), "plain_string");
    }

    #[test]
    fn status_strings() {
        assert_eq!(AuditStatus::Success.as_str(), "success");
        assert_eq!(AuditStatus::Failure.as_str(), "failure");
    }
}
