//! Client response envelope
//!
//! Carried by every endpoint that surfaces core data. Meta keys are
//! camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::LifecycleState;
use crate::validation::ValidationStatus;

use super::renderability::Renderability;

/// Top-level response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Invalid,
    Unavailable,
}

impl From<ValidationStatus> for ResponseStatus {
    fn from(status: ValidationStatus) -> Self {
        match status {
            ValidationStatus::Valid => ResponseStatus::Ok,
            ValidationStatus::Invalid => ResponseStatus::Invalid,
            ValidationStatus::Unavailable => ResponseStatus::Unavailable,
        }
    }
}

/// Cache block of the response meta
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    pub hit: bool,
    pub ttl_seconds: u32,
    pub eligible: bool,
}

/// Quota block of the response meta
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaMeta {
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
}

/// Response meta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub cache: CacheMeta,
    pub quota: QuotaMeta,
    pub lifecycle: LifecycleState,
    pub renderability: Renderability,
}

/// Error block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Full response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    pub status: ResponseStatus,
    pub data: Option<Vec<T>>,
    pub meta: ResponseMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Compatibility;

    #[test]
    fn test_meta_serializes_camel_case() {
        let meta = ResponseMeta {
            cache: CacheMeta {
                hit: false,
                ttl_seconds: 300,
                eligible: true,
            },
            quota: QuotaMeta {
                remaining: 950,
                reset_at: Utc::now(),
            },
            lifecycle: LifecycleState::Live,
            renderability: Renderability {
                renderable: true,
                schema_version: Some("2.0.0".into()),
                consumer_compatibility: Compatibility::Compatible,
                reason: None,
            },
        };

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"ttlSeconds\":300"));
        assert!(json.contains("\"resetAt\""));
        assert!(json.contains("\"schemaVersion\""));
        assert!(json.contains("\"consumerCompatibility\":\"compatible\""));
        assert!(json.contains("\"lifecycle\":\"live\""));
    }

    #[test]
    fn test_status_from_validation() {
        assert_eq!(
            ResponseStatus::from(ValidationStatus::Valid),
            ResponseStatus::Ok
        );
        assert_eq!(
            ResponseStatus::from(ValidationStatus::Unavailable),
            ResponseStatus::Unavailable
        );
    }
}
