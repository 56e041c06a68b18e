//! Renderability contract
//!
//! The machine-readable statement whether a client may safely render the
//! payload. No declared schema means structure is unconstrained and
//! rendering is allowed; a persisted version outside the dual-read
//! window means the client must not render, even if the bytes look fine.

use serde::{Deserialize, Serialize};

use crate::schema::{Compatibility, DatasetSchema};

/// Renderability statement attached to every response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Renderability {
    pub renderable: bool,
    pub schema_version: Option<String>,
    pub consumer_compatibility: Compatibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Derive the contract from the active schema and the version persisted
/// with the payload.
pub fn derive_renderability(
    active: Option<&DatasetSchema>,
    persisted_version: Option<&str>,
) -> Renderability {
    let Some(active) = active else {
        return Renderability {
            renderable: true,
            schema_version: persisted_version.map(str::to_string),
            consumer_compatibility: Compatibility::Unknown,
            reason: None,
        };
    };

    let Some(persisted) = persisted_version else {
        return Renderability {
            renderable: true,
            schema_version: None,
            consumer_compatibility: Compatibility::Unknown,
            reason: Some("payload carries no schema version".into()),
        };
    };

    match active.compatibility_of(persisted) {
        Compatibility::Compatible => Renderability {
            renderable: true,
            schema_version: Some(persisted.to_string()),
            consumer_compatibility: Compatibility::Compatible,
            reason: None,
        },
        Compatibility::Incompatible => Renderability {
            renderable: false,
            schema_version: Some(persisted.to_string()),
            consumer_compatibility: Compatibility::Incompatible,
            reason: Some(format!(
                "schema {} is outside the dual-read window of {}",
                persisted, active.schema_version
            )),
        },
        Compatibility::Unknown => Renderability {
            renderable: true,
            schema_version: Some(persisted.to_string()),
            consumer_compatibility: Compatibility::Unknown,
            reason: Some("schema version could not be parsed".into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DatasetId;

    fn active_schema() -> DatasetSchema {
        DatasetSchema::new(
            DatasetId::from_raw("0123456789abcdef"),
            "3.0.0",
            vec!["team".into()],
            vec![],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_no_schema_is_renderable_unknown() {
        let contract = derive_renderability(None, Some("1.0.0"));
        assert!(contract.renderable);
        assert_eq!(contract.consumer_compatibility, Compatibility::Unknown);
    }

    #[test]
    fn test_same_major_is_compatible() {
        let schema = active_schema();
        let contract = derive_renderability(Some(&schema), Some("3.4.1"));
        assert!(contract.renderable);
        assert_eq!(contract.consumer_compatibility, Compatibility::Compatible);
    }

    #[test]
    fn test_one_major_behind_is_compatible() {
        let schema = active_schema();
        let contract = derive_renderability(Some(&schema), Some("2.9.0"));
        assert!(contract.renderable);
        assert_eq!(contract.consumer_compatibility, Compatibility::Compatible);
    }

    #[test]
    fn test_outside_window_is_not_renderable() {
        let schema = active_schema();
        let contract = derive_renderability(Some(&schema), Some("1.0.0"));
        assert!(!contract.renderable);
        assert_eq!(contract.consumer_compatibility, Compatibility::Incompatible);
        assert!(contract.reason.is_some());
    }

    #[test]
    fn test_missing_persisted_version_is_unknown() {
        let schema = active_schema();
        let contract = derive_renderability(Some(&schema), None);
        assert!(contract.renderable);
        assert_eq!(contract.consumer_compatibility, Compatibility::Unknown);
    }
}
