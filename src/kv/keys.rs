//! KV key derivation
//!
//! Layout per dataset:
//! - `<prefix>:<datasetId>:v<N>` holds the versioned envelope blob
//! - `<prefix>:<datasetId>:current` holds the pointer string `v<N>`

use crate::identity::DatasetId;

/// Key prefix for one dataset
pub fn dataset_prefix(kv_prefix: &str, dataset_id: &DatasetId) -> String {
    format!("{}:{}", kv_prefix, dataset_id)
}

/// Versioned blob key
pub fn versioned_key(prefix: &str, version: u64) -> String {
    format!("{}:v{}", prefix, version)
}

/// Pointer key
pub fn pointer_key(prefix: &str) -> String {
    format!("{}:current", prefix)
}

/// Pointer value for a version
pub fn pointer_value(version: u64) -> String {
    format!("v{}", version)
}

/// Parse a pointer value back to a version number
pub fn parse_pointer(value: &str) -> Option<u64> {
    value.strip_prefix('v')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        let id = DatasetId::from_raw("0123456789abcdef");
        let prefix = dataset_prefix("statgate", &id);
        assert_eq!(prefix, "statgate:0123456789abcdef");
        assert_eq!(versioned_key(&prefix, 7), "statgate:0123456789abcdef:v7");
        assert_eq!(pointer_key(&prefix), "statgate:0123456789abcdef:current");
    }

    #[test]
    fn test_pointer_round_trip() {
        assert_eq!(parse_pointer(&pointer_value(12)), Some(12));
        assert_eq!(parse_pointer("v0"), Some(0));
        assert_eq!(parse_pointer("current"), None);
        assert_eq!(parse_pointer("vx"), None);
    }
}
