//! Identity tuple, normalization, and id derivation
//!
//! The dataset id is content-derived: SHA-256 over the canonical JSON of
//! the normalized tuple plus the identity schema version, truncated to 16
//! hex characters. Two runs over the same tuple always produce the same
//! id; two distinct ids can never legitimately claim the same tuple.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::PipelineConfig;

use super::errors::{IdentityError, IdentityResult};

/// Version of the identity canonicalization itself. Bump only when the
/// canonical form changes, which re-keys every dataset.
pub const IDENTITY_SCHEMA_VERSION: u32 = 1;

/// Canonical, hash-derived dataset identifier (16 hex chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    /// Wrap an already-derived id (e.g. read back from a store row)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity tuple addressing a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetIdentity {
    pub sport: String,
    pub competition_level: String,
    pub season: String,
    pub dataset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl DatasetIdentity {
    pub fn new(
        sport: impl Into<String>,
        competition_level: impl Into<String>,
        season: impl Into<String>,
        dataset_type: impl Into<String>,
        qualifier: Option<String>,
    ) -> Self {
        Self {
            sport: sport.into(),
            competition_level: competition_level.into(),
            season: season.into(),
            dataset_type: dataset_type.into(),
            qualifier,
        }
    }

    /// Normalize the tuple: lowercase/trim enumerated fields, drop empty
    /// qualifiers, reject values outside the configured allow-lists.
    pub fn normalize(&self, config: &PipelineConfig) -> IdentityResult<DatasetIdentity> {
        let sport = self.sport.trim().to_lowercase();
        let competition_level = self.competition_level.trim().to_lowercase();
        let season = self.season.trim().to_string();
        let dataset_type = self.dataset_type.trim().to_lowercase();
        let qualifier = self
            .qualifier
            .as_ref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        if sport.is_empty() {
            return Err(IdentityError::EmptyField("sport"));
        }
        if competition_level.is_empty() {
            return Err(IdentityError::EmptyField("competition_level"));
        }
        if season.is_empty() {
            return Err(IdentityError::EmptyField("season"));
        }
        if dataset_type.is_empty() {
            return Err(IdentityError::EmptyField("dataset_type"));
        }

        if !config.allowed_sports.iter().any(|s| s == &sport) {
            return Err(IdentityError::UnknownSport(sport));
        }
        if !config
            .allowed_competition_levels
            .iter()
            .any(|l| l == &competition_level)
        {
            return Err(IdentityError::UnknownCompetitionLevel(competition_level));
        }
        if !config.allowed_dataset_types.iter().any(|t| t == &dataset_type) {
            return Err(IdentityError::UnknownDatasetType(dataset_type));
        }

        Ok(DatasetIdentity {
            sport,
            competition_level,
            season,
            dataset_type,
            qualifier,
        })
    }

    /// Canonical JSON of the normalized tuple: sorted keys, explicit null
    /// qualifier, identity schema version included.
    pub fn canonical_json(&self) -> String {
        let mut map: BTreeMap<&str, Value> = BTreeMap::new();
        map.insert("competition_level", Value::String(self.competition_level.clone()));
        map.insert("dataset_type", Value::String(self.dataset_type.clone()));
        map.insert(
            "identity_version",
            Value::Number(IDENTITY_SCHEMA_VERSION.into()),
        );
        map.insert(
            "qualifier",
            match &self.qualifier {
                Some(q) => Value::String(q.clone()),
                None => Value::Null,
            },
        );
        map.insert("season", Value::String(self.season.clone()));
        map.insert("sport", Value::String(self.sport.clone()));

        // BTreeMap keys serialize in sorted order
        serde_json::to_string(&map).expect("canonical identity map serializes")
    }

    /// Derive the dataset id. Returns the id and the canonical JSON it
    /// was computed over so callers can persist both.
    pub fn compute_dataset_id(&self) -> (DatasetId, String) {
        let canonical = self.canonical_json();
        let digest = Sha256::digest(canonical.as_bytes());
        (DatasetId(hex_prefix(&digest, 16)), canonical)
    }

    /// Byte-for-byte comparison against another identity. The first
    /// mismatching field is reported.
    pub fn assert_matches(
        &self,
        other: &DatasetIdentity,
        dataset_id: &DatasetId,
    ) -> IdentityResult<()> {
        let pairs: [(&'static str, &str, &str); 4] = [
            ("sport", &self.sport, &other.sport),
            ("competition_level", &self.competition_level, &other.competition_level),
            ("season", &self.season, &other.season),
            ("dataset_type", &self.dataset_type, &other.dataset_type),
        ];
        for (field, expected, found) in pairs {
            if expected != found {
                return Err(IdentityError::Violation {
                    dataset_id: dataset_id.to_string(),
                    field,
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
        }
        if self.qualifier != other.qualifier {
            return Err(IdentityError::Violation {
                dataset_id: dataset_id.to_string(),
                field: "qualifier",
                expected: self.qualifier.clone().unwrap_or_default(),
                found: other.qualifier.clone().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// First `chars` hex characters of a digest
pub fn hex_prefix(digest: &[u8], chars: usize) -> String {
    let mut out = String::with_capacity(chars);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
        if out.len() >= chars {
            break;
        }
    }
    out.truncate(chars);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DatasetIdentity {
        DatasetIdentity::new("baseball", "mlb", "2026", "rankings", None)
    }

    #[test]
    fn test_id_is_deterministic() {
        let (a, canonical_a) = identity().compute_dataset_id();
        let (b, canonical_b) = identity().compute_dataset_id();
        assert_eq!(a, b);
        assert_eq!(canonical_a, canonical_b);
        assert_eq!(a.as_str().len(), 16);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_qualifier_changes_id() {
        let (base, _) = identity().compute_dataset_id();
        let qualified = DatasetIdentity::new(
            "baseball",
            "mlb",
            "2026",
            "rankings",
            Some("american-league".into()),
        );
        let (other, _) = qualified.compute_dataset_id();
        assert_ne!(base, other);
    }

    #[test]
    fn test_normalize_lowercases_and_trims() {
        let config = PipelineConfig::default();
        let raw = DatasetIdentity::new(" Baseball ", "MLB", " 2026", "Rankings", Some("  ".into()));
        let normalized = raw.normalize(&config).unwrap();
        assert_eq!(normalized.sport, "baseball");
        assert_eq!(normalized.competition_level, "mlb");
        assert_eq!(normalized.season, "2026");
        assert_eq!(normalized.qualifier, None);
    }

    #[test]
    fn test_normalize_rejects_unknown_sport() {
        let config = PipelineConfig::default();
        let raw = DatasetIdentity::new("curling", "mlb", "2026", "rankings", None);
        assert!(matches!(
            raw.normalize(&config),
            Err(IdentityError::UnknownSport(_))
        ));
    }

    #[test]
    fn test_assert_matches_reports_first_mismatch() {
        let a = identity();
        let mut b = identity();
        b.season = "2025".into();
        let (id, _) = a.compute_dataset_id();

        let err = a.assert_matches(&b, &id).unwrap_err();
        match err {
            IdentityError::Violation { field, .. } => assert_eq!(field, "season"),
            other => panic!("expected Violation, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical_json_sorted_keys() {
        let canonical = identity().canonical_json();
        let competition = canonical.find("competition_level").unwrap();
        let sport = canonical.find("sport").unwrap();
        assert!(competition < sport);
    }
}
