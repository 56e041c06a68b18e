//! Read outcomes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::LifecycleState;
use crate::identity::DatasetId;
use crate::serve::{ApiError, Renderability, WireDirective};
use crate::validation::ValidationStatus;

/// Where the served payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadSource {
    Kv,
    ObjectStore,
    None,
}

impl ReadSource {
    /// Header value for `X-Data-Source`
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadSource::Kv => "kv",
            ReadSource::ObjectStore => "object-store",
            ReadSource::None => "none",
        }
    }
}

/// Everything a handler needs to emit one wire-correct response
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub dataset_id: Option<DatasetId>,
    pub directive: WireDirective,
    pub lifecycle: LifecycleState,
    pub validation: Option<ValidationStatus>,
    pub renderability: Renderability,
    pub data: Option<Vec<Value>>,
    pub record_count: usize,
    pub version: Option<u64>,
    pub source: ReadSource,
    pub is_serving_lkg: bool,
    /// Payload predates the safety envelope
    pub legacy: bool,
    pub error: Option<ApiError>,
}
