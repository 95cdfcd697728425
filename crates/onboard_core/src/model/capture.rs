//! Capture-side inputs handed over by the device pipeline.
//!
//! # Responsibility
//! - Describe the three shapes an onboarding save can arrive in: the
//!   structured operator DTO, the flat capture list, and extracted templates.
//! - Describe the single-segment record wrapped around a template before it is
//!   serialized into `user_biometric.bio_raw_image`.
//!
//! Quality scores here are raw measurements; truncation happens in the mapper.

use crate::model::biometric::BiometricType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured onboarding capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricDto {
    pub operator: OperatorBiometricDto,
}

/// Per-modality captures for one operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorBiometricDto {
    /// Fingerprint slabs; only their segmented prints are persisted.
    #[serde(default)]
    pub fingerprints: Vec<FingerprintDetailsDto>,
    #[serde(default)]
    pub irises: Vec<IrisDetailsDto>,
    #[serde(default)]
    pub face: Option<FaceDetailsDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintDetailsDto {
    pub image_name: String,
    #[serde(default)]
    pub iso_image: Vec<u8>,
    pub quality_score: f64,
    #[serde(default)]
    pub num_retry: u32,
    #[serde(default)]
    pub segmented: Vec<FingerprintDetailsDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrisDetailsDto {
    pub image_name: String,
    #[serde(default)]
    pub iso_image: Vec<u8>,
    pub quality_score: f64,
    #[serde(default)]
    pub num_retry: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetailsDto {
    #[serde(default)]
    pub iso_image: Vec<u8>,
    pub quality_score: f64,
    #[serde(default)]
    pub num_retry: u32,
}

/// One entry of the flat capture list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricsDto {
    /// Attribute name, e.g. `leftIndex`.
    pub attribute: String,
    #[serde(default)]
    pub attribute_iso: Vec<u8>,
    pub quality_score: f64,
    #[serde(default)]
    pub num_retries: u32,
}

/// Biometric information record: one extracted template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bir {
    /// Biometric data block.
    pub bdb: Vec<u8>,
    pub bdb_info: BdbInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BdbInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_type: Option<BiometricType>,
    /// Subtype tags such as `["Left", "IndexFinger"]`; may be empty.
    #[serde(default)]
    pub subtype: Vec<String>,
    pub quality: QualityType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityType {
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

/// Container serialized into the raw record column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricRecord {
    pub segments: Vec<Bir>,
    pub others: BTreeMap<String, String>,
}

impl BiometricRecord {
    /// Wraps one template as the only segment, with no extra attributes.
    pub fn single(template: &Bir) -> Self {
        Self {
            segments: vec![template.clone()],
            others: BTreeMap::new(),
        }
    }
}

impl Bir {
    /// Convenience constructor used by callers holding already-extracted data.
    pub fn new(bdb: Vec<u8>, subtype: Vec<String>, score: i64) -> Self {
        Self {
            bdb,
            bdb_info: BdbInfo {
                biometric_type: None,
                subtype,
                quality: QualityType {
                    score,
                    algorithm: None,
                },
            },
        }
    }
}
