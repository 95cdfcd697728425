//! Biometric row model and attribute lookup table.
//!
//! # Responsibility
//! - Define `BiometricRecordRow` and its composite identity.
//! - Map attribute names and BIR subtype names onto `BiometricType`.
//!
//! # Invariants
//! - At most one active row exists per `UserBiometricId`.
//! - `BiometricType` values persist as their variant name.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Modality of a captured biometric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BiometricType {
    Finger,
    Iris,
    Face,
}

impl BiometricType {
    /// Code stored in `user_biometric.bmtyp_code`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Finger => "Finger",
            Self::Iris => "Iris",
            Self::Face => "Face",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "Finger" => Some(Self::Finger),
            "Iris" => Some(Self::Iris),
            "Face" => Some(Self::Face),
            _ => None,
        }
    }
}

impl Display for BiometricType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Known biometric attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiometricAttribute {
    LeftThumb,
    LeftIndex,
    LeftMiddle,
    LeftRing,
    LeftLittle,
    RightThumb,
    RightIndex,
    RightMiddle,
    RightRing,
    RightLittle,
    LeftEye,
    RightEye,
    Face,
}

/// Subtype name used when a template carries no subtype tags.
pub const DEFAULT_SUBTYPE: &str = "Face";

/// (attribute, attribute name, joined BIR subtype name)
const ATTRIBUTE_TABLE: &[(BiometricAttribute, &str, &str)] = &[
    (BiometricAttribute::LeftThumb, "leftThumb", "LeftThumb"),
    (BiometricAttribute::LeftIndex, "leftIndex", "LeftIndexFinger"),
    (BiometricAttribute::LeftMiddle, "leftMiddle", "LeftMiddleFinger"),
    (BiometricAttribute::LeftRing, "leftRing", "LeftRingFinger"),
    (BiometricAttribute::LeftLittle, "leftLittle", "LeftLittleFinger"),
    (BiometricAttribute::RightThumb, "rightThumb", "RightThumb"),
    (BiometricAttribute::RightIndex, "rightIndex", "RightIndexFinger"),
    (BiometricAttribute::RightMiddle, "rightMiddle", "RightMiddleFinger"),
    (BiometricAttribute::RightRing, "rightRing", "RightRingFinger"),
    (BiometricAttribute::RightLittle, "rightLittle", "RightLittleFinger"),
    (BiometricAttribute::LeftEye, "leftEye", "Left"),
    (BiometricAttribute::RightEye, "rightEye", "Right"),
    (BiometricAttribute::Face, "face", "Face"),
];

impl BiometricAttribute {
    /// Attribute code stored in `user_biometric.bmatt_code`.
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Joined BIR subtype name for this attribute.
    pub fn subtype(self) -> &'static str {
        self.entry().2
    }

    pub fn biometric_type(self) -> BiometricType {
        match self {
            Self::LeftEye | Self::RightEye => BiometricType::Iris,
            Self::Face => BiometricType::Face,
            _ => BiometricType::Finger,
        }
    }

    /// Looks up an attribute by its name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Result<Self, AttributeError> {
        let name = name.trim();
        ATTRIBUTE_TABLE
            .iter()
            .find(|(_, attribute_name, _)| attribute_name.eq_ignore_ascii_case(name))
            .map(|(attribute, _, _)| *attribute)
            .ok_or_else(|| AttributeError::UnknownAttribute(name.to_string()))
    }

    /// Resolves the attribute for a list of BIR subtype tags.
    ///
    /// Tags are joined without separator; an empty list resolves to
    /// [`DEFAULT_SUBTYPE`].
    pub fn from_subtypes<S: AsRef<str>>(subtypes: &[S]) -> Result<Self, AttributeError> {
        let joined = if subtypes.is_empty() {
            DEFAULT_SUBTYPE.to_string()
        } else {
            subtypes.iter().map(|tag| tag.as_ref().trim()).collect()
        };

        ATTRIBUTE_TABLE
            .iter()
            .find(|(_, _, subtype)| subtype.eq_ignore_ascii_case(&joined))
            .map(|(attribute, _, _)| *attribute)
            .ok_or(AttributeError::UnknownSubtype(joined))
    }

    // Table rows follow declaration order.
    fn entry(self) -> &'static (BiometricAttribute, &'static str, &'static str) {
        &ATTRIBUTE_TABLE[self as usize]
    }
}

/// Attribute lookup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    UnknownAttribute(String),
    UnknownSubtype(String),
}

impl Display for AttributeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAttribute(name) => write!(f, "unknown biometric attribute `{name}`"),
            Self::UnknownSubtype(name) => write!(f, "unknown biometric subtype `{name}`"),
        }
    }
}

impl Error for AttributeError {}

/// Composite identity of a `user_biometric` row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserBiometricId {
    pub user_id: String,
    pub attribute_code: String,
    pub type_code: BiometricType,
}

/// One persisted biometric sample for an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricRecordRow {
    pub id: UserBiometricId,
    /// ISO-encoded sample.
    pub iso_image: Vec<u8>,
    /// Serialized single-segment record; only set for extracted templates.
    pub raw_record: Option<Vec<u8>>,
    pub quality_score: i32,
    pub retry_count: Option<u32>,
    pub created_by: String,
    /// Epoch ms, UTC.
    pub created_at: i64,
    pub is_active: bool,
}

/// Truncates a measured quality score toward zero.
///
/// `87.9` becomes `87`; NaN becomes `0` and out-of-range values saturate.
pub fn truncate_quality(score: f64) -> i32 {
    score as i32
}

/// Narrows an integer template score, saturating at the `i32` bounds.
pub fn narrow_quality(score: i64) -> i32 {
    i32::try_from(score).unwrap_or(if score < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::{
        narrow_quality, truncate_quality, AttributeError, BiometricAttribute, BiometricType,
    };

    #[test]
    fn quality_is_truncated_not_rounded() {
        assert_eq!(truncate_quality(87.9), 87);
        assert_eq!(truncate_quality(87.1), 87);
        assert_eq!(truncate_quality(-3.7), -3);
        assert_eq!(truncate_quality(f64::NAN), 0);
    }

    #[test]
    fn integer_quality_saturates() {
        assert_eq!(narrow_quality(90), 90);
        assert_eq!(narrow_quality(i64::MAX), i32::MAX);
        assert_eq!(narrow_quality(i64::MIN), i32::MIN);
    }

    #[test]
    fn attribute_names_resolve_case_insensitively() {
        let attribute = BiometricAttribute::from_name("LEFTINDEX").unwrap();
        assert_eq!(attribute, BiometricAttribute::LeftIndex);
        assert_eq!(attribute.biometric_type(), BiometricType::Finger);
        assert_eq!(
            BiometricAttribute::from_name("rightEye")
                .unwrap()
                .biometric_type(),
            BiometricType::Iris
        );
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let err = BiometricAttribute::from_name("leftToe").unwrap_err();
        assert_eq!(err, AttributeError::UnknownAttribute("leftToe".to_string()));
    }

    #[test]
    fn subtypes_are_joined_before_lookup() {
        let attribute = BiometricAttribute::from_subtypes(&["Right", "MiddleFinger"]).unwrap();
        assert_eq!(attribute, BiometricAttribute::RightMiddle);
        assert_eq!(
            BiometricAttribute::from_subtypes(&["Left"]).unwrap(),
            BiometricAttribute::LeftEye
        );
    }

    #[test]
    fn empty_subtypes_default_to_face() {
        let empty: [&str; 0] = [];
        let attribute = BiometricAttribute::from_subtypes(&empty).unwrap();
        assert_eq!(attribute, BiometricAttribute::Face);
        assert_eq!(attribute.name(), "face");
    }

    #[test]
    fn every_attribute_round_trips_through_its_name_and_subtype() {
        for attribute in [
            BiometricAttribute::LeftThumb,
            BiometricAttribute::RightLittle,
            BiometricAttribute::LeftEye,
            BiometricAttribute::Face,
        ] {
            assert_eq!(BiometricAttribute::from_name(attribute.name()), Ok(attribute));
            assert_eq!(
                BiometricAttribute::from_subtypes(&[attribute.subtype()]),
                Ok(attribute)
            );
        }
    }

    #[test]
    fn table_rows_follow_declaration_order() {
        for (index, (attribute, _, _)) in super::ATTRIBUTE_TABLE.iter().enumerate() {
            assert_eq!(*attribute as usize, index);
        }
    }

    #[test]
    fn type_codes_parse_back() {
        for kind in [BiometricType::Finger, BiometricType::Iris, BiometricType::Face] {
            assert_eq!(BiometricType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(BiometricType::from_code("FIN"), None);
    }
}
