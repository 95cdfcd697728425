//! Capture-to-row mapping.
//!
//! # Responsibility
//! - Turn each of the three capture shapes into `BiometricRecordRow`s.
//!
//! # Invariants
//! - Float quality scores are truncated toward zero, never rounded.
//! - A template without subtype tags maps to the face attribute.
//! - Every produced row is active and stamped with the same user and time.

use crate::error::OnboardCause;
use crate::model::biometric::{
    narrow_quality, truncate_quality, AttributeError, BiometricAttribute, BiometricRecordRow,
    BiometricType, UserBiometricId,
};
use crate::model::capture::{Bir, BiometricDto, BiometricRecord, BiometricsDto};
use crate::packet::PacketSerializer;

/// Audit values shared by all rows of one save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowStamp<'a> {
    pub user_id: &'a str,
    pub created_at: i64,
}

impl RowStamp<'_> {
    fn row(
        &self,
        attribute_code: &str,
        type_code: BiometricType,
        iso_image: &[u8],
        quality_score: i32,
        retry_count: Option<u32>,
    ) -> BiometricRecordRow {
        BiometricRecordRow {
            id: UserBiometricId {
                user_id: self.user_id.to_string(),
                attribute_code: attribute_code.to_string(),
                type_code,
            },
            iso_image: iso_image.to_vec(),
            raw_record: None,
            quality_score,
            retry_count,
            created_by: self.user_id.to_string(),
            created_at: self.created_at,
            is_active: true,
        }
    }
}

/// Maps the structured operator capture.
///
/// Fingerprints contribute their segmented prints only, keyed by image name.
/// Irises are keyed by image name. The face, when captured, is keyed as
/// `face`.
pub fn map_biometric_dto(dto: &BiometricDto, stamp: &RowStamp<'_>) -> Vec<BiometricRecordRow> {
    let operator = &dto.operator;
    let mut rows = Vec::new();

    for print in operator
        .fingerprints
        .iter()
        .flat_map(|slab| slab.segmented.iter())
    {
        rows.push(stamp.row(
            &print.image_name,
            BiometricType::Finger,
            &print.iso_image,
            truncate_quality(print.quality_score),
            Some(print.num_retry),
        ));
    }

    for iris in &operator.irises {
        rows.push(stamp.row(
            &iris.image_name,
            BiometricType::Iris,
            &iris.iso_image,
            truncate_quality(iris.quality_score),
            Some(iris.num_retry),
        ));
    }

    if let Some(face) = &operator.face {
        rows.push(stamp.row(
            BiometricAttribute::Face.name(),
            BiometricType::Face,
            &face.iso_image,
            truncate_quality(face.quality_score),
            Some(face.num_retry),
        ));
    }

    rows
}

/// Maps the flat capture list.
///
/// Attribute names are canonicalized through the attribute table, which also
/// supplies the type code.
pub fn map_biometric_captures(
    captures: &[BiometricsDto],
    stamp: &RowStamp<'_>,
) -> Result<Vec<BiometricRecordRow>, AttributeError> {
    captures
        .iter()
        .map(|capture| -> Result<BiometricRecordRow, AttributeError> {
            let attribute = BiometricAttribute::from_name(&capture.attribute)?;
            Ok(stamp.row(
                attribute.name(),
                attribute.biometric_type(),
                &capture.attribute_iso,
                truncate_quality(capture.quality_score),
                Some(capture.num_retries),
            ))
        })
        .collect()
}

/// Maps extracted templates, attaching each template's serialized record.
pub fn map_extracted_templates<P: PacketSerializer>(
    templates: &[Bir],
    stamp: &RowStamp<'_>,
    serializer: &P,
) -> Result<Vec<BiometricRecordRow>, OnboardCause> {
    let mut rows = Vec::with_capacity(templates.len());
    for template in templates {
        let attribute = BiometricAttribute::from_subtypes(&template.bdb_info.subtype)?;
        let mut row = stamp.row(
            attribute.name(),
            attribute.biometric_type(),
            &template.bdb,
            narrow_quality(template.bdb_info.quality.score),
            None,
        );
        row.raw_record = Some(serializer.to_raw_record(&BiometricRecord::single(template))?);
        rows.push(row);
    }
    Ok(rows)
}
