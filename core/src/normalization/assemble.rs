use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use log::debug;

use crate::attributes::tags;
use crate::attributes::{multi_f64_value, pixel_data_bytes, string_value, string_value_or, u16_value};
use crate::error::{MfnormError, Result};
use crate::normalization::sort::SliceDistance;
use crate::normalization::{decimals, sequence, Context};
use crate::types::{uids, Dataset, DiagnosticKind};

/// Attributes copied verbatim from the reference slice onto the derived
/// multi-frame dataset: identity and pixel-module scalars the downstream
/// volume builder reads at the dataset level.
const REFERENCE_TAGS: [Tag; 18] = [
    tags::SOP_CLASS_UID,
    tags::MODALITY,
    tags::ROWS,
    tags::COLUMNS,
    tags::BITS_ALLOCATED,
    tags::PIXEL_REPRESENTATION,
    tags::PATIENT_NAME,
    tags::PATIENT_ID,
    tags::PATIENT_BIRTH_DATE,
    tags::PATIENT_SEX,
    tags::STUDY_INSTANCE_UID,
    tags::STUDY_ID,
    tags::ACCESSION_NUMBER,
    tags::STUDY_DATE,
    tags::STUDY_TIME,
    tags::SERIES_INSTANCE_UID,
    tags::SERIES_NUMBER,
    tags::FRAME_OF_REFERENCE_UID,
];

/// Assembles one multi-frame dataset from slices in sorted order
///
/// Allocates the contiguous pixel buffer, copies each slice's pixel bytes
/// into its frame slot, and derives the shared and per-frame functional
/// groups plus the dimension organization.
pub(crate) fn derive_multiframe(
    sorted: &[SliceDistance<'_>],
    datasets: &[Dataset],
    ctx: &mut Context<'_>,
) -> Result<Dataset> {
    let reference = &datasets[0];
    let frame_count = sorted.len();
    let mut ds = Dataset::new_empty();

    // fill in only those elements required to make a valid image
    // for volumetric processing
    for tag in REFERENCE_TAGS {
        if let Ok(element) = reference.element(tag) {
            ds.put(element.clone());
        }
    }
    ds.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(uids::new_uid()),
    ));
    ds.put(DataElement::new(
        tags::RESCALE_SLOPE,
        VR::DS,
        PrimitiveValue::from(string_value_or(reference, tags::RESCALE_SLOPE, "1")),
    ));
    ds.put(DataElement::new(
        tags::RESCALE_INTERCEPT,
        VR::DS,
        PrimitiveValue::from(string_value_or(reference, tags::RESCALE_INTERCEPT, "0")),
    ));
    ds.put(DataElement::new(
        tags::NUMBER_OF_FRAMES,
        VR::IS,
        PrimitiveValue::from(frame_count as i32),
    ));

    if !ctx.variant.is_ultrasound() {
        let bits_allocated = u16_value(reference, tags::BITS_ALLOCATED).unwrap_or(0);
        if bits_allocated != 16 {
            ctx.flag(
                DiagnosticKind::BitsAllocatedMismatch,
                format!(
                    "only works with 16 bit data, not {} bits allocated",
                    bits_allocated
                ),
                || MfnormError::BitsAllocatedMismatch { bits_allocated },
            )?;
        }
        if frame_count < 2 {
            ctx.note(
                DiagnosticKind::SingleSliceDerivation,
                "cannot measure slice spacing without multiple frames",
            );
        }
    }

    ds.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U8(assemble_pixel_buffer(sorted, reference, ctx)?.into()),
    ));

    // sorted-first slice anchors the shared geometry
    let nearest = &sorted[0];
    let second_distance = sorted.get(1).map_or(1.0, |s| s.distance);
    let spacing_between_slices = (second_distance - nearest.distance).abs();
    debug!(
        "derived {} frames, slice spacing {}",
        frame_count, spacing_between_slices
    );

    let mut shared = Dataset::new_empty();
    if let Some(orientation) = multi_f64_value(nearest.dataset, tags::IMAGE_ORIENTATION_PATIENT) {
        shared.put(sequence(
            tags::PLANE_ORIENTATION_SEQUENCE,
            vec![Dataset::from_element_iter([decimals(
                tags::IMAGE_ORIENTATION_PATIENT,
                orientation,
            )])],
        ));
    }
    let mut pixel_measures = Dataset::new_empty();
    if let Some(pixel_spacing) = multi_f64_value(nearest.dataset, tags::PIXEL_SPACING) {
        pixel_measures.put(decimals(tags::PIXEL_SPACING, pixel_spacing));
    }
    pixel_measures.put(DataElement::new(
        tags::SPACING_BETWEEN_SLICES,
        VR::DS,
        PrimitiveValue::from(spacing_between_slices),
    ));
    pixel_measures.put(DataElement::new(
        tags::SLICE_THICKNESS,
        VR::DS,
        PrimitiveValue::from(spacing_between_slices),
    ));
    shared.put(sequence(tags::PIXEL_MEASURES_SEQUENCE, vec![pixel_measures]));
    ds.put(sequence(tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE, vec![shared]));

    ds.put(sequence(
        tags::REFERENCED_SERIES_SEQUENCE,
        vec![referenced_series(sorted, nearest.dataset)],
    ));
    ds.put(sequence(
        tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
        per_frame_groups(sorted),
    ));

    let dimension_uid = uids::new_uid();
    ds.put(sequence(
        tags::DIMENSION_ORGANIZATION_SEQUENCE,
        vec![Dataset::from_element_iter([DataElement::new(
            tags::DIMENSION_ORGANIZATION_UID,
            VR::UI,
            PrimitiveValue::from(dimension_uid.clone()),
        )])],
    ));
    // a single spatial dimension, indexed by plane position
    ds.put(sequence(
        tags::DIMENSION_INDEX_SEQUENCE,
        vec![Dataset::from_element_iter([
            DataElement::new(
                tags::DIMENSION_ORGANIZATION_UID,
                VR::UI,
                PrimitiveValue::from(dimension_uid),
            ),
            DataElement::new(
                tags::DIMENSION_INDEX_POINTER,
                VR::AT,
                PrimitiveValue::Tags(vec![tags::IMAGE_POSITION_PATIENT].into()),
            ),
            DataElement::new(
                tags::FUNCTIONAL_GROUP_POINTER,
                VR::AT,
                PrimitiveValue::Tags(vec![tags::PLANE_POSITION_SEQUENCE].into()),
            ),
            DataElement::new(
                tags::DIMENSION_DESCRIPTION_LABEL,
                VR::LO,
                PrimitiveValue::from("ImagePositionPatient"),
            ),
        ])],
    ));

    Ok(ds)
}

/// Allocates the output buffer and copies every slice's pixel bytes into
/// its frame slot, in sorted order
fn assemble_pixel_buffer(
    sorted: &[SliceDistance<'_>],
    reference: &Dataset,
    ctx: &mut Context<'_>,
) -> Result<Vec<u8>> {
    let frame_size = pixel_data_bytes(reference).map_or(0, |bytes| bytes.len());
    let requested = sorted.len() as u128 * frame_size as u128;
    let limit = ctx.options.max_pixel_buffer_bytes.unwrap_or(u64::MAX);
    if requested > u128::from(limit) {
        return Err(MfnormError::PixelBufferTooLarge {
            requested: requested.min(u128::from(u64::MAX)) as u64,
            limit,
        });
    }

    let mut buffer = vec![0_u8; requested as usize];
    for (frame, slice) in sorted.iter().enumerate() {
        let bytes = pixel_data_bytes(slice.dataset).unwrap_or_default();
        if bytes.len() != frame_size {
            return Err(MfnormError::FrameSizeMismatch {
                frame,
                expected: frame_size,
                actual: bytes.len(),
            });
        }
        buffer[frame * frame_size..(frame + 1) * frame_size].copy_from_slice(&bytes);
    }
    Ok(buffer)
}

/// One ReferencedSeriesSequence item listing every source instance in
/// sorted order
fn referenced_series(sorted: &[SliceDistance<'_>], nearest: &Dataset) -> Dataset {
    let mut item = Dataset::new_empty();
    if let Some(series_uid) = string_value(nearest, tags::SERIES_INSTANCE_UID) {
        item.put(DataElement::new(
            tags::SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(series_uid),
        ));
    }
    let instances = sorted
        .iter()
        .map(|slice| {
            Dataset::from_element_iter([
                DataElement::new(
                    tags::REFERENCED_SOP_CLASS_UID,
                    VR::UI,
                    PrimitiveValue::from(string_value_or(slice.dataset, tags::SOP_CLASS_UID, "")),
                ),
                DataElement::new(
                    tags::REFERENCED_SOP_INSTANCE_UID,
                    VR::UI,
                    PrimitiveValue::from(string_value_or(
                        slice.dataset,
                        tags::SOP_INSTANCE_UID,
                        "",
                    )),
                ),
            ])
        })
        .collect();
    item.put(sequence(tags::REFERENCED_INSTANCE_SEQUENCE, instances));
    item
}

/// Per-frame functional groups in sorted order: plane position always,
/// frame VOI LUT when the slice carries window values
fn per_frame_groups(sorted: &[SliceDistance<'_>]) -> Vec<Dataset> {
    sorted
        .iter()
        .map(|slice| {
            let mut item = Dataset::new_empty();
            if let Some(position) = multi_f64_value(slice.dataset, tags::IMAGE_POSITION_PATIENT) {
                item.put(sequence(
                    tags::PLANE_POSITION_SEQUENCE,
                    vec![Dataset::from_element_iter([decimals(
                        tags::IMAGE_POSITION_PATIENT,
                        position,
                    )])],
                ));
            }
            let center = multi_f64_value(slice.dataset, tags::WINDOW_CENTER);
            let width = multi_f64_value(slice.dataset, tags::WINDOW_WIDTH);
            if let (Some(center), Some(width)) = (center, width) {
                item.put(sequence(
                    tags::FRAME_VOI_LUT_SEQUENCE,
                    vec![Dataset::from_element_iter([
                        decimals(tags::WINDOW_CENTER, center),
                        decimals(tags::WINDOW_WIDTH, width),
                    ])],
                ));
            }
            item
        })
        .collect()
}
