use dicom_core::{DataElement, PrimitiveValue, VR};

use crate::attributes::tags;
use crate::attributes::{multi_string_value, u16_value};
use crate::error::{MfnormError, Result};
use crate::normalization::{sequence, update_shared_group, Context};
use crate::types::{uids, Dataset, DiagnosticKind, NormalizerVariant};

/// Final per-variant overrides, applied after assembly and the invariant pass
///
/// Single-frame acquisitions are re-labeled with their multi-frame SOP class;
/// MR additionally derives the shared frame type; parametric maps are
/// validated for 32-bit samples. The enhanced/multi-frame variants are
/// already in their target form and pass through unchanged.
pub(crate) fn apply(ds: &mut Dataset, inputs: &[Dataset], ctx: &mut Context<'_>) -> Result<()> {
    match ctx.variant {
        NormalizerVariant::Ct => set_sop_class(ds, uids::ENHANCED_CT_IMAGE),
        NormalizerVariant::Mr => normalize_mr(ds),
        NormalizerVariant::Pet => set_sop_class(ds, uids::ENHANCED_PET_IMAGE),
        NormalizerVariant::Us => set_sop_class(ds, uids::US_MULTIFRAME_IMAGE),
        NormalizerVariant::ParametricMap => check_parametric_map(inputs, ctx)?,
        NormalizerVariant::EnhancedCt
        | NormalizerVariant::EnhancedMr
        | NormalizerVariant::EnhancedUsVolume
        | NormalizerVariant::UsMultiframe
        | NormalizerVariant::Segmentation
        | NormalizerVariant::DeformableSpatialRegistration => {}
    }
    Ok(())
}

fn set_sop_class(ds: &mut Dataset, uid: &str) {
    ds.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uid),
    ));
}

/// Default frame type when ImageType is absent or malformed
const DEFAULT_MR_IMAGE_TYPE: [&str; 4] = ["ORIGINAL", "PRIMARY", "OTHER", "NONE"];

fn normalize_mr(ds: &mut Dataset) {
    set_sop_class(ds, uids::LEGACY_CONVERTED_ENHANCED_MR_IMAGE);

    // the frame type is only well defined for a 4-element ImageType
    let image_type = multi_string_value(ds, tags::IMAGE_TYPE)
        .filter(|values| values.len() == 4)
        .unwrap_or_else(|| DEFAULT_MR_IMAGE_TYPE.iter().map(ToString::to_string).collect());
    ds.put(DataElement::new(
        tags::IMAGE_TYPE,
        VR::CS,
        PrimitiveValue::Strs(image_type.clone().into()),
    ));

    update_shared_group(ds, |shared| {
        shared.put(sequence(
            tags::MR_IMAGE_FRAME_TYPE_SEQUENCE,
            vec![Dataset::from_element_iter([
                DataElement::new(
                    tags::FRAME_TYPE,
                    VR::CS,
                    PrimitiveValue::Strs(image_type.into()),
                ),
                DataElement::new(
                    tags::PIXEL_PRESENTATION,
                    VR::CS,
                    PrimitiveValue::from("MONOCHROME"),
                ),
                DataElement::new(
                    tags::VOLUMETRIC_PROPERTIES,
                    VR::CS,
                    PrimitiveValue::from("VOLUME"),
                ),
                DataElement::new(
                    tags::VOLUME_BASED_CALCULATION_TECHNIQUE,
                    VR::CS,
                    PrimitiveValue::from("NONE"),
                ),
                DataElement::new(
                    tags::COMPLEX_IMAGE_COMPONENT,
                    VR::CS,
                    PrimitiveValue::from("MAGNITUDE"),
                ),
                DataElement::new(
                    tags::ACQUISITION_CONTRAST,
                    VR::CS,
                    PrimitiveValue::from("UNKNOWN"),
                ),
            ])],
        ));
    });
}

fn check_parametric_map(inputs: &[Dataset], ctx: &mut Context<'_>) -> Result<()> {
    let bits_allocated = u16_value(&inputs[0], tags::BITS_ALLOCATED).unwrap_or(0);
    if bits_allocated != 32 {
        ctx.flag(
            DiagnosticKind::InvalidBitsAllocatedForParametricMap,
            format!(
                "only works with 32 bit data, not {} bits allocated",
                bits_allocated
            ),
            || MfnormError::InvalidBitsAllocatedForParametricMap { bits_allocated },
        )?;
    }
    Ok(())
}
