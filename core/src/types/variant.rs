use std::fmt;

use crate::types::uids;

/// Modality-specific normalizer, selected once per invocation by SOP Class UID
///
/// Enhanced and legacy-converted UIDs of the same family resolve to the
/// family variant; the differences between them only matter for the
/// multi-frame pass-through test, which is keyed on the UID itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum NormalizerVariant {
    Ct,
    EnhancedCt,
    Mr,
    EnhancedMr,
    Us,
    UsMultiframe,
    EnhancedUsVolume,
    Pet,
    Segmentation,
    ParametricMap,
    DeformableSpatialRegistration,
}

impl NormalizerVariant {
    /// Resolves the variant registered for a sanitized SOP Class UID
    ///
    /// Returns `None` for SOP classes the engine does not normalize.
    pub fn for_sop_class_uid(uid: &str) -> Option<Self> {
        match uid {
            uids::CT_IMAGE => Some(NormalizerVariant::Ct),
            uids::ENHANCED_CT_IMAGE | uids::LEGACY_CONVERTED_ENHANCED_CT_IMAGE => {
                Some(NormalizerVariant::EnhancedCt)
            }
            uids::MR_IMAGE => Some(NormalizerVariant::Mr),
            uids::ENHANCED_MR_IMAGE | uids::LEGACY_CONVERTED_ENHANCED_MR_IMAGE => {
                Some(NormalizerVariant::EnhancedMr)
            }
            uids::US_IMAGE => Some(NormalizerVariant::Us),
            uids::US_MULTIFRAME_IMAGE => Some(NormalizerVariant::UsMultiframe),
            uids::ENHANCED_US_VOLUME => Some(NormalizerVariant::EnhancedUsVolume),
            uids::PET_IMAGE
            | uids::ENHANCED_PET_IMAGE
            | uids::LEGACY_CONVERTED_ENHANCED_PET_IMAGE => Some(NormalizerVariant::Pet),
            uids::SEGMENTATION => Some(NormalizerVariant::Segmentation),
            uids::PARAMETRIC_MAP => Some(NormalizerVariant::ParametricMap),
            uids::DEFORMABLE_SPATIAL_REGISTRATION => {
                Some(NormalizerVariant::DeformableSpatialRegistration)
            }
            _ => None,
        }
    }

    /// Whether a sanitized SOP Class UID denotes an inherently multi-frame IOD
    ///
    /// A single input of one of these classes is passed through instead of
    /// being re-derived.
    pub fn is_multiframe_sop_class_uid(uid: &str) -> bool {
        matches!(
            uid,
            uids::ENHANCED_MR_IMAGE
                | uids::LEGACY_CONVERTED_ENHANCED_MR_IMAGE
                | uids::ENHANCED_CT_IMAGE
                | uids::LEGACY_CONVERTED_ENHANCED_CT_IMAGE
                | uids::ENHANCED_US_VOLUME
                | uids::US_MULTIFRAME_IMAGE
                | uids::ENHANCED_PET_IMAGE
                | uids::LEGACY_CONVERTED_ENHANCED_PET_IMAGE
                | uids::SEGMENTATION
                | uids::PARAMETRIC_MAP
        )
    }

    /// Ultrasound variants are exempt from the 16-bit sample requirement
    pub fn is_ultrasound(&self) -> bool {
        matches!(
            self,
            NormalizerVariant::Us
                | NormalizerVariant::UsMultiframe
                | NormalizerVariant::EnhancedUsVolume
        )
    }

    /// Deformable registrations skip sorting, assembly and the invariant pass
    pub fn bypasses_pipeline(&self) -> bool {
        matches!(self, NormalizerVariant::DeformableSpatialRegistration)
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            NormalizerVariant::Ct => "ct",
            NormalizerVariant::EnhancedCt => "enhanced-ct",
            NormalizerVariant::Mr => "mr",
            NormalizerVariant::EnhancedMr => "enhanced-mr",
            NormalizerVariant::Us => "us",
            NormalizerVariant::UsMultiframe => "us-multiframe",
            NormalizerVariant::EnhancedUsVolume => "enhanced-us-volume",
            NormalizerVariant::Pet => "pet",
            NormalizerVariant::Segmentation => "segmentation",
            NormalizerVariant::ParametricMap => "parametric-map",
            NormalizerVariant::DeformableSpatialRegistration => "deformable-spatial-registration",
        }
    }
}

impl fmt::Display for NormalizerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
