//! SOP Class UID constants and UID minting

// Image storage SOP classes
pub const CT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
pub const ENHANCED_CT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.2.1";
pub const LEGACY_CONVERTED_ENHANCED_CT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.2.2";
pub const US_MULTIFRAME_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.3.1";
pub const MR_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.4";
pub const ENHANCED_MR_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.4.1";
pub const LEGACY_CONVERTED_ENHANCED_MR_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.4.4";
pub const US_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.6.1";
pub const ENHANCED_US_VOLUME: &str = "1.2.840.10008.5.1.4.1.1.6.2";
pub const PARAMETRIC_MAP: &str = "1.2.840.10008.5.1.4.1.1.30";
pub const PET_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.128";
pub const LEGACY_CONVERTED_ENHANCED_PET_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.128.1";
pub const ENHANCED_PET_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.130";

// Non-image SOP classes handled by the engine
pub const DEFORMABLE_SPATIAL_REGISTRATION: &str = "1.2.840.10008.5.1.4.1.1.66.3";
pub const SEGMENTATION: &str = "1.2.840.10008.5.1.4.1.1.66.4";

// Transfer syntaxes
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// Mints a fresh DICOM UID under the UUID-derived `2.25` root
pub fn new_uid() -> String {
    format!("2.25.{}", uuid::Uuid::new_v4().as_u128())
}
