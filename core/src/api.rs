use std::path::Path;

use dicom_object::FileMetaTableBuilder;

use crate::attributes::tags::{NUMBER_OF_FRAMES, SOP_CLASS_UID, SOP_INSTANCE_UID};
use crate::attributes::{int_value_or, string_value};
use crate::error::{MfnormError, Result};
use crate::normalization;
use crate::types::{uids, Dataset, Diagnostic, NormalizerOptions, NormalizerVariant};

/// Main entry point for series normalization
///
/// Takes the instances of one series (already decoded to raw pixel buffers)
/// and produces one canonical multi-frame dataset, spatially ordered along
/// the scan axis, with derived shared and per-frame functional groups.
///
/// # Example
///
/// ```
/// use mfnorm_core::{Dataset, SeriesNormalizer};
/// use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
///
/// // A deformable spatial registration is returned untouched
/// let mut ds = Dataset::new_empty();
/// ds.put(DataElement::new(
///     Tag(0x0008, 0x0016), // SOPClassUID
///     VR::UI,
///     PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.66.3"),
/// ));
///
/// let result = SeriesNormalizer::normalize(&[ds]).unwrap();
/// assert_eq!(result.variant.simple_name(), "deformable-spatial-registration");
/// assert!(result.diagnostics.is_empty());
/// ```
pub struct SeriesNormalizer;

impl SeriesNormalizer {
    /// Normalizes an instance collection with the default (strict) options
    ///
    /// # Errors
    ///
    /// Returns an error on structural precondition failures (missing,
    /// inconsistent or unsupported SOP Class UID; missing orientation;
    /// frame size mismatch) and, in strict mode, on data-quality anomalies.
    pub fn normalize(datasets: &[Dataset]) -> Result<NormalizedSeries> {
        Self::normalize_with_options(datasets, NormalizerOptions::default())
    }

    /// Normalizes an instance collection with explicit options
    pub fn normalize_with_options(
        datasets: &[Dataset],
        options: NormalizerOptions,
    ) -> Result<NormalizedSeries> {
        normalization::run(datasets, &options)
    }
}

/// Outcome of one normalization call
#[derive(Debug, Clone)]
pub struct NormalizedSeries {
    /// The normalized multi-frame dataset
    pub dataset: Dataset,

    /// The normalizer variant that produced it
    pub variant: NormalizerVariant,

    /// Data-quality anomalies observed along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl NormalizedSeries {
    /// Number of frames in the output dataset
    pub fn number_of_frames(&self) -> i32 {
        int_value_or(&self.dataset, NUMBER_OF_FRAMES, 1)
    }

    /// The output dataset's SOP Class UID
    pub fn sop_class_uid(&self) -> Option<String> {
        string_value(&self.dataset, SOP_CLASS_UID)
    }

    /// Writes the dataset as an Explicit VR Little Endian DICOM file
    ///
    /// # Errors
    ///
    /// Returns an error when the file meta group cannot be built or the
    /// file cannot be written.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let sop_class_uid = self.sop_class_uid().unwrap_or_default();
        let sop_instance_uid =
            string_value(&self.dataset, SOP_INSTANCE_UID).unwrap_or_else(uids::new_uid);

        let file_obj = self
            .dataset
            .clone()
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(sop_class_uid)
                    .media_storage_sop_instance_uid(sop_instance_uid),
            )
            .map_err(|e| MfnormError::DicomError(e.to_string()))?;
        file_obj.write_to_file(path)?;
        Ok(())
    }
}
