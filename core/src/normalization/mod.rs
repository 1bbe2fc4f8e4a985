//! The series normalization pipeline
//!
//! Control flow per invocation: resolve the collection's SOP Class UID and
//! normalizer variant, then either pass an already-multi-frame single input
//! through or sort the slices along the scan axis and assemble a multi-frame
//! dataset, run the invariant pass, and finish with the variant's overrides.
//! Deformable spatial registrations skip everything and are returned as-is.

pub mod assemble;
pub mod invariants;
pub mod modality;
pub mod sort;

use log::{error, warn};
use regex::Regex;

use crate::api::NormalizedSeries;
use crate::attributes::tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE;
use crate::attributes::{sequence_items, string_value};
use crate::error::{MfnormError, Result};
use crate::types::{
    Dataset, Diagnostic, DiagnosticKind, NormalizerOptions, NormalizerVariant, ValidationMode,
};
use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::StandardDataDictionary;
use dicom_object::mem::InMemElement;

/// Resolves the single SOP Class UID shared by all input datasets and the
/// normalizer variant registered for it
///
/// The raw values are compared as-is; the resolved UID is sanitized (stray
/// VR padding stripped) before the registry lookup.
///
/// # Errors
///
/// - [`MfnormError::MissingSopClassUid`] when no dataset carries the attribute
/// - [`MfnormError::InconsistentSopClassUid`] when the values disagree
/// - [`MfnormError::UnsupportedSopClassUid`] when no variant is registered
pub fn resolve_variant(datasets: &[Dataset]) -> Result<(String, NormalizerVariant)> {
    use crate::attributes::tags::SOP_CLASS_UID;

    let mut sop_class_uid: Option<String> = None;
    for ds in datasets {
        let Some(uid) = string_value(ds, SOP_CLASS_UID) else {
            continue;
        };
        match &sop_class_uid {
            None => sop_class_uid = Some(uid),
            Some(expected) if *expected != uid => {
                error!("inconsistent SOP Class UIDs: {} vs {}", uid, expected);
                return Err(MfnormError::InconsistentSopClassUid {
                    expected: expected.clone(),
                    found: uid,
                });
            }
            Some(_) => {}
        }
    }

    let raw = sop_class_uid.ok_or(MfnormError::MissingSopClassUid)?;
    let sanitized = sanitize_uid(&raw);
    let variant = NormalizerVariant::for_sop_class_uid(&sanitized)
        .ok_or_else(|| MfnormError::UnsupportedSopClassUid(sanitized.clone()))?;
    Ok((sanitized, variant))
}

/// Strips everything that is not a digit or a dot from a UID value
///
/// Padding from odd-length values survives naturalization on some sources.
fn sanitize_uid(uid: &str) -> String {
    let re = Regex::new(r"[^0-9.]").expect("Failed to compile regex");
    re.replace_all(uid, "").into_owned()
}

/// Runs the full pipeline over one instance collection
pub(crate) fn run(datasets: &[Dataset], options: &NormalizerOptions) -> Result<NormalizedSeries> {
    let (sop_class_uid, variant) = resolve_variant(datasets)?;

    if variant.bypasses_pipeline() {
        // one dataset per series, taken as already normalized
        return Ok(NormalizedSeries {
            dataset: datasets[0].clone(),
            variant,
            diagnostics: Vec::new(),
        });
    }

    let mut ctx = Context::new(options, variant);
    let mut dataset = if datasets.len() == 1
        && NormalizerVariant::is_multiframe_sop_class_uid(&sop_class_uid)
    {
        // already a multiframe, so just use it
        datasets[0].clone()
    } else {
        let sorted = sort::sort_by_scan_axis(datasets)?;
        assemble::derive_multiframe(&sorted, datasets, &mut ctx)?
    };

    invariants::apply(&mut dataset, datasets, &mut ctx)?;
    modality::apply(&mut dataset, datasets, &mut ctx)?;

    Ok(NormalizedSeries {
        dataset,
        variant,
        diagnostics: ctx.diagnostics,
    })
}

/// Per-invocation pipeline state: options, resolved variant, and the
/// diagnostics accumulated so far
pub(crate) struct Context<'a> {
    pub options: &'a NormalizerOptions,
    pub variant: NormalizerVariant,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Context<'a> {
    pub fn new(options: &'a NormalizerOptions, variant: NormalizerVariant) -> Self {
        Self {
            options,
            variant,
            diagnostics: Vec::new(),
        }
    }

    /// Records a data-quality anomaly
    ///
    /// In strict mode the anomaly is promoted to the given error; in lenient
    /// mode it is logged and the pipeline continues.
    pub fn flag(
        &mut self,
        kind: DiagnosticKind,
        message: String,
        promote: impl FnOnce() -> MfnormError,
    ) -> Result<()> {
        error!("{}", message);
        self.diagnostics.push(Diagnostic::new(kind, message));
        match self.options.mode {
            ValidationMode::Strict => Err(promote()),
            ValidationMode::Lenient => Ok(()),
        }
    }

    /// Records a non-fatal observation
    pub fn note(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.diagnostics.push(Diagnostic::new(kind, message));
    }
}

/// Builds a sequence element from its items
pub(crate) fn sequence(tag: Tag, items: Vec<Dataset>) -> InMemElement<StandardDataDictionary> {
    DataElement::new(tag, VR::SQ, DataSetSequence::from(items))
}

/// Builds a multi-valued decimal element
pub(crate) fn decimals(tag: Tag, values: Vec<f64>) -> InMemElement<StandardDataDictionary> {
    DataElement::new(tag, VR::DS, PrimitiveValue::F64(values.into()))
}

/// Applies `edit` to the first item of the dataset's
/// SharedFunctionalGroupsSequence, creating the item when the sequence is
/// absent or empty
pub(crate) fn update_shared_group(ds: &mut Dataset, edit: impl FnOnce(&mut Dataset)) {
    let mut items = sequence_items(ds, SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
        .map(<[Dataset]>::to_vec)
        .unwrap_or_default();
    if items.is_empty() {
        items.push(Dataset::new_empty());
    }
    edit(&mut items[0]);
    ds.put(sequence(SHARED_FUNCTIONAL_GROUPS_SEQUENCE, items));
}

#[cfg(test)]
pub(crate) mod testdata {
    //! Builders for synthetic single-frame instances used across the
    //! pipeline tests

    use crate::attributes::tags;
    use crate::types::{uids, Dataset};
    use dicom_core::{DataElement, PrimitiveValue, VR};

    /// A minimal single-frame slice at position (0, 0, z)
    ///
    /// 2x2 pixels, 16 bits allocated, pixel bytes filled with `fill`.
    pub fn slice(sop_class_uid: &str, modality: &str, z: f64, fill: u8) -> Dataset {
        let mut ds = Dataset::new_empty();
        ds.put(DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(sop_class_uid),
        ));
        ds.put(DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(format!("1.2.3.4.{}", fill)),
        ));
        ds.put(DataElement::new(
            tags::SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3.4"),
        ));
        ds.put(DataElement::new(
            tags::STUDY_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3"),
        ));
        ds.put(DataElement::new(
            tags::MODALITY,
            VR::CS,
            PrimitiveValue::from(modality),
        ));
        ds.put(DataElement::new(
            tags::ROWS,
            VR::US,
            PrimitiveValue::from(2_u16),
        ));
        ds.put(DataElement::new(
            tags::COLUMNS,
            VR::US,
            PrimitiveValue::from(2_u16),
        ));
        ds.put(DataElement::new(
            tags::BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(16_u16),
        ));
        ds.put(DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(1_u16),
        ));
        ds.put(DataElement::new(
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            PrimitiveValue::F64(vec![0.0, 0.0, z].into()),
        ));
        ds.put(DataElement::new(
            tags::IMAGE_ORIENTATION_PATIENT,
            VR::DS,
            PrimitiveValue::F64(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0].into()),
        ));
        ds.put(DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::F64(vec![0.5, 0.5].into()),
        ));
        ds.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U8(vec![fill; 8].into()),
        ));
        ds
    }

    /// A CT slice at position (0, 0, z)
    pub fn ct_slice(z: f64, fill: u8) -> Dataset {
        slice(uids::CT_IMAGE, "CT", z, fill)
    }

    /// An MR slice at position (0, 0, z)
    pub fn mr_slice(z: f64, fill: u8) -> Dataset {
        slice(uids::MR_IMAGE, "MR", z, fill)
    }
}
