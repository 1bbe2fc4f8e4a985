use dicom_core::{DataElement, PrimitiveValue, VR};

use crate::attributes::tags;
use crate::attributes::{
    f64_value_or, first_sequence_item, int_value, multi_f64_value, sequence_items, string_value,
    u16_value,
};
use crate::error::{MfnormError, Result};
use crate::normalization::{sequence, update_shared_group, Context};
use crate::types::{Dataset, DiagnosticKind};

/// Enforces dataset-wide structural invariants on the output
///
/// Runs on every output, derived or passed through: required fields are
/// defaulted, stray values removed, the shared pixel value transformation
/// written, per-frame content stamped, and a usable window guaranteed.
pub(crate) fn apply(ds: &mut Dataset, inputs: &[Dataset], ctx: &mut Context<'_>) -> Result<()> {
    if int_value(ds, tags::NUMBER_OF_FRAMES).is_none() {
        ctx.note(
            DiagnosticKind::MissingNumberOfFrames,
            "dataset has no NumberOfFrames, invariants left unchecked",
        );
        return Ok(());
    }

    if u16_value(ds, tags::PIXEL_REPRESENTATION).is_none() {
        // Required tag: guess signed
        ds.put(DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(1_u16),
        ));
    }
    if string_value(ds, tags::STUDY_ID).is_none() {
        // Required tag: fill in if needed
        ds.put(DataElement::new(
            tags::STUDY_ID,
            VR::SH,
            PrimitiveValue::from("No Study ID"),
        ));
    }
    if !matches!(
        string_value(ds, tags::LATERALITY).as_deref(),
        Some("R") | Some("L")
    ) {
        let _ = ds.take_element(tags::LATERALITY);
    }
    if string_value(ds, tags::PRESENTATION_LUT_SHAPE).is_none() {
        ds.put(DataElement::new(
            tags::PRESENTATION_LUT_SHAPE,
            VR::CS,
            PrimitiveValue::from("IDENTITY"),
        ));
    }

    if sequence_items(ds, tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
        .map_or(true, <[Dataset]>::is_empty)
    {
        ctx.flag(
            DiagnosticKind::MissingSharedFunctionalGroups,
            "can only process multiframe data with SharedFunctionalGroupsSequence".to_string(),
            || MfnormError::MissingSharedFunctionalGroups,
        )?;
        // lenient: the writes below create the missing item
    }

    let prostate = string_value(ds, tags::BODY_PART_EXAMINED).as_deref() == Some("PROSTATE");
    let rescale_intercept = f64_value_or(ds, tags::RESCALE_INTERCEPT, 0.0);
    let rescale_slope = f64_value_or(ds, tags::RESCALE_SLOPE, 1.0);
    update_shared_group(ds, |shared| {
        if prostate {
            shared.put(sequence(
                tags::FRAME_ANATOMY_SEQUENCE,
                vec![Dataset::from_element_iter([
                    sequence(
                        tags::ANATOMIC_REGION_SEQUENCE,
                        vec![Dataset::from_element_iter([
                            DataElement::new(
                                tags::CODE_VALUE,
                                VR::SH,
                                PrimitiveValue::from("T-9200B"),
                            ),
                            DataElement::new(
                                tags::CODING_SCHEME_DESIGNATOR,
                                VR::SH,
                                PrimitiveValue::from("SRT"),
                            ),
                            DataElement::new(
                                tags::CODE_MEANING,
                                VR::LO,
                                PrimitiveValue::from("Prostate"),
                            ),
                        ])],
                    ),
                    DataElement::new(tags::FRAME_LATERALITY, VR::CS, PrimitiveValue::from("U")),
                ])],
            ));
        }
        shared.put(sequence(
            tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE,
            vec![Dataset::from_element_iter([
                DataElement::new(
                    tags::RESCALE_INTERCEPT,
                    VR::DS,
                    PrimitiveValue::from(rescale_intercept),
                ),
                DataElement::new(
                    tags::RESCALE_SLOPE,
                    VR::DS,
                    PrimitiveValue::from(rescale_slope),
                ),
                DataElement::new(tags::RESCALE_TYPE, VR::LO, PrimitiveValue::from("US")),
            ])],
        ));
    });

    fill_frame_content(ds, inputs);
    normalize_window(ds);
    Ok(())
}

/// Stamps a FrameContentSequence onto every per-frame item that lacks one
///
/// Frame numbering is 1-based stack position order. Acquisition timestamps
/// are taken from the input slice with the same index, which only lines up
/// when the dataset was derived from those inputs; pass-through datasets
/// keep whatever content their frames already carry.
fn fill_frame_content(ds: &mut Dataset, inputs: &[Dataset]) {
    let Some(items) = sequence_items(ds, tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE) else {
        return;
    };
    let mut items = items.to_vec();
    let stamp_times = inputs.len() == items.len();
    let mut changed = false;

    for (index, item) in items.iter_mut().enumerate() {
        if item.element(tags::FRAME_CONTENT_SEQUENCE).is_ok() {
            continue;
        }
        let frame_number = (index + 1) as u32;
        let mut content = Dataset::from_element_iter([
            DataElement::new(
                tags::FRAME_ACQUISITION_DURATION,
                VR::FD,
                PrimitiveValue::from(0.0_f64),
            ),
            DataElement::new(tags::STACK_ID, VR::SH, PrimitiveValue::from("1")),
            DataElement::new(
                tags::IN_STACK_POSITION_NUMBER,
                VR::UL,
                PrimitiveValue::from(frame_number),
            ),
            DataElement::new(
                tags::DIMENSION_INDEX_VALUES,
                VR::UL,
                PrimitiveValue::from(frame_number),
            ),
        ]);
        if stamp_times {
            if let Some(datetime) = acquisition_datetime(&inputs[index]) {
                content.put(DataElement::new(
                    tags::FRAME_ACQUISITION_DATE_TIME,
                    VR::DT,
                    PrimitiveValue::from(datetime.clone()),
                ));
                content.put(DataElement::new(
                    tags::FRAME_REFERENCE_DATE_TIME,
                    VR::DT,
                    PrimitiveValue::from(datetime),
                ));
            }
        }
        item.put(sequence(tags::FRAME_CONTENT_SEQUENCE, vec![content]));
        changed = true;
    }

    if changed {
        ds.put(sequence(tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, items));
    }
}

/// Concatenated AcquisitionDate + AcquisitionTime, when it reads as a number
fn acquisition_datetime(ds: &Dataset) -> Option<String> {
    let date = string_value(ds, tags::ACQUISITION_DATE)?;
    let time = string_value(ds, tags::ACQUISITION_TIME)?;
    let datetime = format!("{}{}", date, time);
    datetime.parse::<f64>().ok()?;
    Some(datetime)
}

/// Guarantees a usable WindowCenter/WindowWidth pair on the dataset
///
/// Existing values win. Otherwise a volume-level guess is the mean of the
/// per-frame VOI LUT entries, and failing that a fixed default.
fn normalize_window(ds: &mut Dataset) {
    let has_center = multi_f64_value(ds, tags::WINDOW_CENTER).is_some();
    let has_width = multi_f64_value(ds, tags::WINDOW_WIDTH).is_some();
    if has_center && has_width {
        return;
    }

    let (center, width) = estimate_window(ds).unwrap_or((300.0, 500.0));
    ds.put(DataElement::new(
        tags::WINDOW_CENTER,
        VR::DS,
        PrimitiveValue::from(center),
    ));
    ds.put(DataElement::new(
        tags::WINDOW_WIDTH,
        VR::DS,
        PrimitiveValue::from(width),
    ));
}

/// Mean of every per-frame FrameVOILUTSequence center/width pair
fn estimate_window(ds: &Dataset) -> Option<(f64, f64)> {
    let frames = sequence_items(ds, tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)?;
    let mut center_sum = 0.0;
    let mut width_sum = 0.0;
    let mut count = 0_usize;
    for frame in frames {
        let Some(voi) = first_sequence_item(frame, tags::FRAME_VOI_LUT_SEQUENCE) else {
            continue;
        };
        let center = multi_f64_value(voi, tags::WINDOW_CENTER);
        let width = multi_f64_value(voi, tags::WINDOW_WIDTH);
        let (Some(center), Some(width)) = (center, width) else {
            continue;
        };
        center_sum += center[0];
        width_sum += width[0];
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some((center_sum / count as f64, width_sum / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::f64_value;
    use crate::normalization::sort::sort_by_scan_axis;
    use crate::normalization::testdata::ct_slice;
    use crate::normalization::{assemble, Context};
    use crate::types::{NormalizerOptions, NormalizerVariant};

    fn derived(slices: &[Dataset]) -> (Dataset, Vec<crate::types::Diagnostic>) {
        let options = NormalizerOptions::default();
        let mut ctx = Context::new(&options, NormalizerVariant::Ct);
        let sorted = sort_by_scan_axis(slices).unwrap();
        let mut ds = assemble::derive_multiframe(&sorted, slices, &mut ctx).unwrap();
        apply(&mut ds, slices, &mut ctx).unwrap();
        (ds, ctx.diagnostics)
    }

    #[test]
    fn test_required_defaults() {
        let slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        let (ds, _) = derived(&slices);

        assert_eq!(string_value(&ds, tags::STUDY_ID), Some("No Study ID".into()));
        assert_eq!(
            string_value(&ds, tags::PRESENTATION_LUT_SHAPE),
            Some("IDENTITY".into())
        );
        // copied from the reference, not clobbered by the signed guess
        assert_eq!(u16_value(&ds, tags::PIXEL_REPRESENTATION), Some(1));
    }

    #[test]
    fn test_explicit_unsigned_pixel_representation_survives() {
        let mut slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        for slice in &mut slices {
            slice.put(DataElement::new(
                tags::PIXEL_REPRESENTATION,
                VR::US,
                PrimitiveValue::from(0_u16),
            ));
        }
        let (ds, _) = derived(&slices);
        assert_eq!(u16_value(&ds, tags::PIXEL_REPRESENTATION), Some(0));
    }

    #[test]
    fn test_laterality_removed_unless_r_or_l() {
        for (value, kept) in [("R", true), ("L", true), ("B", false), ("", false)] {
            let mut ds = ct_slice(0.0, 1);
            ds.put(DataElement::new(
                tags::NUMBER_OF_FRAMES,
                VR::IS,
                PrimitiveValue::from(1_i32),
            ));
            ds.put(DataElement::new(
                tags::LATERALITY,
                VR::CS,
                PrimitiveValue::from(value),
            ));
            let options = NormalizerOptions::lenient();
            let mut ctx = Context::new(&options, NormalizerVariant::Ct);
            let inputs = vec![ds.clone()];
            apply(&mut ds, &inputs, &mut ctx).unwrap();
            assert_eq!(ds.element(tags::LATERALITY).is_ok(), kept, "value {:?}", value);
        }
    }

    #[test]
    fn test_pixel_value_transformation() {
        let mut slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        slices[0].put(DataElement::new(
            tags::RESCALE_INTERCEPT,
            VR::DS,
            PrimitiveValue::from("-1024"),
        ));
        slices[0].put(DataElement::new(
            tags::RESCALE_SLOPE,
            VR::DS,
            PrimitiveValue::from("2"),
        ));
        let (ds, _) = derived(&slices);

        let shared = first_sequence_item(&ds, tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE).unwrap();
        let transform =
            first_sequence_item(shared, tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE).unwrap();
        assert_eq!(f64_value(transform, tags::RESCALE_INTERCEPT), Some(-1024.0));
        assert_eq!(f64_value(transform, tags::RESCALE_SLOPE), Some(2.0));
        assert_eq!(string_value(transform, tags::RESCALE_TYPE), Some("US".into()));
    }

    #[test]
    fn test_prostate_anatomy_injection() {
        let mut slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        slices[0].put(DataElement::new(
            tags::BODY_PART_EXAMINED,
            VR::CS,
            PrimitiveValue::from("PROSTATE"),
        ));
        let (ds, _) = derived(&slices);

        let shared = first_sequence_item(&ds, tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE).unwrap();
        let anatomy = first_sequence_item(shared, tags::FRAME_ANATOMY_SEQUENCE).unwrap();
        assert_eq!(
            string_value(anatomy, tags::FRAME_LATERALITY),
            Some("U".into())
        );
        let region = first_sequence_item(anatomy, tags::ANATOMIC_REGION_SEQUENCE).unwrap();
        assert_eq!(string_value(region, tags::CODE_VALUE), Some("T-9200B".into()));
        assert_eq!(
            string_value(region, tags::CODING_SCHEME_DESIGNATOR),
            Some("SRT".into())
        );
        assert_eq!(string_value(region, tags::CODE_MEANING), Some("Prostate".into()));
    }

    #[test]
    fn test_frame_content_numbering() {
        let slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2), ct_slice(10.0, 3)];
        let (ds, _) = derived(&slices);

        let frames = sequence_items(&ds, tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE).unwrap();
        for (index, frame) in frames.iter().enumerate() {
            let content = first_sequence_item(frame, tags::FRAME_CONTENT_SEQUENCE).unwrap();
            assert_eq!(
                int_value(content, tags::IN_STACK_POSITION_NUMBER),
                Some(index as i32 + 1)
            );
            assert_eq!(
                int_value(content, tags::DIMENSION_INDEX_VALUES),
                Some(index as i32 + 1)
            );
            assert_eq!(string_value(content, tags::STACK_ID), Some("1".into()));
        }
    }

    #[test]
    fn test_acquisition_datetime_stamping() {
        let mut slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        for slice in &mut slices {
            slice.put(DataElement::new(
                tags::ACQUISITION_DATE,
                VR::DA,
                PrimitiveValue::from("20240101"),
            ));
            slice.put(DataElement::new(
                tags::ACQUISITION_TIME,
                VR::TM,
                PrimitiveValue::from("120000"),
            ));
        }
        let (ds, _) = derived(&slices);

        let frames = sequence_items(&ds, tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE).unwrap();
        let content = first_sequence_item(&frames[0], tags::FRAME_CONTENT_SEQUENCE).unwrap();
        assert_eq!(
            string_value(content, tags::FRAME_ACQUISITION_DATE_TIME),
            Some("20240101120000".into())
        );
        assert_eq!(
            string_value(content, tags::FRAME_REFERENCE_DATE_TIME),
            Some("20240101120000".into())
        );
    }

    #[test]
    fn test_non_numeric_acquisition_datetime_skipped() {
        let mut slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        for slice in &mut slices {
            slice.put(DataElement::new(
                tags::ACQUISITION_DATE,
                VR::DA,
                PrimitiveValue::from("2024-01-01"),
            ));
            slice.put(DataElement::new(
                tags::ACQUISITION_TIME,
                VR::TM,
                PrimitiveValue::from("12:00:00"),
            ));
        }
        let (ds, _) = derived(&slices);

        let frames = sequence_items(&ds, tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE).unwrap();
        let content = first_sequence_item(&frames[0], tags::FRAME_CONTENT_SEQUENCE).unwrap();
        assert!(content.element(tags::FRAME_ACQUISITION_DATE_TIME).is_err());
    }

    #[test]
    fn test_window_defaults() {
        let slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        let (ds, _) = derived(&slices);
        assert_eq!(multi_f64_value(&ds, tags::WINDOW_CENTER), Some(vec![300.0]));
        assert_eq!(multi_f64_value(&ds, tags::WINDOW_WIDTH), Some(vec![500.0]));
    }

    #[test]
    fn test_window_estimate_from_frames() {
        let mut slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        for (slice, center) in slices.iter_mut().zip([100.0, 300.0]) {
            slice.put(DataElement::new(
                tags::WINDOW_CENTER,
                VR::DS,
                PrimitiveValue::from(center),
            ));
            slice.put(DataElement::new(
                tags::WINDOW_WIDTH,
                VR::DS,
                PrimitiveValue::from(center * 2.0),
            ));
        }
        let options = NormalizerOptions::default();
        let mut ctx = Context::new(&options, NormalizerVariant::Ct);
        let sorted = sort_by_scan_axis(&slices).unwrap();
        let mut ds = assemble::derive_multiframe(&sorted, &slices, &mut ctx).unwrap();
        // the derived dataset has per-frame VOI entries but no top-level window
        apply(&mut ds, &slices, &mut ctx).unwrap();

        assert_eq!(multi_f64_value(&ds, tags::WINDOW_CENTER), Some(vec![200.0]));
        assert_eq!(multi_f64_value(&ds, tags::WINDOW_WIDTH), Some(vec![400.0]));
    }

    #[test]
    fn test_existing_window_kept() {
        let mut slices = vec![ct_slice(0.0, 1), ct_slice(5.0, 2)];
        slices[0].put(DataElement::new(
            tags::WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from(40.0),
        ));
        slices[0].put(DataElement::new(
            tags::WINDOW_WIDTH,
            VR::DS,
            PrimitiveValue::from(400.0),
        ));
        let options = NormalizerOptions::default();
        let mut ctx = Context::new(&options, NormalizerVariant::Ct);
        let sorted = sort_by_scan_axis(&slices).unwrap();
        let mut ds = assemble::derive_multiframe(&sorted, &slices, &mut ctx).unwrap();
        ds.put(DataElement::new(
            tags::WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from(40.0),
        ));
        ds.put(DataElement::new(
            tags::WINDOW_WIDTH,
            VR::DS,
            PrimitiveValue::from(400.0),
        ));
        apply(&mut ds, &slices, &mut ctx).unwrap();

        assert_eq!(multi_f64_value(&ds, tags::WINDOW_CENTER), Some(vec![40.0]));
        assert_eq!(multi_f64_value(&ds, tags::WINDOW_WIDTH), Some(vec![400.0]));
    }

    #[test]
    fn test_missing_shared_groups_strict_vs_lenient() {
        let mut bare = Dataset::new_empty();
        bare.put(DataElement::new(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            PrimitiveValue::from(1_i32),
        ));

        let strict = NormalizerOptions::default();
        let mut ctx = Context::new(&strict, NormalizerVariant::EnhancedCt);
        let inputs = vec![bare.clone()];
        let err = apply(&mut bare.clone(), &inputs, &mut ctx).unwrap_err();
        assert!(matches!(err, MfnormError::MissingSharedFunctionalGroups));

        let lenient = NormalizerOptions::lenient();
        let mut ctx = Context::new(&lenient, NormalizerVariant::EnhancedCt);
        let mut ds = bare.clone();
        apply(&mut ds, &inputs, &mut ctx).unwrap();
        // best-effort shared item is created so the transformation has a home
        let shared = first_sequence_item(&ds, tags::SHARED_FUNCTIONAL_GROUPS_SEQUENCE).unwrap();
        assert!(shared
            .element(tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE)
            .is_ok());
        assert!(ctx
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MissingSharedFunctionalGroups));
    }
}
