use std::cmp::Ordering;

use crate::attributes::tags::{IMAGE_ORIENTATION_PATIENT, IMAGE_POSITION_PATIENT};
use crate::attributes::multi_f64_value;
use crate::error::{MfnormError, Result};
use crate::geometry::{self, Vec3};
use crate::types::Dataset;

/// One slice paired with its signed distance along the scan axis
#[derive(Debug)]
pub struct SliceDistance<'a> {
    pub distance: f64,
    pub dataset: &'a Dataset,
}

/// Orders single-frame slices along the series' scan axis
///
/// The first dataset is the reference: its orientation defines the scan
/// axis (row x column), and every slice's position is projected onto that
/// axis relative to the reference position.
///
/// The result is sorted by **descending** distance, the storage order of
/// multi-frame pixel data. The sort is stable; equal distances keep their
/// encounter order.
///
/// # Errors
///
/// [`MfnormError::MissingOrientation`] when the reference has no usable
/// `ImageOrientationPatient` or any slice has no usable
/// `ImagePositionPatient`.
pub fn sort_by_scan_axis(datasets: &[Dataset]) -> Result<Vec<SliceDistance<'_>>> {
    let reference = &datasets[0];
    let orientation = multi_f64_value(reference, IMAGE_ORIENTATION_PATIENT)
        .filter(|v| v.len() >= 6)
        .ok_or_else(|| {
            MfnormError::MissingOrientation(
                "reference slice has no ImageOrientationPatient".to_string(),
            )
        })?;
    let reference_position = position_of(reference, 0)?;

    let row_vector: Vec3 = [orientation[0], orientation[1], orientation[2]];
    let column_vector: Vec3 = [orientation[3], orientation[4], orientation[5]];
    let scan_axis = geometry::cross(row_vector, column_vector);

    let mut pairs = Vec::with_capacity(datasets.len());
    for (index, dataset) in datasets.iter().enumerate() {
        let offset = geometry::subtract(position_of(dataset, index)?, reference_position);
        pairs.push(SliceDistance {
            distance: geometry::dot(offset, scan_axis),
            dataset,
        });
    }

    // Multiframe is stored in descending order
    pairs.sort_by(|a, b| b.distance.partial_cmp(&a.distance).unwrap_or(Ordering::Equal));
    Ok(pairs)
}

fn position_of(dataset: &Dataset, index: usize) -> Result<Vec3> {
    let position = multi_f64_value(dataset, IMAGE_POSITION_PATIENT)
        .filter(|v| v.len() >= 3)
        .ok_or_else(|| {
            MfnormError::MissingOrientation(format!("slice {} has no ImagePositionPatient", index))
        })?;
    Ok([position[0], position[1], position[2]])
}
