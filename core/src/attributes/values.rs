use crate::attributes::tags::PIXEL_DATA;
use crate::types::Dataset;
use dicom_core::Tag;

/// Helper to get string value from a dataset
///
/// Returns `None` if the tag is not present, empty, or cannot be converted
/// to string. A present-but-empty value behaves exactly like an absent one.
pub fn string_value(ds: &Dataset, tag: Tag) -> Option<String> {
    let value = ds.element(tag).ok()?.to_str().ok()?.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Helper to get a string value with a default fallback
pub fn string_value_or(ds: &Dataset, tag: Tag, default: &str) -> String {
    string_value(ds, tag).unwrap_or_else(|| default.to_string())
}

/// Helper to get multi-string value from a dataset
///
/// Returns `None` if the tag is not present or holds no values
pub fn multi_string_value(ds: &Dataset, tag: Tag) -> Option<Vec<String>> {
    let elem = ds.element(tag).ok()?;
    let values: Vec<String> = if let Ok(strs) = elem.to_multi_str() {
        strs.iter().map(|s| s.trim().to_string()).collect()
    } else {
        // Fallback: single string split by backslash
        elem.to_str()
            .ok()?
            .split('\\')
            .map(|part| part.trim().to_string())
            .collect()
    };
    if values.is_empty() || values.iter().all(String::is_empty) {
        None
    } else {
        Some(values)
    }
}

/// Helper to get integer value from a dataset
pub fn int_value(ds: &Dataset, tag: Tag) -> Option<i32> {
    ds.element(tag).ok().and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get integer value with a default fallback
pub fn int_value_or(ds: &Dataset, tag: Tag, default: i32) -> i32 {
    int_value(ds, tag).unwrap_or(default)
}

/// Helper to get u16 value from a dataset
pub fn u16_value(ds: &Dataset, tag: Tag) -> Option<u16> {
    ds.element(tag).ok().and_then(|elem| elem.to_int::<u16>().ok())
}

/// Helper to get f64 value from a dataset
pub fn f64_value(ds: &Dataset, tag: Tag) -> Option<f64> {
    ds.element(tag)
        .ok()
        .and_then(|elem| elem.to_float64().ok())
}

/// Helper to get f64 value with a default fallback
pub fn f64_value_or(ds: &Dataset, tag: Tag, default: f64) -> f64 {
    f64_value(ds, tag).unwrap_or(default)
}

/// Helper to get multi-f64 value from a dataset
///
/// Returns `None` if the tag is not present or holds no values
pub fn multi_f64_value(ds: &Dataset, tag: Tag) -> Option<Vec<f64>> {
    let values = ds.element(tag).ok()?.to_multi_float64().ok()?;
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Raw pixel bytes of the dataset's PixelData element
///
/// Returns `None` when PixelData is absent, empty, or not a primitive value
/// (encapsulated pixel data is out of scope; inputs are decoded buffers).
pub fn pixel_data_bytes(ds: &Dataset) -> Option<Vec<u8>> {
    let elem = ds.element(PIXEL_DATA).ok()?;
    let primitive = elem.value().primitive()?;
    let bytes = primitive.to_bytes();
    if bytes.is_empty() {
        None
    } else {
        Some(bytes.to_vec())
    }
}

/// Items of a sequence element, if the tag is present and is a sequence
pub fn sequence_items<'a>(ds: &'a Dataset, tag: Tag) -> Option<&'a [Dataset]> {
    ds.element(tag).ok().and_then(|elem| elem.items())
}

/// First item of a sequence element
pub fn first_sequence_item<'a>(ds: &'a Dataset, tag: Tag) -> Option<&'a Dataset> {
    sequence_items(ds, tag).and_then(|items| items.first())
}
