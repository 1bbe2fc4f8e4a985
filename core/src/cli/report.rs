use crate::api::NormalizedSeries;
use crate::attributes::tags;
use crate::attributes::{multi_f64_value, u16_value};
use std::fmt;

/// Text report formatter for a normalization outcome
pub struct TextReport<'a> {
    result: &'a NormalizedSeries,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(result: &'a NormalizedSeries) -> Self {
        Self { result }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ds = &self.result.dataset;
        writeln!(f, "Series Normalization")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        writeln!(
            f,
            "SOP Class UID:  {}",
            self.result.sop_class_uid().as_deref().unwrap_or("unknown")
        )?;
        writeln!(f, "Variant:        {}", self.result.variant)?;
        writeln!(f, "Frames:         {}", self.result.number_of_frames())?;
        writeln!(
            f,
            "Rows:           {}",
            u16_value(ds, tags::ROWS).map_or("unknown".to_string(), |v| v.to_string())
        )?;
        writeln!(
            f,
            "Columns:        {}",
            u16_value(ds, tags::COLUMNS).map_or("unknown".to_string(), |v| v.to_string())
        )?;
        writeln!(f, "Window Center:  {}", window(ds, tags::WINDOW_CENTER))?;
        writeln!(f, "Window Width:   {}", window(ds, tags::WINDOW_WIDTH))?;
        writeln!(f)?;

        writeln!(f, "Diagnostics")?;
        writeln!(f, "-----------")?;
        if self.result.diagnostics.is_empty() {
            writeln!(f, "(none)")?;
        } else {
            for diagnostic in &self.result.diagnostics {
                writeln!(f, "{}", diagnostic)?;
            }
        }

        Ok(())
    }
}

fn window(ds: &crate::types::Dataset, tag: dicom_core::Tag) -> String {
    multi_f64_value(ds, tag).map_or("unknown".to_string(), |values| {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    })
}

/// Serializable summary of a normalization outcome
#[cfg(feature = "json")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct Summary {
    /// Output SOP Class UID
    pub sop_class_uid: Option<String>,

    /// Resolved normalizer variant
    pub variant: crate::types::NormalizerVariant,

    /// Number of frames in the output
    pub number_of_frames: i32,

    /// Data-quality anomalies observed
    pub diagnostics: Vec<crate::types::Diagnostic>,
}

#[cfg(feature = "json")]
impl From<&NormalizedSeries> for Summary {
    fn from(result: &NormalizedSeries) -> Self {
        Self {
            sop_class_uid: result.sop_class_uid(),
            variant: result.variant,
            number_of_frames: result.number_of_frames(),
            diagnostics: result.diagnostics.clone(),
        }
    }
}
