use std::fmt;

/// Strictness of data-quality checks during normalization
///
/// Structural precondition failures (missing/inconsistent/unsupported SOP
/// Class UID, missing orientation, frame size mismatch) abort the call in
/// both modes. The mode only governs the recoverable data-quality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum ValidationMode {
    /// Data-quality anomalies fail the call
    #[default]
    Strict,

    /// Data-quality anomalies are recorded and logged, and the pipeline
    /// continues with best-effort defaults
    Lenient,
}

/// Category of a recorded data-quality anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum DiagnosticKind {
    /// Non-ultrasound input with BitsAllocated other than 16
    BitsAllocatedMismatch,

    /// Multi-frame output lacking a SharedFunctionalGroupsSequence
    MissingSharedFunctionalGroups,

    /// Parametric map input with BitsAllocated other than 32
    InvalidBitsAllocatedForParametricMap,

    /// Derivation from a single slice; slice spacing cannot be measured
    SingleSliceDerivation,

    /// Output dataset without NumberOfFrames; the invariant pass is skipped
    MissingNumberOfFrames,
}

/// One data-quality anomaly observed while normalizing
///
/// Anomalies are returned to the caller alongside the output dataset so the
/// caller decides what is fatal, instead of having to scrape logs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Diagnostic {
    /// Anomaly category
    pub kind: DiagnosticKind,

    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_strict() {
        assert_eq!(ValidationMode::default(), ValidationMode::Strict);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(DiagnosticKind::BitsAllocatedMismatch, "found 8");
        assert_eq!(format!("{}", d), "BitsAllocatedMismatch: found 8");
    }
}
