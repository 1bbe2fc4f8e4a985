use thiserror::Error;

/// Result type for mfnorm operations
pub type Result<T> = std::result::Result<T, MfnormError>;

/// Error types for series normalization
#[derive(Error, Debug)]
pub enum MfnormError {
    /// No input dataset carries a SOP Class UID
    #[error("No SOP Class UID found in input datasets")]
    MissingSopClassUid,

    /// Input datasets disagree on the SOP Class UID
    #[error("Inconsistent SOP Class UIDs: expected {expected}, found {found}")]
    InconsistentSopClassUid { expected: String, found: String },

    /// No normalizer is registered for the SOP Class UID
    #[error("Unsupported SOP Class UID: {0}")]
    UnsupportedSopClassUid(String),

    /// Position or orientation needed for slice sorting is absent
    #[error("Missing position/orientation: {0}")]
    MissingOrientation(String),

    /// Non-ultrasound input with BitsAllocated other than 16
    #[error("BitsAllocated must be 16 for this modality, found {bits_allocated}")]
    BitsAllocatedMismatch { bits_allocated: u16 },

    /// A slice's pixel buffer does not match the derived frame size
    #[error("Frame {frame}: pixel buffer is {actual} bytes, expected {expected}")]
    FrameSizeMismatch {
        frame: usize,
        expected: usize,
        actual: usize,
    },

    /// Multi-frame output lacks a SharedFunctionalGroupsSequence
    #[error("Multi-frame dataset has no SharedFunctionalGroupsSequence")]
    MissingSharedFunctionalGroups,

    /// Parametric map input with BitsAllocated other than 32
    #[error("Parametric maps require BitsAllocated 32, found {bits_allocated}")]
    InvalidBitsAllocatedForParametricMap { bits_allocated: u16 },

    /// The requested pixel buffer exceeds the configured ceiling
    #[error("Pixel buffer of {requested} bytes exceeds limit of {limit} bytes")]
    PixelBufferTooLarge { requested: u64, limit: u64 },

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for MfnormError {
    fn from(e: dicom_object::ReadError) -> Self {
        MfnormError::DicomError(format!("{}", e))
    }
}

impl From<dicom_object::WriteError> for MfnormError {
    fn from(e: dicom_object::WriteError) -> Self {
        MfnormError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for MfnormError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        MfnormError::DicomError(format!("{}", e))
    }
}
