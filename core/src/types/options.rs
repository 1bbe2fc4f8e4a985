use crate::types::ValidationMode;

/// Default ceiling for the derived pixel buffer: 4 GiB
pub const DEFAULT_MAX_PIXEL_BUFFER_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Configuration for a normalization call
///
/// # Example
///
/// ```
/// use mfnorm_core::{NormalizerOptions, ValidationMode};
///
/// let options = NormalizerOptions::default().with_mode(ValidationMode::Lenient);
/// assert_eq!(options.mode, ValidationMode::Lenient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerOptions {
    /// Strict (default) or lenient handling of data-quality anomalies
    pub mode: ValidationMode,

    /// Ceiling for the derived pixel buffer, in bytes
    /// If None, only arithmetic overflow is guarded against.
    pub max_pixel_buffer_bytes: Option<u64>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Strict,
            max_pixel_buffer_bytes: Some(DEFAULT_MAX_PIXEL_BUFFER_BYTES),
        }
    }
}

impl NormalizerOptions {
    /// Options reproducing the reference log-and-continue behavior
    pub fn lenient() -> Self {
        Self::default().with_mode(ValidationMode::Lenient)
    }

    /// Sets the validation mode
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the pixel buffer ceiling; `None` disables the ceiling
    pub fn with_max_pixel_buffer_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_pixel_buffer_bytes = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = NormalizerOptions::default();
        assert_eq!(options.mode, ValidationMode::Strict);
        assert_eq!(
            options.max_pixel_buffer_bytes,
            Some(DEFAULT_MAX_PIXEL_BUFFER_BYTES)
        );
    }

    #[test]
    fn test_lenient() {
        assert_eq!(NormalizerOptions::lenient().mode, ValidationMode::Lenient);
    }
}
