//! Core type definitions for series normalization
//!
//! This module provides the fundamental types used throughout the mfnorm library:
//! - [`Dataset`]: the in-memory DICOM dataset the engine reads and produces
//! - [`NormalizerVariant`]: the closed set of modality-specific normalizers
//! - [`ValidationMode`] / [`Diagnostic`]: strictness control and the
//!   structured diagnostics channel
//! - [`NormalizerOptions`]: per-call configuration

mod diagnostics;
mod options;
pub mod uids;
mod variant;

use dicom_dictionary_std::StandardDataDictionary;
use dicom_object::InMemDicomObject;

pub use diagnostics::{Diagnostic, DiagnosticKind, ValidationMode};
pub use options::{NormalizerOptions, DEFAULT_MAX_PIXEL_BUFFER_BYTES};
pub use variant::NormalizerVariant;

/// A naturalized DICOM dataset: one IOD instance, single- or multi-frame
pub type Dataset = InMemDicomObject<StandardDataDictionary>;
