//! # Error Types
//!
//! This module defines error types used throughout the recibo library.

use thiserror::Error;

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for recibo operations
#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time problems: unknown printer model, unknown codepage
    /// or mapping, unknown dialect, invalid column count, invalid chunk size
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation not permitted in the current context, e.g. a cut inside an
    /// embedded (table cell / box) encoder, or a font change mid-line
    #[error("Context error: {0}")]
    Context(String),

    /// Parameter out of range or malformed input, e.g. image width not a
    /// multiple of 8, barcode size outside the dialect's limits
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not supported by the active printer. Raised only when the
    /// encoder runs in [`Strictness::Strict`]; relaxed encoders log and
    /// continue instead
    #[error("Capability error: {0}")]
    Capability(String),
}

/// How capability violations are handled.
///
/// Validation and context errors are always fatal; capability errors
/// (an unsupported barcode symbology, a QR model the printer lacks) are
/// gated by this knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Capability violations become [`Error::Capability`]
    Strict,
    /// Capability violations are logged at `warn` level and the operation
    /// becomes a no-op
    #[default]
    Relaxed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("image width must be a multiple of 8".into());
        assert_eq!(
            err.to_string(),
            "Validation error: image width must be a multiple of 8"
        );
    }

    #[test]
    fn test_default_strictness_is_relaxed() {
        assert_eq!(Strictness::default(), Strictness::Relaxed);
    }
}
