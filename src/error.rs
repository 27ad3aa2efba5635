//! Error types for the fingerprinting engine

use std::fmt;

/// Errors that can occur while fingerprinting, indexing or matching audio
///
/// An empty sample buffer and a query without a match are not errors: the
/// former yields an empty fingerprint set, the latter `Ok(None)`.
#[derive(Debug, Clone, PartialEq)]
pub enum FingerprintError {
    /// Configuration failed validation
    InvalidConfig(String),

    /// Invalid input parameters
    InvalidInput(String),

    /// Audio decoding error (unreadable, unsupported or corrupt input)
    DecodingError(String),

    /// Failure reported by an index backend
    IndexError(String),
}

impl fmt::Display for FingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            FingerprintError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            FingerprintError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            FingerprintError::IndexError(msg) => write!(f, "Index error: {}", msg),
        }
    }
}

impl std::error::Error for FingerprintError {}

impl From<symphonia::core::errors::Error> for FingerprintError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        FingerprintError::DecodingError(err.to_string())
    }
}

impl From<std::io::Error> for FingerprintError {
    fn from(err: std::io::Error) -> Self {
        FingerprintError::DecodingError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = FingerprintError::InvalidConfig("fan_value must be > 0".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: fan_value must be > 0");

        let err = FingerprintError::DecodingError("no default track".to_string());
        assert!(err.to_string().starts_with("Decoding error"));
    }

    #[test]
    fn test_io_error_maps_to_decoding_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.wav");
        let err: FingerprintError = io.into();
        assert!(matches!(err, FingerprintError::DecodingError(_)));
    }
}
