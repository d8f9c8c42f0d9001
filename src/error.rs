//! Error type shared by every barust operation.

use thiserror::Error;

/// Errors produced while detecting, normalizing, encoding or writing a barcode.
#[derive(Debug, Error)]
pub enum BarcodeError {
    /// The input was empty after trimming.
    #[error("no data to encode")]
    EmptyData,

    /// The requested code type is not one of the supported identifiers.
    #[error("unsupported code type: {0}")]
    UnsupportedType(String),

    /// The requested output format is not `png` or `svg`.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The payload contains characters the symbology cannot carry.
    #[error("{symbology} does not support some characters in {data:?}")]
    InvalidCharacters { symbology: &'static str, data: String },

    /// A render option had a value that could not be parsed.
    #[error("invalid value {value:?} for option {key}")]
    InvalidOption { key: String, value: String },

    /// The rendered image would be wider or taller than the allowed maximum.
    #[error("rendered barcode would exceed {max} pixels per side")]
    DimensionsTooLarge { max: u32 },

    /// The underlying encoder rejected the payload.
    #[error("failed to encode barcode: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, BarcodeError>;
