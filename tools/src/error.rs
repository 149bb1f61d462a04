use openssl::error::ErrorStack;
use thiserror::Error;

/// Errors raised by the block cipher cores and their modes.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid block length: expected {expected} bytes, got {actual}")]
    InvalidBlockLength { expected: usize, actual: usize },

    #[error("ciphertext of {len} bytes is not a multiple of the block size")]
    TruncatedCiphertext { len: usize },

    #[error("invalid padding")]
    InvalidPadding,

    #[error("openssl: {0}")]
    Openssl(#[from] ErrorStack),
}

/// Errors raised while decoding text encodings.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}
