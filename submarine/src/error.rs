use thiserror::Error;
use tools::{CipherError, DecodeError};

/// Everything that can go wrong while issuing, splitting or opening a token.
///
/// [`TokenError::Padding`] is reported for any token whose last decrypted byte claims more
/// padding than there is plaintext. A service that forwards this variant separately from other
/// rejections hands out a padding oracle; a hardened service would fold every decrypt failure into
/// one authentication error and verify a MAC before decrypting at all.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not valid base64: {0}")]
    Decode(#[from] DecodeError),

    #[error("token of {len} bytes is too short or not block aligned")]
    Truncated { len: usize },

    #[error("iv must be exactly {expected} bytes, got {actual}")]
    InvalidIv { expected: usize, actual: usize },

    #[error("invalid padding")]
    Padding,

    #[error(transparent)]
    Cipher(CipherError),
}

impl From<CipherError> for TokenError {
    fn from(value: CipherError) -> Self {
        match value {
            CipherError::InvalidPadding => TokenError::Padding,
            CipherError::TruncatedCiphertext { len } => TokenError::Truncated { len },
            other => TokenError::Cipher(other),
        }
    }
}
