use std::{fmt, str::FromStr};

use tools::encode::base64::{from_base64, to_base64};

use crate::{error::TokenError, BLOCK_SIZE};

/// A login token split into its public IV and the encrypted blocks behind it.
///
/// On the wire a token is `base64(IV || ciphertext)`. The split is purely structural: the
/// plaintext is only reachable through decryption under the service key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    iv: [u8; BLOCK_SIZE],
    ciphertext: Vec<u8>,
}

impl Token {
    /// Pairs an IV with ciphertext. The ciphertext must be a non-empty run of whole blocks.
    pub fn new(iv: &[u8], ciphertext: Vec<u8>) -> Result<Self, TokenError> {
        let iv: [u8; BLOCK_SIZE] = iv.try_into().map_err(|_| TokenError::InvalidIv {
            expected: BLOCK_SIZE,
            actual: iv.len(),
        })?;

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(TokenError::Truncated {
                len: BLOCK_SIZE + ciphertext.len(),
            });
        }

        Ok(Self { iv, ciphertext })
    }

    /// Splits raw `IV || ciphertext` bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        if bytes.len() < 2 * BLOCK_SIZE {
            return Err(TokenError::Truncated { len: bytes.len() });
        }
        let (iv, ciphertext) = bytes.split_at(BLOCK_SIZE);
        Self::new(iv, ciphertext.to_vec())
    }

    /// Decodes the transport encoding.
    pub fn from_base64(text: &str) -> Result<Self, TokenError> {
        Self::from_bytes(&from_base64(text)?)
    }

    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Same ciphertext behind a different IV.
    pub fn with_iv(&self, iv: [u8; BLOCK_SIZE]) -> Self {
        Self {
            iv,
            ciphertext: self.ciphertext.clone(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        [self.iv.as_slice(), &self.ciphertext].concat()
    }

    pub fn to_base64(&self) -> String {
        to_base64(&self.to_bytes())
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_iv_from_ciphertext() {
        let bytes: Vec<u8> = (0..48).collect();
        let token = Token::from_bytes(&bytes).unwrap();

        assert_eq!(token.iv().as_slice(), &bytes[..16]);
        assert_eq!(token.ciphertext(), &bytes[16..]);
        assert_eq!(token.to_bytes(), bytes);
    }

    #[test]
    fn base64_transport_round_trip() {
        let observed = "6obi67W57jYVxJyh3vyTp7l31dHghJSWP117i+wqTa4=";
        let token: Token = observed.parse().unwrap();

        assert_eq!(token.ciphertext().len(), 16);
        assert_eq!(token.to_string(), observed);
    }

    #[test]
    fn rejects_short_and_unaligned_tokens() {
        assert!(matches!(
            Token::from_bytes(&[0; 16]),
            Err(TokenError::Truncated { len: 16 })
        ));
        assert!(matches!(
            Token::from_bytes(&[0; 40]),
            Err(TokenError::Truncated { len: 40 })
        ));
        assert!(matches!(
            Token::new(&[0; 8], vec![0; 16]),
            Err(TokenError::InvalidIv { expected: 16, actual: 8 })
        ));
    }

    #[test]
    fn rejects_malformed_base64() {
        assert!(matches!(
            Token::from_base64("not base64 at all!"),
            Err(TokenError::Decode(_))
        ));
    }

    #[test]
    fn with_iv_keeps_ciphertext() {
        let token = Token::from_bytes(&[1; 32]).unwrap();
        let swapped = token.with_iv([2; 16]);

        assert_eq!(swapped.iv(), &[2; 16]);
        assert_eq!(swapped.ciphertext(), token.ciphertext());
    }
}
