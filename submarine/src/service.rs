use std::fmt;

use tools::{
    encrypt::{
        aes::{Aes128, AesCbc128},
        cipher::{self, CipherCore, CipherMode},
    },
    random::random_block,
};
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{error::TokenError, token::Token, BLOCK_SIZE};

/// The service's AES-128 key. Never printed, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 16]);

impl SecretKey {
    pub fn new(key: [u8; 16]) -> Self {
        Self(key)
    }

    pub fn from_slice(key: &[u8]) -> Result<Self, TokenError> {
        let key = key.try_into().map_err(|_| {
            TokenError::Cipher(tools::CipherError::InvalidKeyLength {
                expected: Aes128::KEY_BYTES,
                actual: key.len(),
            })
        })?;
        Ok(Self(key))
    }

    /// A fresh random key.
    pub fn generate() -> Self {
        let mut key = [0u8; 16];
        key.copy_from_slice(&tools::random::random_key::<Aes128>());
        Self(key)
    }

    fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Opaque yes/no answer on a username and password.
pub trait CredentialCheck {
    fn validate(&self, user: &str, password: &str) -> bool;
}

impl<F> CredentialCheck for F
where
    F: Fn(&str, &str) -> bool,
{
    fn validate(&self, user: &str, password: &str) -> bool {
        self(user, password)
    }
}

/// A single hard-wired account.
#[derive(Clone)]
pub struct FixedCredentials {
    user: String,
    password: String,
}

impl FixedCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl Default for FixedCredentials {
    fn default() -> Self {
        Self::new("qwerty", "asdf")
    }
}

impl fmt::Debug for FixedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedCredentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl CredentialCheck for FixedCredentials {
    fn validate(&self, user: &str, password: &str) -> bool {
        user == self.user && password == self.password
    }
}

/// PKCS#7 padding to the AES block size. Always appends between 1 and 16 bytes.
pub fn pad(bytes: &[u8]) -> Vec<u8> {
    cipher::pad(bytes, BLOCK_SIZE)
}

/// Strips however many bytes the final byte claims, without checking the padding bytes.
pub fn unpad(bytes: &[u8]) -> Result<&[u8], TokenError> {
    Ok(cipher::unpad(bytes)?)
}

/// Issues and opens AES-128-CBC login tokens.
///
/// The key lives only inside this value. Tokens carry no MAC, so anyone holding one can rewrite its
/// IV and with it the first decrypted block; see [`crate::forge`].
#[derive(Debug)]
pub struct BlockCipherService<V: CredentialCheck = FixedCredentials> {
    key: SecretKey,
    credentials: V,
}

impl<V: CredentialCheck> BlockCipherService<V> {
    pub fn new(key: SecretKey, credentials: V) -> Self {
        Self { key, credentials }
    }

    /// Pads and CBC-encrypts plaintext under the caller's IV, returning `base64(IV || ciphertext)`.
    ///
    /// Reusing an IV under the same key leaks the XOR of the first plaintext blocks; callers other
    /// than [`Self::login`] are responsible for fresh IVs.
    pub fn encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Result<String, TokenError> {
        if iv.len() != BLOCK_SIZE {
            return Err(TokenError::InvalidIv {
                expected: BLOCK_SIZE,
                actual: iv.len(),
            });
        }

        let ciphertext =
            AesCbc128::process(self.key.expose(), iv, CipherMode::Encrypt, plaintext)?;
        Ok(Token::new(iv, ciphertext)?.to_base64())
    }

    /// Opens a token and returns the unpadded plaintext.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, TokenError> {
        let token = Token::from_base64(token)?;
        let padded = AesCbc128::process(
            self.key.expose(),
            token.iv(),
            CipherMode::Decrypt,
            token.ciphertext(),
        )?;
        Ok(unpad(&padded)?.to_vec())
    }

    /// Checks the credentials and, on success, encrypts the username under a fresh random IV.
    pub fn login(&self, user: &str, password: &str) -> Result<Option<String>, TokenError> {
        if !self.credentials.validate(user, password) {
            info!(user, "rejected login");
            return Ok(None);
        }

        let iv = random_block::<Aes128>();
        let token = self.encrypt(&iv, user.as_bytes())?;
        debug!(user, "issued token");
        Ok(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 16] = b"abcdefghijklmnop";

    fn service() -> BlockCipherService {
        BlockCipherService::new(SecretKey::new(*KEY), FixedCredentials::default())
    }

    #[test]
    fn login_issues_token_for_valid_credentials() {
        let service = service();
        let token = service.login("qwerty", "asdf").unwrap().unwrap();

        assert_eq!(service.decrypt(&token).unwrap(), b"qwerty");
    }

    #[test]
    fn login_rejects_wrong_password() {
        let service = service();

        assert!(service.login("qwerty", "wrong").unwrap().is_none());
        assert!(service.login("fionn", "asdf").unwrap().is_none());
    }

    #[test]
    fn login_uses_fresh_ivs() {
        let service = service();
        let first = Token::from_base64(&service.login("qwerty", "asdf").unwrap().unwrap()).unwrap();
        let second = Token::from_base64(&service.login("qwerty", "asdf").unwrap().unwrap()).unwrap();

        assert_ne!(first.iv(), second.iv());
        assert_ne!(first.ciphertext(), second.ciphertext());
    }

    #[test]
    fn encrypt_matches_known_token_layout() {
        let service = service();
        let token = service.encrypt(&[0; 16], b"qwerty").unwrap();
        let token = Token::from_base64(&token).unwrap();

        assert_eq!(token.iv(), &[0; 16]);
        assert_eq!(token.ciphertext().len(), 16);

        let block_aligned = service.encrypt(&[0; 16], &[b'a'; 16]).unwrap();
        assert_eq!(Token::from_base64(&block_aligned).unwrap().ciphertext().len(), 32);
    }

    #[test]
    fn encrypt_rejects_wrong_iv_length() {
        assert!(matches!(
            service().encrypt(&[0; 15], b"qwerty"),
            Err(TokenError::InvalidIv { expected: 16, actual: 15 })
        ));
    }

    #[test]
    fn decrypt_reports_oversized_padding() {
        let service = service();
        let token = Token::from_base64(&service.encrypt(&[0; 16], b"qwerty").unwrap()).unwrap();

        // the last plaintext byte is 0x0a; flipping the matching iv byte to claim 0x20 overflows
        let mut iv = *token.iv();
        iv[15] ^= 0x0a ^ 0x20;
        let tampered = token.with_iv(iv).to_base64();

        assert!(matches!(service.decrypt(&tampered), Err(TokenError::Padding)));
    }

    #[test]
    fn decrypt_rejects_truncated_tokens() {
        let service = service();

        assert!(matches!(
            service.decrypt("AAAAAAAAAAAAAAAAAAAAAA=="),
            Err(TokenError::Truncated { len: 16 })
        ));
        assert!(matches!(service.decrypt("%%%"), Err(TokenError::Decode(_))));
    }

    #[test]
    fn closures_are_credential_checks() {
        let service = BlockCipherService::new(SecretKey::generate(), |user: &str, _: &str| {
            user.starts_with("admin")
        });

        assert!(service.login("admin-1", "anything").unwrap().is_some());
        assert!(service.login("qwerty", "asdf").unwrap().is_none());
    }

    #[test]
    fn secret_key_is_redacted() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains("abcdefghijklmnop"));
        assert!(rendered.contains("SecretKey(..)"));
    }
}
