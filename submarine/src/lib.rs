//! Token forgery against a CBC-encrypted login service.
//!
//! The [`service::BlockCipherService`] issues base64 tokens of the form `IV || ciphertext` for
//! authenticated users. Nothing authenticates the IV, so [`forge::forge`] can rewrite the first
//! plaintext block of any observed token into a chosen username without ever seeing the key.

pub mod config;
pub mod error;
pub mod forge;
pub mod service;
pub mod token;

pub use config::ServiceConfig;
pub use error::TokenError;
pub use forge::forge;
pub use service::{BlockCipherService, CredentialCheck, FixedCredentials, SecretKey};
pub use token::Token;

/// AES block length, and therefore the IV length.
pub const BLOCK_SIZE: usize = 16;
