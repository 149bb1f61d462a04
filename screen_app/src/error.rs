use thiserror::Error;
use tools::CipherError;

#[derive(Debug, Error)]
pub enum PairingError {
    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("no pairing code in 0..{tried} opens the greeting")]
    CodeNotFound { tried: u16 },
}
