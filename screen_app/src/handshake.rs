use std::fmt;

use crypto_bigint::{Encoding, U64};
use rand::Rng;
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};
use tools::{
    bigint::uint_dh::DynDiffieHellmannInstance,
    encrypt::{
        aes::{Aes256, AesEcb256},
        cipher::{strip_pkcs7_padding, CipherCore, CipherMode},
    },
};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{error::PairingError, DhParams, CODE_SPACE, HELLO, LIMBS};

/// Four digit code shown on the screen and typed into the phone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairingCode(u16);

impl PairingCode {
    /// Returns None for values outside `0..CODE_SPACE`.
    pub fn new(code: u16) -> Option<Self> {
        (code < CODE_SPACE).then_some(Self(code))
    }

    pub fn generate(rng: &mut impl Rng) -> Self {
        Self(rng.gen_range(0..CODE_SPACE))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// SHA-256 of the code as two big-endian bytes.
    pub fn pairing_key(self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(Sha256::digest(self.0.to_be_bytes()).into())
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// AES-256 key protecting one side of a pairing.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; 32]);

impl SessionKey {
    /// The Diffie-Hellman secret as 32 big-endian bytes, XORed with the pairing key.
    pub fn derive(dh_secret: &U64, pairing_key: &[u8; 32]) -> Self {
        let mut key = [0u8; 32];
        let secret = dh_secret.to_be_bytes();
        key[32 - secret.len()..].copy_from_slice(&secret);

        key.iter_mut()
            .zip(pairing_key.iter())
            .for_each(|(k, p)| *k ^= p);
        Self(key)
    }

    /// ECB encryption with PKCS#7 padding.
    pub fn seal(&self, msg: &[u8]) -> Result<Vec<u8>, PairingError> {
        let mut output = Vec::with_capacity(msg.len() + Aes256::BYTES);
        let mut ecb = AesEcb256::init(&self.0, CipherMode::Encrypt)?;
        ecb.update(msg, &mut output)?;
        ecb.end(&mut output)?;
        Ok(output)
    }

    /// ECB decryption. The padding is checked byte for byte.
    pub fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, PairingError> {
        let mut output = Vec::with_capacity(ciphertext.len());
        let mut ecb = AesEcb256::init(&self.0, CipherMode::Decrypt)?;
        ecb.update(ciphertext, &mut output)?;
        ecb.end(&mut output)?;
        Ok(strip_pkcs7_padding(&output, Aes256::BYTES)?.to_vec())
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// First phase of a pairing: the local Diffie-Hellman half and the pairing key.
///
/// The only way forward is [`Handshake::establish`], which consumes the handshake, so a peer
/// without a session key cannot be asked to encrypt anything.
pub struct Handshake {
    dh: DynDiffieHellmannInstance<LIMBS>,
    pairing_key: Zeroizing<[u8; 32]>,
}

impl Handshake {
    pub fn new(code: PairingCode, params: &DhParams, rng: &mut impl CryptoRngCore) -> Self {
        Self {
            dh: DynDiffieHellmannInstance::new(params, rng),
            pairing_key: code.pairing_key(),
        }
    }

    pub fn public_key(&self) -> U64 {
        self.dh.get_public_key()
    }

    /// Completes the exchange with whatever public key arrived from the other side.
    pub fn establish(self, peer_public_key: &U64) -> Session {
        let secret = self.dh.shared_secret(peer_public_key);
        debug!("pairing established");
        Session {
            key: SessionKey::derive(&secret, &self.pairing_key),
        }
    }
}

/// An established pairing.
#[derive(Debug)]
pub struct Session {
    key: SessionKey,
}

impl Session {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// The screen's greeting under the session key.
    pub fn hello(&self) -> Result<Vec<u8>, PairingError> {
        self.key.seal(HELLO)
    }

    pub fn encrypt(&self, msg: &[u8]) -> Result<Vec<u8>, PairingError> {
        self.key.seal(msg)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, PairingError> {
        self.key.open(ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tools::encode::hex::to_hex;

    #[test]
    fn pairing_key_hashes_big_endian_code() {
        let code = PairingCode::new(1234).unwrap();
        assert_eq!(
            to_hex(code.pairing_key().as_slice()),
            "4324ed3488d6e708d3631da067227633cf10dbc2f2df0c1a67553282670642bb"
        );
        assert_eq!(code.to_string(), "1234");
        assert_eq!(PairingCode::new(7).unwrap().to_string(), "0007");
    }

    #[test]
    fn pairing_code_range() {
        assert!(PairingCode::new(9_999).is_some());
        assert!(PairingCode::new(10_000).is_none());

        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            assert!(PairingCode::generate(&mut rng).value() < CODE_SPACE);
        }
    }

    #[test]
    fn session_key_places_secret_in_low_bytes() {
        let key = SessionKey::derive(&U64::from_u32(0x0102), &[0; 32]);
        let mut expected = [0u8; 32];
        expected[30] = 0x01;
        expected[31] = 0x02;
        assert!(key == SessionKey(expected));

        let key = SessionKey::derive(&U64::ZERO, &[0xff; 32]);
        assert!(key == SessionKey([0xff; 32]));
    }

    #[test]
    fn seal_and_open() {
        let key = SessionKey([3; 32]);
        let sealed = key.seal(HELLO).unwrap();

        assert_eq!(sealed.len(), 16);
        assert_eq!(key.open(&sealed).unwrap(), HELLO);
        assert_ne!(SessionKey([4; 32]).open(&sealed).ok(), Some(HELLO.to_vec()));
    }

    #[test]
    fn session_key_is_redacted() {
        assert_eq!(format!("{:?}", SessionKey([9; 32])), "SessionKey(..)");
    }
}
