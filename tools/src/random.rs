use rand::{thread_rng, RngCore};

use crate::encrypt::cipher::CipherCore;

/// Fills a fresh vector from the thread-local CSPRNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// A random block for C, suitable as an IV.
///
/// Never reuse an IV under the same key: two CBC messages sharing one leak the XOR of their
/// first plaintext blocks.
pub fn random_block<C: CipherCore>() -> Vec<u8> {
    random_bytes(C::BYTES)
}

/// A random key for C.
pub fn random_key<C: CipherCore>() -> Vec<u8> {
    random_bytes(C::KEY_BYTES)
}

#[test]
fn test_random_sizes() {
    use crate::encrypt::aes::{Aes128, Aes256};

    assert_eq!(random_block::<Aes128>().len(), 16);
    assert_eq!(random_key::<Aes128>().len(), 16);
    assert_eq!(random_key::<Aes256>().len(), 32);
    assert_ne!(random_block::<Aes128>(), random_block::<Aes128>());
}
