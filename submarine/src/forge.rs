//! IV substitution against unauthenticated CBC tokens.
//!
//! CBC decrypts the first block as `m = D_k(c) ^ iv`. The IV travels in clear, so for any wanted
//! first block `m'` the IV `iv' = m' ^ m ^ iv` gives `D_k(c) ^ iv' = m'`. Only the IV changes;
//! `D_k(c)` and the key are never needed.
//!
//! The substitution reaches the first block and nothing else. Usernames that pad past one block
//! keep their remaining blocks, and the forger does not check for that.

use std::collections::HashMap;

use tools::encrypt::xor::XOREnc;
use tracing::debug;

use crate::{error::TokenError, service::pad, token::Token, BLOCK_SIZE};

/// The IV that turns the first block of `known_user` into the first block of `target_user`.
pub fn forge_iv(iv: &[u8; BLOCK_SIZE], known_user: &[u8], target_user: &[u8]) -> [u8; BLOCK_SIZE] {
    let m = pad(known_user);
    let m_prime = pad(target_user);

    let mut forged = [0u8; BLOCK_SIZE];
    forged.copy_from_slice(&XOREnc::fold(&[
        &m_prime[..BLOCK_SIZE],
        &m[..BLOCK_SIZE],
        iv.as_slice(),
    ]));
    forged
}

/// Rewrites a token that decrypts to `known_user` into one that decrypts to `target_user`.
///
/// Garbage comes out, rather than an error, when the token does not actually hold `known_user`
/// or either name pads to more than one block.
pub fn forge(observed: &str, known_user: &str, target_user: &str) -> Result<String, TokenError> {
    let token = Token::from_base64(observed)?;
    let iv = forge_iv(token.iv(), known_user.as_bytes(), target_user.as_bytes());

    debug!(known_user, target_user, "forged iv");
    Ok(token.with_iv(iv).to_base64())
}

/// Forges from any one of a set of observed `(username, token)` pairs.
///
/// Returns `Ok(None)` when nothing has been observed yet.
pub fn forge_from_observations(
    observed: &HashMap<String, String>,
    target_user: &str,
) -> Result<Option<String>, TokenError> {
    observed
        .iter()
        .next()
        .map(|(user, token)| forge(token, user, target_user))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{BlockCipherService, FixedCredentials, SecretKey};

    #[test]
    fn forged_iv_is_involution() {
        let iv = [0x5a; BLOCK_SIZE];
        let forged = forge_iv(&iv, b"qwerty", b"fionn");

        assert_ne!(forged, iv);
        assert_eq!(forge_iv(&forged, b"fionn", b"qwerty"), iv);
        assert_eq!(forge_iv(&iv, b"qwerty", b"qwerty"), iv);
    }

    #[test]
    fn forge_keeps_ciphertext() {
        let service = BlockCipherService::new(SecretKey::generate(), FixedCredentials::default());
        let token = service.login("qwerty", "asdf").unwrap().unwrap();
        let forged = forge(&token, "qwerty", "fionn").unwrap();

        let original = Token::from_base64(&token).unwrap();
        let forged = Token::from_base64(&forged).unwrap();
        assert_eq!(original.ciphertext(), forged.ciphertext());
        assert_ne!(original.iv(), forged.iv());
    }

    #[test]
    fn forge_surfaces_decode_errors() {
        assert!(matches!(
            forge("!!!", "qwerty", "fionn"),
            Err(TokenError::Decode(_))
        ));
        assert!(matches!(
            forge("AAAA", "qwerty", "fionn"),
            Err(TokenError::Truncated { len: 3 })
        ));
    }

    #[test]
    fn forge_from_observations_picks_an_entry() {
        let service = BlockCipherService::new(SecretKey::generate(), FixedCredentials::default());
        let token = service.login("qwerty", "asdf").unwrap().unwrap();

        let mut observed = HashMap::new();
        assert!(forge_from_observations(&observed, "david").unwrap().is_none());

        observed.insert("qwerty".to_string(), token);
        let forged = forge_from_observations(&observed, "david").unwrap().unwrap();
        assert_eq!(service.decrypt(&forged).unwrap(), b"david");
    }
}
