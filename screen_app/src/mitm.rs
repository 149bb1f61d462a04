use crypto_bigint::U64;
use rand_core::CryptoRngCore;
use rayon::prelude::*;
use tools::bigint::uint_dh::DynDiffieHellmannInstance;
use tracing::info;

use crate::{
    error::PairingError,
    handshake::{PairingCode, SessionKey},
    DhParams, CODE_SPACE, HELLO, LIMBS,
};

/// Session keys of both legs of an intercepted pairing.
#[derive(Debug)]
pub struct SessionKeys {
    pub server: SessionKey,
    pub client: SessionKey,
}

/// Sits between screen and phone and runs a separate exchange with each.
pub struct Interceptor {
    toward_server: DynDiffieHellmannInstance<LIMBS>,
    toward_client: DynDiffieHellmannInstance<LIMBS>,
}

impl Interceptor {
    pub fn new(params: &DhParams, rng: &mut impl CryptoRngCore) -> Self {
        Self {
            toward_server: DynDiffieHellmannInstance::new(params, rng),
            toward_client: DynDiffieHellmannInstance::new(params, rng),
        }
    }

    /// Public key handed to the screen in place of the phone's.
    pub fn public_key_for_server(&self) -> U64 {
        self.toward_server.get_public_key()
    }

    /// Public key handed to the phone in place of the screen's.
    pub fn public_key_for_client(&self) -> U64 {
        self.toward_client.get_public_key()
    }

    /// Tries every pairing code against the screen's intercepted greeting.
    ///
    /// Candidates are independent, so they are spread over the rayon pool; the lowest matching
    /// code wins. A candidate matches when the strict padding check passes and the plaintext is
    /// exactly the greeting.
    pub fn recover_code(
        &self,
        hello: &[u8],
        server_public_key: &U64,
    ) -> Result<PairingCode, PairingError> {
        let secret = self.toward_server.shared_secret(server_public_key);

        let code = (0..CODE_SPACE)
            .into_par_iter()
            .filter_map(PairingCode::new)
            .find_first(|code| {
                let key = SessionKey::derive(&secret, &code.pairing_key());
                matches!(key.open(hello), Ok(msg) if msg == HELLO)
            })
            .ok_or(PairingError::CodeNotFound { tried: CODE_SPACE })?;

        info!(%code, "recovered pairing code");
        Ok(code)
    }

    /// Rebuilds the session key each side derived, given the code.
    pub fn session_keys(
        &self,
        code: PairingCode,
        server_public_key: &U64,
        client_public_key: &U64,
    ) -> SessionKeys {
        let pairing_key = code.pairing_key();
        SessionKeys {
            server: SessionKey::derive(
                &self.toward_server.shared_secret(server_public_key),
                &pairing_key,
            ),
            client: SessionKey::derive(
                &self.toward_client.shared_secret(client_public_key),
                &pairing_key,
            ),
        }
    }
}
