use rand::Rng;
use rand_core::CryptoRngCore;

use crate::{
    handshake::{Handshake, PairingCode},
    DhParams,
};

/// The aircraft screen. Picks the pairing code it displays.
#[derive(Debug)]
pub struct Screen {
    code: PairingCode,
}

impl Screen {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            code: PairingCode::generate(rng),
        }
    }

    /// What the passenger reads off the display.
    pub fn code(&self) -> PairingCode {
        self.code
    }

    pub fn begin(&self, params: &DhParams, rng: &mut impl CryptoRngCore) -> Handshake {
        Handshake::new(self.code, params, rng)
    }
}

/// The passenger's phone, holding whatever code was typed in.
#[derive(Debug)]
pub struct Phone {
    code: PairingCode,
}

impl Phone {
    pub fn new(code: PairingCode) -> Self {
        Self { code }
    }

    pub fn begin(&self, params: &DhParams, rng: &mut impl CryptoRngCore) -> Handshake {
        Handshake::new(self.code, params, rng)
    }
}
