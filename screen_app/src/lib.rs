//! Pairing between an aircraft screen and a passenger's phone, and how to sit in the middle of it.
//!
//! Both sides run an unauthenticated Diffie-Hellman exchange and mix the shared secret with a
//! four digit code shown on the screen. An interceptor that runs its own exchange with each side
//! only lacks the code, and the screen's first encrypted message is enough to brute-force it.

use crypto_bigint::U64;
use tools::bigint::uint_dh::DiffieHellmannParams;

pub mod error;
pub mod handshake;
pub mod mitm;
pub mod peers;

pub use error::PairingError;
pub use handshake::{Handshake, PairingCode, Session, SessionKey};
pub use mitm::{Interceptor, SessionKeys};
pub use peers::{Phone, Screen};

pub const LIMBS: usize = U64::LIMBS;
pub type DhParams = DiffieHellmannParams<LIMBS>;

/// Toy group used by the screen firmware.
pub const DEFAULT_PARAMS: DhParams =
    DiffieHellmannParams::new(&U64::from_u32(37), U64::from_u32(5));

/// Pairing codes are drawn from `0..CODE_SPACE`.
pub const CODE_SPACE: u16 = 10_000;

/// The screen's greeting, the first message of the well known protocol.
pub const HELLO: &[u8] = b"hello";
