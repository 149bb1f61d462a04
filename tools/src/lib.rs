pub mod bigint;
pub mod encode;
pub mod encrypt;
pub mod error;
pub mod random;

pub use error::{CipherError, DecodeError};
