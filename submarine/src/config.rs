use tools::encode::hex::from_hex;

use crate::{
    error::TokenError,
    service::{BlockCipherService, FixedCredentials, SecretKey},
};

/// Stand-in key used by the demonstration. The deployed service has its own.
pub const DEMO_KEY: &[u8; 16] = b"abcdefghijklmnop";

/// Everything needed to stand up a [`BlockCipherService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub key: SecretKey,
    pub credentials: FixedCredentials,
}

impl ServiceConfig {
    /// Builds a config from a hex encoded 16 byte key.
    pub fn from_hex_key(
        key_hex: &str,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let key = SecretKey::from_slice(&from_hex(key_hex)?)?;
        Ok(Self {
            key,
            credentials: FixedCredentials::new(user, password),
        })
    }

    pub fn build(self) -> BlockCipherService<FixedCredentials> {
        BlockCipherService::new(self.key, self.credentials)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            key: SecretKey::new(*DEMO_KEY),
            credentials: FixedCredentials::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tools::encode::hex::to_hex;

    #[test]
    fn hex_key_matches_demo_key() {
        let service = ServiceConfig::from_hex_key(&to_hex(DEMO_KEY), "qwerty", "asdf")
            .unwrap()
            .build();
        let token = service.login("qwerty", "asdf").unwrap().unwrap();

        let demo = ServiceConfig::default().build();
        assert_eq!(demo.decrypt(&token).unwrap(), b"qwerty");
    }

    #[test]
    fn rejects_bad_keys() {
        assert!(matches!(
            ServiceConfig::from_hex_key("00ff", "qwerty", "asdf"),
            Err(TokenError::Cipher(_))
        ));
        assert!(matches!(
            ServiceConfig::from_hex_key("not hex", "qwerty", "asdf"),
            Err(TokenError::Decode(_))
        ));
    }
}
