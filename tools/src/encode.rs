pub mod hex {
    use crate::error::DecodeError;

    /// Converts from a given hex string to a byte vector. Surrounding whitespace is ignored.
    pub fn from_hex(hex: &str) -> Result<Vec<u8>, DecodeError> {
        Ok(::hex::decode(hex.trim())?)
    }

    /// Converts bytes to a lowercase hex string.
    pub fn to_hex(bytes: &[u8]) -> String {
        ::hex::encode(bytes)
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(from_hex("ffff").unwrap(), vec![0xff, 0xff]);
        assert_eq!(from_hex(" 0fff\n").unwrap(), vec![0x0f, 0xff]);
        assert!(from_hex("fff").is_err());
        assert!(from_hex("zz").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x0f, 0xff]), "0fff");
        assert_eq!(to_hex(&[0xff, 0xff]), "ffff");
    }
}

pub mod base64 {
    use ::base64::{engine::general_purpose::STANDARD, Engine};

    use crate::error::DecodeError;

    /// Encodes a byte slice into padded standard base64.
    pub fn to_base64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    /// Decodes padded standard base64. Surrounding whitespace is ignored, anything else
    /// outside the alphabet is an error.
    pub fn from_base64(text: &str) -> Result<Vec<u8>, DecodeError> {
        Ok(STANDARD.decode(text.trim())?)
    }

    #[test]
    fn test_to_base64() {
        assert_eq!(to_base64(b"Man"), "TWFu");
        assert_eq!(to_base64(b"Ma"), "TWE=");
        assert_eq!(to_base64(b"M"), "TQ==");
    }

    #[test]
    fn test_from_base64() {
        assert_eq!(from_base64("TWFu").unwrap(), b"Man");
        assert_eq!(from_base64("TWE=\n").unwrap(), b"Ma");
        assert_eq!(from_base64("TQ==").unwrap(), b"M");

        assert!(from_base64("TQ=").is_err());
        assert!(from_base64("T*==").is_err());
    }
}

pub mod ascii {

    /// Renders bytes as text, optionally escaping everything that is not printable ASCII.
    pub fn to_ascii(bytes: &[u8], escape: bool) -> String {
        if escape {
            bytes
                .iter()
                .flat_map(|v| v.escape_ascii())
                .map(char::from)
                .collect()
        } else {
            bytes.iter().map(|&v| char::from(v)).collect()
        }
    }

    #[test]
    fn test_ascii() {
        assert_eq!(to_ascii(b"abc", false), "abc");
        assert_eq!(to_ascii(b"abc\n", true), "abc\\n");
        assert_eq!(to_ascii(b"bob\x0d\x0d", true), "bob\\r\\r");
    }
}
