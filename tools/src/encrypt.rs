pub mod xor {

    /// Basic XOR Encryption/Decryption
    pub struct XOREnc {}

    impl XOREnc {
        /// XORs two byte slices with the same length into output.
        pub fn fixed_encrypt(bytes1: &[u8], bytes2: &[u8], output: &mut Vec<u8>) {
            assert_eq!(bytes1.len(), bytes2.len());
            output.extend(bytes1.iter().zip(bytes2.iter()).map(|(u, v)| u ^ v));
        }

        /// XORs any number of equally long slices together.
        pub fn fold(slices: &[&[u8]]) -> Vec<u8> {
            let Some((first, rest)) = slices.split_first() else {
                return Vec::new();
            };
            rest.iter().fold(first.to_vec(), |acc, v| {
                let mut output = Vec::with_capacity(acc.len());
                Self::fixed_encrypt(&acc, v, &mut output);
                output
            })
        }
    }

    #[test]
    fn test_fixed_encrypt() {
        let mut output = Vec::with_capacity(1);
        XOREnc::fixed_encrypt(&[0x80], &[0x38], &mut output);
        assert_eq!(output, vec![0x80 ^ 0x38]);
    }

    #[test]
    fn test_fold() {
        let a: &[u8] = &[0x0f, 0xf0];
        let b: &[u8] = &[0xff, 0xff];
        let c: &[u8] = &[0x01, 0x10];
        assert_eq!(
            XOREnc::fold(&[a, b, c]),
            vec![0x0f ^ 0xff ^ 0x01, 0xf0 ^ 0xff ^ 0x10]
        );
        assert_eq!(XOREnc::fold(&[a]), a.to_vec());
        assert!(XOREnc::fold(&[]).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_fixed_encrypt_length_mismatch() {
        XOREnc::fixed_encrypt(&[0x01, 0x02], &[0x03], &mut Vec::new());
    }
}

pub mod cipher {
    use bytes::{Buf, BufMut, BytesMut};

    use super::xor::XOREnc;
    use crate::error::CipherError;

    /// Appends PKCS#7 padding to the buffer so its length becomes a multiple of len.
    /// An already aligned buffer receives a whole block of padding, so at least one byte is
    /// always added.
    pub fn pkcs7padding(buf: &mut BytesMut, len: usize) {
        assert!(0 < len && len < 256, "block length must fit into a single byte");
        let pad = len - (buf.len() % len);
        buf.put_bytes(pad as u8, pad);
    }

    /// Copying variant of [`pkcs7padding`].
    pub fn pad(bytes: &[u8], len: usize) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(bytes.len() + len);
        buf.put(bytes);
        pkcs7padding(&mut buf, len);
        buf.to_vec()
    }

    /// Strips as many trailing bytes as the last byte claims.
    ///
    /// The padding bytes themselves are never inspected, so any final byte up to the buffer length is
    /// accepted. A forged first block relies on exactly this. Only an empty buffer or a claim longer
    /// than the buffer is rejected.
    pub fn unpad(padded: &[u8]) -> Result<&[u8], CipherError> {
        let pad = *padded.last().ok_or(CipherError::InvalidPadding)? as usize;
        if pad > padded.len() {
            return Err(CipherError::InvalidPadding);
        }
        Ok(&padded[..padded.len() - pad])
    }

    /// Checks for valid PKCS#7 padding with block length len and strips it.
    pub fn strip_pkcs7_padding(padded: &[u8], len: usize) -> Result<&[u8], CipherError> {
        if padded.is_empty() || padded.len() % len != 0 {
            return Err(CipherError::InvalidPadding);
        }

        let pad = padded[padded.len() - 1];
        if pad == 0 || usize::from(pad) > len {
            return Err(CipherError::InvalidPadding);
        }

        let (text, padding) = padded.split_at(padded.len() - usize::from(pad));
        if padding.iter().all(|&v| v == pad) {
            Ok(text)
        } else {
            Err(CipherError::InvalidPadding)
        }
    }

    /// Basic trait for Block Ciphers like AES.
    pub trait CipherCore: Sized {
        /// Block length in bytes.
        const BYTES: usize;
        /// Key length in bytes.
        const KEY_BYTES: usize;

        fn init(key: &[u8]) -> Result<Self, CipherError>;
        fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError>;
        fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError>;
    }

    /// Modes for Encryption or Decryption.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum CipherMode {
        Encrypt,
        Decrypt,
    }

    /// ECB Implementation for a generic Cipher implementation.
    pub struct ECBMode<C: CipherCore> {
        cipher_mode: CipherMode,
        core: C,
        buf: BytesMut,
    }

    impl<C: CipherCore> ECBMode<C> {
        /// Initializes with a given key. The length of key must be C::KEY_BYTES.
        pub fn init(key: &[u8], cipher_mode: CipherMode) -> Result<Self, CipherError> {
            Ok(Self {
                cipher_mode,
                core: C::init(key)?,
                buf: BytesMut::with_capacity(1024),
            })
        }

        /// Processes every complete block in the buffer.
        pub fn update(&mut self, text: &[u8], output: &mut Vec<u8>) -> Result<(), CipherError> {
            self.buf.put(text);

            while self.buf.len() >= C::BYTES {
                let block = &self.buf[..C::BYTES];
                match self.cipher_mode {
                    CipherMode::Decrypt => output.extend(self.core.decrypt(block)?),
                    CipherMode::Encrypt => output.extend(self.core.encrypt(block)?),
                }
                self.buf.advance(C::BYTES);
            }
            Ok(())
        }

        /// Consumes self. Encryption pads and flushes the final block, decryption rejects leftovers.
        /// Decrypted output keeps its padding.
        pub fn end(mut self, output: &mut Vec<u8>) -> Result<(), CipherError> {
            match self.cipher_mode {
                CipherMode::Encrypt => {
                    pkcs7padding(&mut self.buf, C::BYTES);
                    output.extend(self.core.encrypt(&self.buf[..C::BYTES])?);
                    Ok(())
                }
                CipherMode::Decrypt if self.buf.is_empty() => Ok(()),
                CipherMode::Decrypt => Err(CipherError::TruncatedCiphertext {
                    len: self.buf.len(),
                }),
            }
        }
    }

    /// CBC Mode for Block Cipher
    pub struct CBCMode<C: CipherCore> {
        core: C,
        // previous ciphertext block (initially the iv) followed by pending input
        buf: BytesMut,
        cipher_mode: CipherMode,
    }

    impl<C: CipherCore> CBCMode<C> {
        /// Initializes with a given key and iv. The iv must be exactly one block long.
        pub fn init(key: &[u8], iv: &[u8], cipher_mode: CipherMode) -> Result<Self, CipherError> {
            if iv.len() != C::BYTES {
                return Err(CipherError::InvalidBlockLength {
                    expected: C::BYTES,
                    actual: iv.len(),
                });
            }
            let mut buf = BytesMut::with_capacity(1024);
            buf.put(iv);
            Ok(Self {
                cipher_mode,
                core: C::init(key)?,
                buf,
            })
        }

        /// Processes every complete block in the buffer.
        pub fn update(&mut self, text: &[u8], output: &mut Vec<u8>) -> Result<(), CipherError> {
            self.buf.put(text);

            while self.buf.len() >= 2 * C::BYTES {
                self.single_block(output)?;
                self.buf.advance(C::BYTES);
            }
            Ok(())
        }

        /// Single block step. Assumes that two blocks are present in the buffer.
        fn single_block(&mut self, output: &mut Vec<u8>) -> Result<(), CipherError> {
            let prev = self.buf[..C::BYTES].to_vec();
            let curr = &mut self.buf[C::BYTES..2 * C::BYTES];

            let mut xor = Vec::with_capacity(C::BYTES);
            match self.cipher_mode {
                CipherMode::Encrypt => {
                    XOREnc::fixed_encrypt(&prev, curr, &mut xor);
                    let enc = self.core.encrypt(&xor)?;
                    // the ciphertext chains into the next block
                    curr.copy_from_slice(&enc);
                    output.extend(enc);
                }
                CipherMode::Decrypt => {
                    let dec = self.core.decrypt(curr)?;
                    XOREnc::fixed_encrypt(&dec, &prev, &mut xor);
                    output.extend(xor);
                }
            }
            Ok(())
        }

        /// Consumes self. Encryption pads and flushes the final block, decryption rejects leftovers.
        /// Decrypted output keeps its padding.
        pub fn end(mut self, output: &mut Vec<u8>) -> Result<(), CipherError> {
            match self.cipher_mode {
                CipherMode::Encrypt => {
                    pkcs7padding(&mut self.buf, C::BYTES);
                    self.single_block(output)
                }
                CipherMode::Decrypt if self.buf.len() == C::BYTES => Ok(()),
                CipherMode::Decrypt => Err(CipherError::TruncatedCiphertext {
                    len: self.buf.len() - C::BYTES,
                }),
            }
        }

        /// Runs a whole message through a fresh instance.
        pub fn process(
            key: &[u8],
            iv: &[u8],
            cipher_mode: CipherMode,
            text: &[u8],
        ) -> Result<Vec<u8>, CipherError> {
            let mut output = Vec::with_capacity(text.len() + C::BYTES);
            let mut cbc = Self::init(key, iv, cipher_mode)?;
            cbc.update(text, &mut output)?;
            cbc.end(&mut output)?;
            Ok(output)
        }
    }

    #[test]
    fn test_pkcs7_padding() {
        let mut buf = BytesMut::with_capacity(200);
        buf.put(b"YELLOW SUBMARINE".as_slice());
        pkcs7padding(&mut buf, 20);
        assert_eq!(&buf[..], b"YELLOW SUBMARINE\x04\x04\x04\x04".as_slice());

        let mut buf = BytesMut::with_capacity(200);
        buf.put(b"YELLOW SUBMARINE".as_slice());
        pkcs7padding(&mut buf, 16);
        assert_eq!(buf.len(), 32);
        assert!(buf[16..].iter().all(|&v| v == 16));
    }

    #[test]
    fn test_pad_bounds() {
        for len in 0..=64usize {
            let text = vec![b'x'; len];
            let padded = pad(&text, 16);
            let added = padded.len() - len;

            assert_eq!(padded.len() % 16, 0);
            assert!((1..=16).contains(&added));
            assert!(padded[len..].iter().all(|&v| usize::from(v) == added));
            if len % 16 == 0 {
                assert_eq!(added, 16);
            }
            assert_eq!(unpad(&padded).unwrap(), text.as_slice());
            assert_eq!(strip_pkcs7_padding(&padded, 16).unwrap(), text.as_slice());
        }
    }

    #[test]
    fn lax_unpadding() {
        assert_eq!(unpad(b"ICE ICE BABY\x04\x04\x04\x04").unwrap(), b"ICE ICE BABY");
        // only the final byte counts
        assert_eq!(unpad(b"ICE ICE BABY\x01\x02\x03\x04").unwrap(), b"ICE ICE BABY");
        assert_eq!(unpad(b"abc\x00").unwrap(), b"abc\x00");
        assert_eq!(unpad(b"\x04\x04\x04\x04").unwrap(), b"");

        assert!(matches!(unpad(b""), Err(CipherError::InvalidPadding)));
        assert!(matches!(unpad(b"ab\x05"), Err(CipherError::InvalidPadding)));
    }

    #[test]
    fn padding_validation() {
        assert_eq!(
            strip_pkcs7_padding(b"ICE ICE BABY\x04\x04\x04\x04", 16).unwrap(),
            b"ICE ICE BABY"
        );
        assert!(strip_pkcs7_padding(b"ICE ICE BABY\x05\x05\x05\x05", 16).is_err());
        assert!(strip_pkcs7_padding(b"ICE ICE BABY\x01\x02\x03\x04", 16).is_err());
        assert!(strip_pkcs7_padding(b"ICE ICE BABY\x03\x03\x03", 16).is_err());
        assert!(strip_pkcs7_padding(b"ICE ICE BABY\x00\x00\x00\x00", 16).is_err());
        assert!(strip_pkcs7_padding(b"", 16).is_err());
    }
}

pub mod aes {
    use openssl::{
        cipher::{Cipher, CipherRef},
        cipher_ctx::CipherCtx,
    };
    use zeroize::Zeroizing;

    use super::cipher::{CBCMode, CipherCore, ECBMode};
    use crate::error::CipherError;

    pub type AesEcb128 = ECBMode<Aes128>;
    pub type AesCbc128 = CBCMode<Aes128>;
    pub type AesEcb256 = ECBMode<Aes256>;

    /// Runs exactly one block through the raw ECB primitive without padding.
    fn single_block(
        cipher: &CipherRef,
        key: &[u8],
        block: &[u8],
        encrypt: bool,
    ) -> Result<Vec<u8>, CipherError> {
        let mut cipher_ctx = CipherCtx::new()?;
        if encrypt {
            cipher_ctx.encrypt_init(Some(cipher), Some(key), None)?;
        } else {
            cipher_ctx.decrypt_init(Some(cipher), Some(key), None)?;
        }
        cipher_ctx.set_padding(false);

        let mut output = Vec::with_capacity(2 * block.len());
        cipher_ctx.cipher_update_vec(block, &mut output)?;
        cipher_ctx.cipher_final_vec(&mut output)?;
        Ok(output)
    }

    macro_rules! aes_core {
        ($(#[$doc:meta])* $name:ident, $key_bytes:expr, $cipher:path) => {
            $(#[$doc])*
            pub struct $name {
                key: Zeroizing<Vec<u8>>,
            }

            impl $name {
                fn check_block(block: &[u8]) -> Result<(), CipherError> {
                    if block.len() == Self::BYTES {
                        Ok(())
                    } else {
                        Err(CipherError::InvalidBlockLength {
                            expected: Self::BYTES,
                            actual: block.len(),
                        })
                    }
                }
            }

            impl CipherCore for $name {
                const BYTES: usize = 16;
                const KEY_BYTES: usize = $key_bytes;

                fn init(key: &[u8]) -> Result<Self, CipherError> {
                    if key.len() != Self::KEY_BYTES {
                        return Err(CipherError::InvalidKeyLength {
                            expected: Self::KEY_BYTES,
                            actual: key.len(),
                        });
                    }
                    Ok(Self {
                        key: Zeroizing::new(key.to_vec()),
                    })
                }

                fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
                    Self::check_block(block)?;
                    single_block($cipher(), &self.key, block, true)
                }

                fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
                    Self::check_block(block)?;
                    single_block($cipher(), &self.key, block, false)
                }
            }
        };
    }

    aes_core!(
        /// AES with a 128 bit key
        Aes128,
        16,
        Cipher::aes_128_ecb
    );
    aes_core!(
        /// AES with a 256 bit key
        Aes256,
        32,
        Cipher::aes_256_ecb
    );

    #[test]
    fn test_aes128_known_answer() {
        // FIPS-197 appendix C.1
        let key = crate::encode::hex::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        let plain = crate::encode::hex::from_hex("00112233445566778899aabbccddeeff").unwrap();
        let core = Aes128::init(&key).unwrap();

        let enc = core.encrypt(&plain).unwrap();
        assert_eq!(
            crate::encode::hex::to_hex(&enc),
            "69c4e0d86a7b0430d8cdb78070b4c55a"
        );
        assert_eq!(core.decrypt(&enc).unwrap(), plain);
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(matches!(
            Aes128::init(&[0; 15]),
            Err(CipherError::InvalidKeyLength { expected: 16, actual: 15 })
        ));
        assert!(Aes256::init(&[0; 16]).is_err());

        let core = Aes256::init(&[7; 32]).unwrap();
        assert!(matches!(
            core.encrypt(&[0; 15]),
            Err(CipherError::InvalidBlockLength { expected: 16, actual: 15 })
        ));
    }

    #[test]
    fn test_cbc_round_trip() {
        use super::cipher::{unpad, CipherMode};
        use crate::random::random_bytes;

        let key = random_bytes(Aes128::KEY_BYTES);
        for len in 0..=64 {
            let iv = random_bytes(Aes128::BYTES);
            let text = random_bytes(len);

            let enc = AesCbc128::process(&key, &iv, CipherMode::Encrypt, &text).unwrap();
            assert_eq!(enc.len(), (len / 16 + 1) * 16);

            let dec = AesCbc128::process(&key, &iv, CipherMode::Decrypt, &enc).unwrap();
            assert_eq!(unpad(&dec).unwrap(), text.as_slice());
        }
    }

    #[test]
    fn test_cbc_chunked_updates_match_one_shot() {
        use super::cipher::CipherMode;

        let key = [3u8; 16];
        let iv = [9u8; 16];
        let text = b"we all live in a yellow submarine, a yellow submarine";

        let one_shot = AesCbc128::process(&key, &iv, CipherMode::Encrypt, text).unwrap();

        let mut chunked = Vec::new();
        let mut cbc = AesCbc128::init(&key, &iv, CipherMode::Encrypt).unwrap();
        for chunk in text.chunks(5) {
            cbc.update(chunk, &mut chunked).unwrap();
        }
        cbc.end(&mut chunked).unwrap();

        assert_eq!(one_shot, chunked);
    }

    #[test]
    fn test_cbc_rejects_truncated_ciphertext() {
        use super::cipher::CipherMode;

        let result = AesCbc128::process(&[1; 16], &[2; 16], CipherMode::Decrypt, &[0; 20]);
        assert!(matches!(result, Err(CipherError::TruncatedCiphertext { len: 4 })));

        let result = AesCbc128::init(&[1; 16], &[2; 8], CipherMode::Decrypt);
        assert!(matches!(
            result,
            Err(CipherError::InvalidBlockLength { expected: 16, actual: 8 })
        ));
    }

    #[test]
    fn test_ecb_round_trip() {
        use super::cipher::{strip_pkcs7_padding, CipherMode};

        let key = [5u8; 32];
        let mut enc = Vec::new();
        let mut ecb = AesEcb256::init(&key, CipherMode::Encrypt).unwrap();
        ecb.update(b"hello", &mut enc).unwrap();
        ecb.end(&mut enc).unwrap();
        assert_eq!(enc.len(), 16);

        let mut dec = Vec::new();
        let mut ecb = AesEcb256::init(&key, CipherMode::Decrypt).unwrap();
        ecb.update(&enc, &mut dec).unwrap();
        ecb.end(&mut dec).unwrap();
        assert_eq!(strip_pkcs7_padding(&dec, 16).unwrap(), b"hello");
    }
}
