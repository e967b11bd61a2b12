use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const KEY_LENGTH: usize = 32;
const IV_LENGTH: usize = 16;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption key must be {KEY_LENGTH} bytes of hex, got {0} bytes")]
    InvalidKeyLength(usize),
    #[error("encryption key is not valid hex")]
    InvalidKeyEncoding,
    #[error("encrypted field is malformed")]
    MalformedField,
    #[error("decryption failed")]
    DecryptionError,
}

/// AES-256-CBC cipher for individual string fields.
///
/// Fields are encoded as `hex(iv):hex(ciphertext)` with a fresh random IV per
/// call, so encrypting the same text twice gives different output.
#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; KEY_LENGTH],
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldCipher(..)")
    }
}

impl FieldCipher {
    pub fn from_hex(key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(key.trim()).map_err(|_| CryptoError::InvalidKeyEncoding)?;
        let key: [u8; KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength(bytes.len()))?;
        Ok(Self { key })
    }

    pub fn encrypt(&self, text: &str) -> String {
        let mut iv = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(text.as_bytes());

        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let (iv_hex, ciphertext_hex) = encoded.split_once(':').ok_or(CryptoError::MalformedField)?;

        let iv: [u8; IV_LENGTH] = hex::decode(iv_hex)
            .map_err(|_| CryptoError::MalformedField)?
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::MalformedField)?;
        let ciphertext = hex::decode(ciphertext_hex).map_err(|_| CryptoError::MalformedField)?;

        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CryptoError::DecryptionError)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionError)
    }
}
