use aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::crypto::KeyMaterial;
use crate::error::CorruptReason;
use crate::utils::{IV_SIZE, KEY_SIZE};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256-CBC encrypt `plaintext` under a fresh random IV and return
/// `base64(IV || ciphertext)`.
pub fn encrypt_blob(plaintext: &[u8], key: &KeyMaterial) -> Result<String, CorruptReason> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .map_err(|_| CorruptReason::InvalidKeyLength(key.len()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(IV_SIZE + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(blob))
}

/// Reverse of [`encrypt_blob`]. Surrounding whitespace is ignored.
pub fn decrypt_blob(text: &str, key: &KeyMaterial) -> Result<Vec<u8>, CorruptReason> {
    if key.len() != KEY_SIZE {
        return Err(CorruptReason::InvalidKeyLength(key.len()));
    }

    let raw = STANDARD
        .decode(text.trim())
        .map_err(|_| CorruptReason::Base64)?;
    if raw.len() < IV_SIZE * 2 {
        return Err(CorruptReason::TooShort);
    }

    let (iv, ciphertext) = raw.split_at(IV_SIZE);
    if ciphertext.len() % IV_SIZE != 0 {
        return Err(CorruptReason::Decrypt);
    }

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), iv)
        .map_err(|_| CorruptReason::InvalidKeyLength(key.len()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CorruptReason::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> KeyMaterial {
        KeyMaterial::from_bytes(vec![0x42; KEY_SIZE])
    }

    #[test]
    fn decrypts_what_it_encrypts() {
        let blob = encrypt_blob(b"clipboard payload", &key()).unwrap();
        assert_eq!(decrypt_blob(&blob, &key()).unwrap(), b"clipboard payload");
    }

    #[test]
    fn fresh_iv_per_call() {
        let a = encrypt_blob(b"same", &key()).unwrap();
        let b = encrypt_blob(b"same", &key()).unwrap();
        assert_ne!(a, b);

        let raw_a = STANDARD.decode(&a).unwrap();
        let raw_b = STANDARD.decode(&b).unwrap();
        assert_ne!(raw_a[..IV_SIZE], raw_b[..IV_SIZE]);
    }

    #[test]
    fn empty_plaintext_is_one_padding_block() {
        let blob = encrypt_blob(b"", &key()).unwrap();
        assert_eq!(STANDARD.decode(&blob).unwrap().len(), IV_SIZE * 2);
        assert!(decrypt_blob(&blob, &key()).unwrap().is_empty());
    }

    #[test]
    fn tolerates_trailing_newline() {
        let blob = encrypt_blob(b"x", &key()).unwrap();
        assert_eq!(decrypt_blob(&format!("{}\r\n", blob), &key()).unwrap(), b"x");
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        let short = KeyMaterial::from_bytes(vec![1; 16]);
        assert!(matches!(
            encrypt_blob(b"x", &short),
            Err(CorruptReason::InvalidKeyLength(16))
        ));
        let blob = encrypt_blob(b"x", &key()).unwrap();
        assert!(matches!(
            decrypt_blob(&blob, &short),
            Err(CorruptReason::InvalidKeyLength(16))
        ));
    }

    #[test]
    fn malformed_input_is_reported() {
        assert!(matches!(
            decrypt_blob("***not base64***", &key()),
            Err(CorruptReason::Base64)
        ));
        assert!(matches!(
            decrypt_blob(&STANDARD.encode([0u8; 20]), &key()),
            Err(CorruptReason::TooShort)
        ));
        assert!(matches!(
            decrypt_blob(&STANDARD.encode([0u8; 40]), &key()),
            Err(CorruptReason::Decrypt)
        ));
    }
}
