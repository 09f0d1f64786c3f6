use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::error::PinError;
use crate::utils::{PIN_HASH_SIZE, PIN_ITERATIONS, PIN_LENGTH, PIN_SALT_SIZE};

// ============================================================================
// PIN STORE
// ============================================================================

/// Optional 4-digit unlock PIN, stored as `base64(hash):base64(salt)`.
/// No file means no PIN is required.
pub struct PinStore {
    path: PathBuf,
}

impl PinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    pub fn set(&self, pin: &str) -> Result<(), PinError> {
        validate_pin(pin)?;

        let mut salt = [0u8; PIN_SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let hash = hash_pin(pin, &salt);

        let record = format!("{}:{}", STANDARD.encode(&*hash), STANDARD.encode(salt));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        fs::write(&self.path, record).map_err(|e| self.io(e))?;
        info!("PIN set");
        Ok(())
    }

    /// Returns `Ok(true)` when no PIN is configured.
    pub fn verify(&self, pin: &str) -> Result<bool, PinError> {
        let record = match fs::read_to_string(&self.path) {
            Ok(record) => record,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(self.io(e)),
        };

        let (stored_hash, salt) = parse_record(&record)?;
        if validate_pin(pin).is_err() {
            warn!("PIN rejected");
            return Ok(false);
        }

        let candidate = hash_pin(pin, &salt);
        let matched = constant_time_eq(&candidate[..], &stored_hash);
        if !matched {
            warn!("PIN rejected");
        }
        Ok(matched)
    }

    pub fn remove(&self) -> Result<(), PinError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("PIN removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io(e)),
        }
    }

    fn io(&self, source: io::Error) -> PinError {
        PinError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

pub fn validate_pin(pin: &str) -> Result<(), PinError> {
    if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PinError::InvalidPin)
    }
}

fn hash_pin(pin: &str, salt: &[u8]) -> Zeroizing<[u8; PIN_HASH_SIZE]> {
    let mut out = Zeroizing::new([0u8; PIN_HASH_SIZE]);
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, PIN_ITERATIONS, &mut *out);
    out
}

fn parse_record(record: &str) -> Result<(Vec<u8>, Vec<u8>), PinError> {
    let (hash, salt) = record.trim().split_once(':').ok_or(PinError::Malformed)?;
    let hash = STANDARD.decode(hash).map_err(|_| PinError::Malformed)?;
    let salt = STANDARD.decode(salt).map_err(|_| PinError::Malformed)?;
    if hash.len() != PIN_HASH_SIZE || salt.is_empty() {
        return Err(PinError::Malformed);
    }
    Ok((hash, salt))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PinStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PinStore::new(dir.path().join("clickboard.pin"));
        (dir, store)
    }

    #[test]
    fn no_pin_file_means_unlocked() {
        let (_dir, pins) = store();
        assert!(!pins.is_set());
        assert!(pins.verify("0000").unwrap());
    }

    #[test]
    fn set_then_verify() {
        let (_dir, pins) = store();
        pins.set("4821").unwrap();
        assert!(pins.is_set());
        assert!(pins.verify("4821").unwrap());
        assert!(!pins.verify("4822").unwrap());
        assert!(!pins.verify("48").unwrap());
    }

    #[test]
    fn record_is_hash_colon_salt() {
        let (_dir, pins) = store();
        pins.set("1234").unwrap();
        let record = fs::read_to_string(pins.path()).unwrap();
        let (hash, salt) = record.split_once(':').unwrap();
        assert_eq!(STANDARD.decode(hash).unwrap().len(), PIN_HASH_SIZE);
        assert_eq!(STANDARD.decode(salt).unwrap().len(), PIN_SALT_SIZE);
    }

    #[test]
    fn same_pin_gets_different_salt() {
        let (_dir, pins) = store();
        pins.set("1234").unwrap();
        let first = fs::read_to_string(pins.path()).unwrap();
        pins.set("1234").unwrap();
        let second = fs::read_to_string(pins.path()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn rejects_non_numeric_pins() {
        let (_dir, pins) = store();
        assert!(matches!(pins.set("12a4"), Err(PinError::InvalidPin)));
        assert!(matches!(pins.set("12345"), Err(PinError::InvalidPin)));
        assert!(!pins.is_set());
    }

    #[test]
    fn malformed_file_does_not_unlock() {
        let (_dir, pins) = store();
        fs::write(pins.path(), "garbage").unwrap();
        assert!(matches!(pins.verify("1234"), Err(PinError::Malformed)));
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, pins) = store();
        pins.set("9999").unwrap();
        pins.remove().unwrap();
        pins.remove().unwrap();
        assert!(!pins.is_set());
    }
}
