use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::info;
use zeroize::Zeroizing;

use crate::error::StoreError;
use crate::utils::KEY_SIZE;

// ============================================================================
// KEY MATERIAL
// ============================================================================

/// Raw symmetric key bytes, wiped from memory on drop.
///
/// The length is whatever the key file holds; a wrong size only surfaces
/// when the key is used to decrypt.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Zeroizing<Vec<u8>>);

impl KeyMaterial {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn generate() -> Self {
        let mut bytes = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED; {}])", self.0.len())
    }
}

// ============================================================================
// KEY MANAGER
// ============================================================================

pub struct KeyManager {
    path: PathBuf,
}

impl KeyManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the key file verbatim if present, otherwise generate a fresh
    /// 256-bit key and persist it. An existing key file is never rewritten.
    pub fn get_or_create_key(&self) -> Result<KeyMaterial, StoreError> {
        if let Some(key) = self.read_key()? {
            return Ok(key);
        }

        let key = KeyMaterial::generate();
        match self.install(|file| file.write_all(key.as_bytes())) {
            Ok(()) => {
                info!("generated new key file");
                Ok(key)
            }
            // Someone else created it between our check and the write.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                self.read_key()?.ok_or_else(|| self.key_io(e))
            }
            Err(e) => Err(self.key_io(e)),
        }
    }

    /// Read the key if the file exists. Never creates anything.
    pub fn read_key(&self) -> Result<Option<KeyMaterial>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(KeyMaterial::from_bytes(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.key_io(e)),
        }
    }

    /// Write the key next to its final path, then link it into place.
    /// The key file only ever appears complete, and an existing one is
    /// never replaced.
    fn install<F>(&self, fill: F) -> io::Result<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.tmp_path();
        let result = write_private(&tmp_path, fill).and_then(|()| self.link_into_place(&tmp_path));
        let _ = fs::remove_file(&tmp_path);
        result
    }

    fn link_into_place(&self, tmp_path: &Path) -> io::Result<()> {
        match fs::hard_link(tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
            // No hard links on this filesystem.
            Err(_) if !self.path.exists() => fs::rename(tmp_path, &self.path),
            Err(_) => Err(io::ErrorKind::AlreadyExists.into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn key_io(&self, source: io::Error) -> StoreError {
        StoreError::KeyIo {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_private<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    fill(&mut file)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_key_once_and_reuses_it() {
        let dir = tempfile::tempdir().unwrap();
        let manager = KeyManager::new(dir.path().join("clickboard.key"));
        assert!(!manager.exists());

        let first = manager.get_or_create_key().unwrap();
        assert_eq!(first.len(), KEY_SIZE);
        assert!(manager.exists());

        let modified = fs::metadata(manager.path()).unwrap().modified().unwrap();
        let second = manager.get_or_create_key().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            fs::metadata(manager.path()).unwrap().modified().unwrap(),
            modified
        );
    }

    #[test]
    fn existing_key_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clickboard.key");
        fs::write(&path, [7u8; 5]).unwrap();

        let key = KeyManager::new(&path).get_or_create_key().unwrap();
        assert_eq!(key.as_bytes(), &[7u8; 5]);
        assert_eq!(fs::read(&path).unwrap(), vec![7u8; 5]);
    }

    #[test]
    fn read_key_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = KeyManager::new(dir.path().join("clickboard.key"));
        assert!(manager.read_key().unwrap().is_none());
        assert!(!manager.exists());
    }

    #[test]
    fn unwritable_location_is_key_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        let manager = KeyManager::new(blocker.join("clickboard.key"));
        let err = manager.get_or_create_key().unwrap_err();
        assert!(matches!(err, StoreError::KeyIo { .. }));
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        let key = KeyMaterial::from_bytes(vec![0xAB; 32]);
        let shown = format!("{:?}", key);
        assert_eq!(shown, "KeyMaterial([REDACTED; 32])");
    }

    #[test]
    fn failed_write_leaves_no_key_behind() {
        let dir = tempfile::tempdir().unwrap();
        let manager = KeyManager::new(dir.path().join("clickboard.key"));

        let err = manager
            .install(|file| {
                file.write_all(&[1, 2, 3])?;
                Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
            })
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::StorageFull);
        assert!(!manager.exists());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());

        let key = manager.get_or_create_key().unwrap();
        assert_eq!(key.len(), KEY_SIZE);
        assert_eq!(fs::read(manager.path()).unwrap(), key.as_bytes());
    }

    #[test]
    fn install_never_replaces_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let manager = KeyManager::new(dir.path().join("clickboard.key"));
        fs::write(manager.path(), [9u8; KEY_SIZE]).unwrap();

        let err = manager.install(|file| file.write_all(&[0; KEY_SIZE])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(manager.path()).unwrap(), vec![9u8; KEY_SIZE]);
        assert!(!dir.path().join("clickboard.key.tmp").exists());
    }
}
