pub mod cipher;
pub mod key;
pub mod pin;

pub use cipher::{decrypt_blob, encrypt_blob};
pub use key::{KeyManager, KeyMaterial};
pub use pin::PinStore;
