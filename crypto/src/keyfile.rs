//! Node key persistence — a hex-encoded Ed25519 private key on disk.
//!
//! The first run of a node generates a fresh key and writes it to the
//! configured path; later runs load the same identity back.

use crate::keys::{generate_keypair, keypair_from_private};
use meridian_types::{KeyPair, PrivateKey};
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed key file: {0}")]
    Malformed(String),
}

/// Load the node key from `path`, generating and persisting a fresh key
/// when no file exists yet.
pub fn load_or_generate_key(path: &Path) -> Result<KeyPair, KeyFileError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_key(contents.trim()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let pair = generate_keypair();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, hex::encode(pair.private.0))?;
            Ok(pair)
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse a hex-encoded 32-byte private key.
pub fn parse_key(hex_key: &str) -> Result<KeyPair, KeyFileError> {
    let bytes = hex::decode(hex_key).map_err(|e| KeyFileError::Malformed(e.to_string()))?;
    let seed: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeyFileError::Malformed(format!("expected 32 bytes, got {}", bytes.len())))?;
    Ok(keypair_from_private(PrivateKey(seed)))
}
