//! Ed25519 key generation and address derivation.

use crate::hash::blake2b_256;
use ed25519_dalek::SigningKey;
use meridian_types::{Address, KeyPair, PrivateKey, PublicKey};
use rand::rngs::OsRng;

/// Generate a new Ed25519 key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    keypair_from_signing(SigningKey::generate(&mut OsRng))
}

/// Derive a key pair deterministically from a 32-byte seed.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    keypair_from_signing(SigningKey::from_bytes(seed))
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes())
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// Derive the 20-byte account address of a public key: the trailing bytes
/// of its Blake2b-256 digest.
pub fn address_from_public(public: &PublicKey) -> Address {
    let digest = blake2b_256(&public.0);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}

fn keypair_from_signing(signing: SigningKey) -> KeyPair {
    KeyPair {
        public: PublicKey(signing.verifying_key().to_bytes()),
        private: PrivateKey(signing.to_bytes()),
    }
}
