//! Cryptographic primitives for Meridian: Blake2b hashing, Ed25519 block
//! signing, key generation, and node key persistence.

pub mod hash;
pub mod keyfile;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi};
pub use keyfile::{load_or_generate_key, KeyFileError};
pub use keys::{
    address_from_public, generate_keypair, keypair_from_private, keypair_from_seed,
    public_from_private,
};
pub use sign::{sign_message, verify_signature};
