//! Key pair generation and the portable `{param, key}` key encoding.

pub mod envelope;
pub mod keys;

pub use envelope::KeyEnvelope;
pub use keys::{KeyPair, PublicKey, SecretKey};
