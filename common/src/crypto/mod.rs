mod hash;

pub mod ed25519;
pub mod error;
pub mod random;

pub use error::CryptoError;
pub use hash::*;

/// Public key type used throughout the ledger worker.
pub type PublicKey = ed25519::Ed25519PublicKey;
/// Signature type used throughout the ledger worker.
pub type Signature = ed25519::Ed25519Signature;
