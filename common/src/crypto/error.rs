use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid hash length: {len} bytes, expected {expected} bytes")]
    InvalidHashLength { len: usize, expected: usize },

    #[error("failed to decode base64: {0}")]
    InvalidBase64(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}
