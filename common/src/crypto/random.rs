/// Cryptographically secure random number generation
///
/// This module provides secure random number generation using the operating
/// system's CSPRNG (Cryptographically Secure Pseudo-Random Number Generator).
///
/// SECURITY: All production crypto operations MUST use OsRng, not thread_rng()
/// - OsRng uses OS-provided entropy (e.g., /dev/urandom on Unix)
/// - thread_rng() is NOT cryptographically secure and MUST NOT be used for:
///   - Nonce generation
///   - Key generation
///   - Signature randomness
///   - Any consensus-critical operations
use rand::rngs::OsRng;
use rand::RngCore;

/// Generate cryptographically secure random bytes
///
/// SAFETY: Uses OS-provided CSPRNG (OsRng) for true randomness
///
/// # Example
/// ```
/// use norsh_common::crypto::random::secure_random_bytes;
///
/// // Generate 32 random bytes for a lock id
/// let nonce = secure_random_bytes::<32>();
/// ```
pub fn secure_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate cryptographically secure random u64
///
/// SAFETY: Uses OS-provided CSPRNG (OsRng)
///
/// # Example
/// ```
/// use norsh_common::crypto::random::secure_random_u64;
///
/// let random_nonce = secure_random_u64();
/// ```
pub fn secure_random_u64() -> u64 {
    OsRng.next_u64()
}

/// Generate cryptographically secure random u32
///
/// SAFETY: Uses OS-provided CSPRNG (OsRng)
pub fn secure_random_u32() -> u32 {
    OsRng.next_u32()
}
