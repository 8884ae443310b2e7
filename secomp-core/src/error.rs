//! Error kinds shared by the server and client sides of the secure comparison protocol.

/// Result alias used throughout the secure comparison protocol.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the secure comparison protocol.
///
/// Display text never includes plaintext or blinded intermediate values: an attacker
/// reading logs should learn only which step failed, never what was being compared.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `CacheConfig` or protocol parameter was invalid (e.g. `l == 0`, missing capacity).
    #[error("invalid configuration: {0}")]
    ConfigurationError(String),
    /// The underlying `HomomorphicScheme` reported an encrypt/decrypt failure.
    #[error("cryptosystem operation failed: {0}")]
    CryptoFailure(String),
    /// A peer sent a malformed message, an out-of-order counter, or an unknown session id.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// A comparison operand did not satisfy `|x| < 2^(l-1)`.
    #[error("operand exceeds precision bound for l={l}: {detail}")]
    PrecisionBound {
        /// The configured bit-length bound.
        l: u32,
        /// Human readable detail, free of the offending value.
        detail: String,
    },
    /// The randomizer cache was exhausted and `reuse_allowed` is `false`.
    #[error("randomizer cache exhausted (capacity={capacity})")]
    CacheExhaustion {
        /// The cache's configured capacity.
        capacity: usize,
    },
}
