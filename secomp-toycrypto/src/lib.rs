#![deny(missing_docs, clippy::unwrap_used)]
//! A toy additively homomorphic cryptosystem implementing
//! `secomp_core::crypto::HomomorphicScheme`, for tests and demos.
//!
//! **Not for production use**; see [`paillier`] for the caveats. Exposes a
//! single scheme, [`paillier::ToyPaillier`], instantiated under two
//! independent key pairs by callers that need both an "outer" and an "inner"
//! cryptosystem (as the secure comparison protocol does for its Paillier and
//! DGK layers).

mod keygen;
pub mod paillier;

pub use keygen::random_prime;
pub use paillier::{keygen as paillier_keygen, ToyCiphertext, ToyKind, ToyPaillier, ToyPublicKey, ToySecretKey};
