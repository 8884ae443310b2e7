#![deny(missing_docs, clippy::unwrap_used)]
//! Core protocol logic for two-party secure comparison over additively
//! homomorphic ciphertexts.
//!
//! This crate is transport- and cryptosystem-agnostic: it depends only on the
//! [`crypto::HomomorphicScheme`] capability trait and exposes the pure
//! combinatorial logic of the randomizer cache ([`cache`]), the DGK bit-comparison
//! round ([`dgk`]), and the Paillier-layer comparison algorithm ([`compare`]).
//! Session orchestration, the wire transport, and the client/server role split
//! live in `secomp-client`/`secomp-server`, which depend on this crate.

pub mod cache;
pub mod compare;
pub mod crypto;
pub mod dgk;
pub mod error;
pub mod integer;

pub use cache::{ComparisonBlindingTuple, DgkBlindingTuple, DgkRandomizerCache, RandomizerCache};
pub use compare::ComparisonState;
pub use crypto::{Dgk, HomomorphicScheme, Paillier, SchemeKind};
pub use error::{Error, Result};
pub use integer::Integer;
