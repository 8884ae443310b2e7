#![deny(missing_docs, clippy::unwrap_used)]
//! The server side of the secure comparison protocol.
//!
//! A server holds only ciphertexts and the public keys of both the outer
//! (Paillier-style) and inner (DGK-style) cryptosystems; it never sees a
//! plaintext operand or an unblinded intermediate value. [`Session`] is the
//! main entry point: it owns a matched server/client pair wired together
//! over an in-process channel and exposes [`Session::compare`] /
//! [`Session::compare_threshold`].
//!
//! Projects embedding this library supply their own [`secomp_core::crypto::HomomorphicScheme`]
//! implementations for the outer and inner cryptosystems (`secomp-toycrypto`'s
//! `ToyPaillier` is provided for tests and local experimentation only, and is
//! not suitable for production use) and their own [`secomp_client::Channel`]
//! if messages need to cross a process boundary.

pub mod compare_server;
pub mod config;
pub mod dgk_server;
pub mod session;

pub use compare_server::SecureComparisonServer;
pub use config::ServerConfig;
pub use session::Session;
