#![deny(missing_docs, clippy::unwrap_used)]
//! The client side of the secure comparison protocol.
//!
//! Holds the decryption keys and plays the client role of both the
//! Paillier-layer comparison ([`compare_client`]) and the DGK bit-comparison
//! round ([`dgk_client`]), communicating with its paired server over a
//! [`channel::Channel`].

pub mod channel;
pub mod compare_client;
pub mod dgk_client;

pub use channel::{duplex, Channel, InProcessChannel};
pub use compare_client::{SecureComparisonClient, ZResponse};
