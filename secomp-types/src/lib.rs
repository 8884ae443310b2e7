#![deny(missing_docs)]
//! Shared type definitions for the secure comparison protocol's server and
//! client.
//!
//! This crate groups together the strongly-typed values exchanged across the
//! comparison protocol's wire boundary:
//!
//! * Session and per-comparison identifiers with consistent serialization and
//!   display implementations (see [`session`]).
//! * The wire message envelope exchanged between server and client (see
//!   [`message`]).
//! * The `clap`-derived configuration for the randomizer cache (see
//!   [`config`]).

pub mod config;
pub mod message;
pub mod session;

pub use config::CacheConfig;
pub use message::ComparisonMessage;
pub use session::{ComparisonCounter, SessionId};
