//! Configuration for a secure comparison server: the randomizer cache
//! (flattened from `secomp_types::CacheConfig`) plus the server's own
//! session-lifetime settings, loadable from CLI arguments or environment
//! variables.

use clap::Parser;
use secomp_types::CacheConfig;
use std::time::Duration;

/// Top-level configuration for a secure comparison server.
#[derive(Debug, Clone, Parser)]
pub struct ServerConfig {
    /// Randomizer cache configuration.
    #[clap(flatten)]
    pub cache: CacheConfig,

    /// Max time a created comparison session stays open while awaiting a
    /// client response before it is torn down as a protocol violation.
    #[clap(
        long,
        env = "SECOMP_SESSION_TIMEOUT",
        default_value = "5s",
        value_parser = humantime::parse_duration
    )]
    pub session_timeout: Duration,

    /// Buffer size of the in-process channel used when no external transport
    /// is configured.
    #[clap(long, env = "SECOMP_CHANNEL_BUFFER", default_value = "32")]
    pub channel_buffer: usize,
}

impl ServerConfig {
    /// Validates the configuration, including the nested cache configuration.
    pub fn validate(&self) -> Result<(), secomp_core::error::Error> {
        self.cache.validate()
    }
}
