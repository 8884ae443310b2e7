//! Typed configuration for the randomizer cache, loadable from CLI args or
//! environment variables in this codebase's usual `clap`-derive style.

use std::time::Duration;

/// Configuration for a [`secomp_core::cache::RandomizerCache`] (or its DGK
/// counterpart).
///
/// A missing mandatory field surfaces as a `clap` parse error at startup; the
/// demo binaries in `secomp-server` map that into
/// [`secomp_core::error::Error::ConfigurationError`].
#[derive(Debug, Clone, clap::Parser)]
pub struct CacheConfig {
    /// Number of blinding tuples kept precomputed at all times.
    #[clap(long, env = "SECOMP_CACHE_CAPACITY", default_value = "64")]
    pub capacity: usize,

    /// Bit-length bound `l` on comparison operands: `|a|, |b| < 2^(l-1)`.
    #[clap(long, env = "SECOMP_CACHE_L", default_value = "16")]
    pub l: u32,

    /// Statistical hiding parameter `kappa`.
    #[clap(long, env = "SECOMP_CACHE_KAPPA", default_value = "80")]
    pub kappa: u32,

    /// Whether a drained cache may hand out an already-used tuple instead of
    /// failing with `CacheExhaustion`.
    #[clap(long, env = "SECOMP_CACHE_REUSE_ALLOWED", default_value = "false")]
    pub reuse_allowed: bool,

    /// Low-water mark triggering a background refill, when refill is enabled.
    #[clap(long, env = "SECOMP_CACHE_LOW_WATER_MARK", default_value = "16")]
    pub low_water_mark: usize,

    /// Poll interval for the background refill task.
    #[clap(
        long,
        env = "SECOMP_CACHE_REFILL_INTERVAL",
        default_value = "1s",
        value_parser = humantime::parse_duration
    )]
    pub refill_interval: Duration,
}

impl CacheConfig {
    /// Validates the configuration beyond what `clap` itself enforces.
    ///
    /// Mirrors this codebase's convention (`Environment::assert_is_dev`-style
    /// helper checks) of a cheap post-parse assertion pass distinct from parse
    /// errors.
    pub fn validate(&self) -> Result<(), secomp_core::error::Error> {
        if self.capacity == 0 {
            return Err(secomp_core::error::Error::ConfigurationError(
                "capacity must be at least 1".into(),
            ));
        }
        if self.l == 0 {
            return Err(secomp_core::error::Error::ConfigurationError(
                "l must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_parse_from_empty_args() {
        let config = CacheConfig::parse_from(["secomp"]);
        assert_eq!(config.capacity, 64);
        assert_eq!(config.l, 16);
        assert_eq!(config.kappa, 80);
        assert!(!config.reuse_allowed);
        config.validate().unwrap();
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let mut config = CacheConfig::parse_from(["secomp"]);
        config.capacity = 0;
        assert!(config.validate().is_err());
    }
}
