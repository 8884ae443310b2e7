//! Precomputed blinding material, amortizing the cost of randomizer generation off
//! the comparison critical path.
//!
//! Randomizer generation dominates per-comparison latency because it requires a
//! modular exponentiation in the ciphertext group. [`TupleCache`] fills a bounded
//! ring of tuples eagerly and hands them out one at a time behind a
//! [`parking_lot::Mutex`], the same shared-mutable-state idiom this codebase uses
//! for its open-session tracking.

use crate::crypto::HomomorphicScheme;
use crate::error::{Error, Result};
use crate::integer::Integer;
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One Paillier-layer blinding tuple: `(r, r mod 2^l, [r], [r div 2^l])`.
///
/// Invariant: `r == (r div 2^l) * 2^l + (r mod 2^l)` and `0 <= r mod 2^l < 2^l`.
#[derive(Debug, Clone)]
pub struct ComparisonBlindingTuple<S: HomomorphicScheme> {
    /// The plaintext blinding factor, known only to the server.
    pub r: Integer,
    /// `r mod 2^l`, used as the server's input to the DGK round.
    pub r_mod_two_pow_l: Integer,
    /// `[r]` under the Paillier public key.
    pub encrypted_r: S::Ciphertext,
    /// `[r div 2^l]` under the Paillier public key.
    pub encrypted_r_div_two_pow_l: S::Ciphertext,
}

impl<S: HomomorphicScheme> ComparisonBlindingTuple<S> {
    /// Samples a fresh tuple: `r` uniform in `[0, 2^(l+1+kappa))`.
    pub fn sample(pk: &S::PublicKey, l: u32, kappa: u32, rng: &mut dyn RngCore) -> Result<Self> {
        let r = Integer::sample_uniform(l + 1 + kappa, rng);
        let two_pow_l = Integer::two_pow(l);
        let r_div_two_pow_l = r.div_floor(&two_pow_l);
        let r_mod_two_pow_l = r.mod_floor(&two_pow_l);
        let encrypted_r = S::encrypt(pk, &r, rng)?;
        let encrypted_r_div_two_pow_l = S::encrypt(pk, &r_div_two_pow_l, rng)?;
        Ok(ComparisonBlindingTuple {
            r,
            r_mod_two_pow_l,
            encrypted_r,
            encrypted_r_div_two_pow_l,
        })
    }
}

/// One DGK-round blinding tuple: `l+1` uniformly sampled non-zero masks and their
/// DGK encryptions, used to mask the per-bit comparison terms before they are
/// permuted and sent to the client.
#[derive(Debug, Clone)]
pub struct DgkBlindingTuple<D: HomomorphicScheme> {
    /// The plaintext masks `R_{-1}, ..., R_{l-1}`.
    pub masks: Vec<Integer>,
    /// `[R_i]` under the DGK public key, in the same order as `masks`.
    pub encrypted_masks: Vec<D::Ciphertext>,
}

impl<D: HomomorphicScheme> DgkBlindingTuple<D> {
    /// Samples a fresh tuple of `l + 1` non-zero masks.
    pub fn sample(pk: &D::PublicKey, l: u32, rng: &mut dyn RngCore) -> Result<Self> {
        let modulus = D::message_space_size(pk);
        let mut masks = Vec::with_capacity(l as usize + 1);
        let mut encrypted_masks = Vec::with_capacity(l as usize + 1);
        while masks.len() < l as usize + 1 {
            let candidate = Integer::sample_uniform(64, rng).rem_euclid_to(&modulus);
            if candidate.is_zero() {
                continue;
            }
            encrypted_masks.push(D::encrypt(pk, &candidate, rng)?);
            masks.push(candidate);
        }
        Ok(DgkBlindingTuple {
            masks,
            encrypted_masks,
        })
    }
}

/// A bounded ring of precomputed tuples, pop'd one at a time.
///
/// `reuse_allowed = false` turns a wraparound pop into [`Error::CacheExhaustion`]
/// instead of silently handing back a tuple that has already been used, since reuse
/// weakens the statistical-hiding argument for every comparison that shares it.
pub struct TupleCache<T> {
    inner: Mutex<CacheState<T>>,
    capacity: usize,
    reuse_allowed: bool,
}

struct CacheState<T> {
    ring: VecDeque<T>,
}

impl<T: Clone> TupleCache<T> {
    /// Builds a cache already filled to `capacity` using `sample`.
    pub fn new(
        capacity: usize,
        reuse_allowed: bool,
        mut sample: impl FnMut() -> Result<T>,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ConfigurationError(
                "cache capacity must be at least 1".into(),
            ));
        }
        let mut ring = VecDeque::with_capacity(capacity);
        for _ in 0..capacity {
            ring.push_back(sample()?);
        }
        Ok(TupleCache {
            inner: Mutex::new(CacheState { ring }),
            capacity,
            reuse_allowed,
        })
    }

    /// Pops the next tuple. When `reuse_allowed` is `true`, the tuple is pushed back
    /// to the tail of the ring so it will eventually be handed out again; when
    /// `false`, an empty ring after popping is a permanent [`Error::CacheExhaustion`].
    pub fn pop(&self) -> Result<T> {
        let mut state = self.inner.lock();
        let tuple = state.ring.pop_front().ok_or(Error::CacheExhaustion {
            capacity: self.capacity,
        })?;
        if self.reuse_allowed {
            state.ring.push_back(tuple.clone());
        } else if state.ring.is_empty() {
            tracing::warn!(capacity = self.capacity, "randomizer cache drained");
        }
        Ok(tuple)
    }

    /// Number of tuples currently available without triggering exhaustion.
    pub fn len(&self) -> usize {
        self.inner.lock().ring.len()
    }

    /// True iff no tuples remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tops the ring back up to `capacity` using `sample`, without disturbing
    /// tuples already queued. Used by the background refill task and available for
    /// manual refill in tests.
    pub fn refill(&self, mut sample: impl FnMut() -> Result<T>) -> Result<()> {
        let mut state = self.inner.lock();
        while state.ring.len() < self.capacity {
            state.ring.push_back(sample()?);
        }
        Ok(())
    }
}

/// The randomizer cache supplying fresh [`ComparisonBlindingTuple`]s to the
/// Paillier-layer comparison, per-session.
pub struct RandomizerCache<S: HomomorphicScheme> {
    tuples: TupleCache<ComparisonBlindingTuple<S>>,
    pk: S::PublicKey,
    l: u32,
    kappa: u32,
}

impl<S: HomomorphicScheme> RandomizerCache<S> {
    /// Eagerly fills the cache to `capacity`.
    pub fn new(
        pk: S::PublicKey,
        l: u32,
        kappa: u32,
        capacity: usize,
        reuse_allowed: bool,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        if l == 0 {
            return Err(Error::ConfigurationError("l must be at least 1".into()));
        }
        // sampling closure needs a &mut dyn RngCore; reborrow each call.
        let tuples = TupleCache::new(capacity, reuse_allowed, || {
            ComparisonBlindingTuple::sample(&pk, l, kappa, &mut *rng)
        })?;
        Ok(RandomizerCache { tuples, pk, l, kappa })
    }

    /// Pops the next blinding tuple.
    pub fn pop(&self) -> Result<ComparisonBlindingTuple<S>> {
        self.tuples.pop()
    }

    /// Number of tuples currently queued.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// True iff the cache is currently empty.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Spawns a background task that refills the ring whenever it drops below
    /// `low_water_mark`, polling every `interval`. Mirrors this codebase's pattern
    /// of a periodic `tokio::spawn` loop reloading shared state behind a lock.
    pub fn spawn_refill(
        self: &Arc<Self>,
        low_water_mark: usize,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()>
    where
        S::PublicKey: Clone,
    {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if cache.tuples.len() < low_water_mark {
                    let pk = cache.pk.clone();
                    let (l, kappa) = (cache.l, cache.kappa);
                    let mut rng = rand::rngs::StdRng::from_entropy();
                    let result = cache
                        .tuples
                        .refill(|| ComparisonBlindingTuple::sample(&pk, l, kappa, &mut rng));
                    if let Err(error) = result {
                        tracing::warn!(%error, "background randomizer refill failed");
                    } else {
                        tracing::trace!(len = cache.tuples.len(), "randomizer cache refilled");
                    }
                }
            }
        })
    }
}

/// The cache supplying fresh [`DgkBlindingTuple`]s to the DGK comparison round.
pub struct DgkRandomizerCache<D: HomomorphicScheme> {
    tuples: TupleCache<DgkBlindingTuple<D>>,
}

impl<D: HomomorphicScheme> DgkRandomizerCache<D> {
    /// Eagerly fills the cache to `capacity`.
    pub fn new(
        pk: D::PublicKey,
        l: u32,
        capacity: usize,
        reuse_allowed: bool,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let tuples = TupleCache::new(capacity, reuse_allowed, || {
            DgkBlindingTuple::sample(&pk, l, &mut *rng)
        })?;
        Ok(DgkRandomizerCache { tuples })
    }

    /// Pops the next DGK blinding tuple.
    pub fn pop(&self) -> Result<DgkBlindingTuple<D>> {
        self.tuples.pop()
    }

    /// Number of tuples currently queued.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct FakeCipher(i64);
    impl std::ops::Add for FakeCipher {
        type Output = FakeCipher;
        fn add(self, rhs: FakeCipher) -> FakeCipher {
            FakeCipher(self.0 + rhs.0)
        }
    }
    impl std::ops::Neg for FakeCipher {
        type Output = FakeCipher;
        fn neg(self) -> FakeCipher {
            FakeCipher(-self.0)
        }
    }
    impl std::ops::Mul<Integer> for FakeCipher {
        type Output = FakeCipher;
        fn mul(self, rhs: Integer) -> FakeCipher {
            FakeCipher(self.0 * rhs.to_i64().unwrap_or(0))
        }
    }
    impl serde::Serialize for FakeCipher {
        fn serialize<Se: serde::Serializer>(&self, s: Se) -> std::result::Result<Se::Ok, Se::Error> {
            self.0.serialize(s)
        }
    }
    impl<'de> serde::Deserialize<'de> for FakeCipher {
        fn deserialize<De: serde::Deserializer<'de>>(d: De) -> std::result::Result<Self, De::Error> {
            Ok(FakeCipher(i64::deserialize(d)?))
        }
    }

    #[test]
    fn pop_without_reuse_exhausts_after_capacity() {
        let mut n = 0i64;
        let cache: TupleCache<i64> = TupleCache::new(3, false, || {
            n += 1;
            Ok(n)
        })
        .unwrap();
        assert_eq!(cache.pop().unwrap(), 1);
        assert_eq!(cache.pop().unwrap(), 2);
        assert_eq!(cache.pop().unwrap(), 3);
        assert!(matches!(cache.pop(), Err(Error::CacheExhaustion { capacity: 3 })));
    }

    #[test]
    fn pop_with_reuse_wraps_around() {
        let mut n = 0i64;
        let cache: TupleCache<i64> = TupleCache::new(2, true, || {
            n += 1;
            Ok(n)
        })
        .unwrap();
        assert_eq!(cache.pop().unwrap(), 1);
        assert_eq!(cache.pop().unwrap(), 2);
        assert_eq!(cache.pop().unwrap(), 1);
    }

    #[test]
    fn comparison_blinding_tuple_invariant_holds() {
        let mut rng = rand::thread_rng();
        let pk = ();
        // Local stand-in scheme for the invariant check only.
        #[derive(Clone)]
        struct NoopScheme;
        impl HomomorphicScheme for NoopScheme {
            type Kind = crate::crypto::Paillier;
            type PublicKey = ();
            type SecretKey = ();
            type Ciphertext = FakeCipher;
            fn message_space_size(_pk: &()) -> Integer {
                Integer::two_pow(128)
            }
            fn encrypt(_pk: &(), m: &Integer, _rng: &mut dyn RngCore) -> Result<FakeCipher> {
                Ok(FakeCipher(m.to_i64().unwrap_or(0)))
            }
            fn encrypt_nonrandom(_pk: &(), m: &Integer) -> Result<FakeCipher> {
                Ok(FakeCipher(m.to_i64().unwrap_or(0)))
            }
            fn decrypt(_sk: &(), _pk: &(), c: &FakeCipher) -> Result<Integer> {
                Ok(Integer::from_i64(c.0))
            }
            fn encrypted_zero(_pk: &()) -> FakeCipher {
                FakeCipher(0)
            }
            fn encrypted_one(_pk: &()) -> FakeCipher {
                FakeCipher(1)
            }
            fn randomizer(_pk: &(), _rng: &mut dyn RngCore) -> Result<Integer> {
                Ok(Integer::from_i64(1))
            }
        }
        let tuple = ComparisonBlindingTuple::<NoopScheme>::sample(&pk, 16, 40, &mut rng).unwrap();
        let two_pow_l = Integer::two_pow(16);
        assert_eq!(
            tuple.r_mod_two_pow_l.clone() + tuple.r.div_floor(&two_pow_l) * two_pow_l,
            tuple.r
        );
        assert!(!tuple.r_mod_two_pow_l.is_negative());
    }
}
