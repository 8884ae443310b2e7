//! Minimal probabilistic prime generation, good enough for test-sized keys.
//!
//! Not constant-time, not hardened against any form of side channel. Exists
//! only so `secomp-toycrypto` can mint Paillier-shaped key pairs without a
//! dependency on a production bignum-crypto crate.

use num_bigint::{BigInt, RandBigInt, Sign};
use num_integer::Integer as _;
use num_traits::{One, Zero};
use rand::RngCore;

const MILLER_RABIN_ROUNDS: u32 = 40;

fn is_probable_prime(candidate: &BigInt, rng: &mut dyn RngCore) -> bool {
    if candidate < &BigInt::from(2) {
        return false;
    }
    for small in [2u32, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31] {
        let small = BigInt::from(small);
        if candidate == &small {
            return true;
        }
        if (candidate % &small).is_zero() {
            return false;
        }
    }

    let one = BigInt::one();
    let two = &one + &one;
    let n_minus_one = candidate - &one;
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while (&d % &two).is_zero() {
        d /= &two;
        r += 1;
    }

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = rng.gen_bigint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, candidate);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r - 1 {
            x = x.modpow(&two, candidate);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generates a random probable prime of exactly `bits` bits (top bit set).
pub fn random_prime(bits: u64, rng: &mut dyn RngCore) -> BigInt {
    loop {
        let mut candidate = rng.gen_bigint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if candidate.sign() == Sign::Minus {
            candidate = -candidate;
        }
        if is_probable_prime(&candidate, rng) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn generates_prime_of_requested_size() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(7);
        let p = random_prime(128, &mut rng);
        assert!(p.bits() >= 127);
        assert!(is_probable_prime(&p, &mut rng));
    }
}
