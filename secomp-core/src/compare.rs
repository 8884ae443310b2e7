//! The Paillier-layer secure comparison algorithm.
//!
//! Given two Paillier ciphertexts `a`, `b` with plaintexts bounded by `2^(l-1)`,
//! computes `[a >= b]` by blinding the difference `d = 2^l + a - b` with a fresh
//! randomizer, having the client reveal only the blinded quotient
//! `z div 2^l`, and correcting for the borrow at bit `l` using a DGK comparison
//! round (`secomp_core::dgk`). Grounded directly on the division-by-`2^l` trick
//! used by this codebase's own secure comparison routine: `d`'s sign bit is
//! recovered without ever decrypting `d` itself.

use crate::cache::ComparisonBlindingTuple;
use crate::crypto::HomomorphicScheme;
use crate::error::{Error, Result};
use crate::integer::Integer;
use rand::RngCore;

/// Where a single comparison currently stands.
///
/// The two awaited steps (`AwaitZDiv`, `AwaitDgkT`) are data-independent and are
/// driven concurrently by the orchestrating session; this enum exists for
/// tracing and for session bookkeeping, not as a hard gate on call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonState {
    /// No messages exchanged yet.
    Idle,
    /// `[z]` sent, waiting for `[z div 2^l]`.
    AwaitZDiv,
    /// Waiting for the DGK round's `[t]`.
    AwaitDgkT,
    /// Both sub-results received; `[gamma]` has been computed.
    Done,
    /// A fatal error ended the comparison; the session must be discarded.
    Failed,
}

/// Encrypts `value` under `pk`, after checking it satisfies the precision bound
/// `|value| < 2^(l-1)` required for the division trick to recover the correct
/// sign bit. This is the validation point named in the design notes: the
/// original implementation this protocol is drawn from left it unchecked.
pub fn encrypt_operand<S: HomomorphicScheme>(
    pk: &S::PublicKey,
    value: &Integer,
    l: u32,
    rng: &mut dyn RngCore,
) -> Result<S::Ciphertext> {
    validate_precision(value, l)?;
    S::encrypt(pk, value, rng)
}

fn validate_precision(value: &Integer, l: u32) -> Result<()> {
    let bound = Integer::two_pow(l - 1);
    if value.abs() >= bound {
        return Err(Error::PrecisionBound {
            l,
            detail: "operand magnitude exceeds 2^(l-1)".into(),
        });
    }
    Ok(())
}

/// Computes `[z] = [2^l] + [a] + (-[b]) + [r]`, the blinded difference sent to
/// the client.
pub fn blind_difference<S: HomomorphicScheme>(
    pk: &S::PublicKey,
    l: u32,
    a: &S::Ciphertext,
    b: &S::Ciphertext,
    tuple: &ComparisonBlindingTuple<S>,
) -> Result<S::Ciphertext> {
    let two_pow_l_enc = S::encrypt_nonrandom(pk, &Integer::two_pow(l))?;
    Ok(two_pow_l_enc + a.clone() + (-b.clone()) + tuple.encrypted_r.clone())
}

/// Splits a decrypted blinded value `z` into `(z mod 2^l, z div 2^l)`.
///
/// Called by the client after decrypting `[z]`; never called by the server,
/// which must not learn `z`.
pub fn split_z(z: &Integer, l: u32) -> (Integer, Integer) {
    let two_pow_l = Integer::two_pow(l);
    (z.mod_floor(&two_pow_l), z.div_floor(&two_pow_l))
}

/// Combines the client's `[z div 2^l]`, the cached `[r div 2^l]` and the DGK
/// round's borrow bit `[t]` into `[d div 2^l]`, whose least significant bit is
/// the comparison result.
pub fn finish_compare<S: HomomorphicScheme>(
    z_div_two_pow_l: &S::Ciphertext,
    tuple: &ComparisonBlindingTuple<S>,
    t: &S::Ciphertext,
) -> S::Ciphertext {
    z_div_two_pow_l.clone() + (-(tuple.encrypted_r_div_two_pow_l.clone() + t.clone()))
}
