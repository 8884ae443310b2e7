//! The DGK bit-comparison round.
//!
//! Given a server-held `l`-bit integer `alpha` and a client-held `l`-bit integer
//! `beta`, this produces an encrypted bit `t` (under the *outer*, Paillier-style
//! scheme) with `t = 1` iff `alpha > beta`, without either party learning the
//! other's bits. Follows the DGK comparison protocol as corrected in Veugen,
//! "Improving the DGK comparison protocol" (2012): the server masks each
//! per-bit term with a fresh non-zero random element before permuting and
//! sending the terms to the client, so the client learns only whether *some*
//! term is zero, never which one or by how much.

use crate::cache::DgkBlindingTuple;
use crate::crypto::HomomorphicScheme;
use crate::error::{Error, Result};
use crate::integer::Integer;
use rand::seq::SliceRandom;
use rand::RngCore;

/// The random sign the server flips a coin on for each DGK round.
///
/// The masked term at the most-significant differing bit is zero exactly
/// when `s_term + (alpha_i - beta_i) == 0`; with `s_term = +1` that happens
/// at `beta_i > alpha_i`, so `delta_b = [beta > alpha]` and the borrow bit is
/// its complement, `t = !delta_b`. With `s_term = -1` the zero instead falls
/// at `alpha_i > beta_i`, so `delta_b = [alpha > beta] = t` directly. This
/// hides from the client which direction of comparison the masked terms
/// encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// `t` is the complement of the client's reported bit.
    Plus,
    /// `t` tracks the client's reported bit directly.
    Minus,
}

impl Sign {
    fn sample(rng: &mut dyn RngCore) -> Sign {
        if rng.next_u32() % 2 == 0 {
            Sign::Plus
        } else {
            Sign::Minus
        }
    }

    fn as_integer(self) -> Integer {
        match self {
            Sign::Plus => Integer::from_i64(1),
            Sign::Minus => Integer::from_i64(-1),
        }
    }
}

/// Extracts the low `l` bits of `value` as a bit vector, least-significant first.
///
/// # Panics
/// Panics if `value` is negative; the comparison layer is responsible for
/// reducing operands into their non-negative representatives before this is
/// called.
pub fn bits_of(value: &Integer, l: u32) -> Vec<bool> {
    (0..l).map(|i| value.bit(i)).collect()
}

/// Encrypts each bit of `value`'s low `l` bits under the DGK public key.
///
/// Used by the client to prepare its share of the comparison (`beta`) and
/// requires no secret key material.
pub fn encrypt_bits<D: HomomorphicScheme>(
    pk: &D::PublicKey,
    value: &Integer,
    l: u32,
    rng: &mut dyn RngCore,
) -> Result<Vec<D::Ciphertext>> {
    bits_of(value, l)
        .into_iter()
        .map(|bit| D::encrypt(pk, &Integer::from_i64(bit as i64), rng))
        .collect()
}

fn encrypted_xor<D: HomomorphicScheme>(
    pk: &D::PublicKey,
    alpha_bit: bool,
    beta_bit_enc: &D::Ciphertext,
) -> D::Ciphertext {
    if alpha_bit {
        D::encrypted_one(pk) + (-beta_bit_enc.clone())
    } else {
        beta_bit_enc.clone()
    }
}

fn alpha_minus_beta<D: HomomorphicScheme>(
    pk: &D::PublicKey,
    alpha_bit: bool,
    beta_bit_enc: &D::Ciphertext,
) -> D::Ciphertext {
    if alpha_bit {
        D::encrypted_one(pk) + (-beta_bit_enc.clone())
    } else {
        -beta_bit_enc.clone()
    }
}

/// Server side of one DGK round: builds the `l + 1` masked, permuted terms to
/// send to the client, and the sign it chose so it can later interpret the
/// client's reported bit.
///
/// `encrypted_beta_bits` must have exactly `l` entries, least-significant first,
/// matching `alpha`'s bit-length.
pub fn server_prepare_masked_terms<D: HomomorphicScheme>(
    pk: &D::PublicKey,
    alpha: &Integer,
    l: u32,
    encrypted_beta_bits: &[D::Ciphertext],
    tuple: &DgkBlindingTuple<D>,
    rng: &mut dyn RngCore,
) -> Result<(Vec<D::Ciphertext>, Sign)> {
    if encrypted_beta_bits.len() != l as usize {
        return Err(Error::ProtocolViolation(format!(
            "expected {l} beta bits, got {}",
            encrypted_beta_bits.len()
        )));
    }
    if tuple.masks.len() != l as usize + 1 {
        return Err(Error::ProtocolViolation(format!(
            "expected {} dgk masks, got {}",
            l + 1,
            tuple.masks.len()
        )));
    }

    let alpha_bits = bits_of(alpha, l);
    let sign = Sign::sample(rng);
    let s_term = D::encrypt_nonrandom(pk, &sign.as_integer())?;
    let three = Integer::from_i64(3);

    // Terms are built from the high bit down so each term's Sigma_{j>i} can be
    // accumulated as a running sum.
    let mut terms = vec![None; l as usize];
    let mut running_sum: Option<D::Ciphertext> = None;
    for i in (0..l as usize).rev() {
        let term = s_term.clone()
            + alpha_minus_beta::<D>(pk, alpha_bits[i], &encrypted_beta_bits[i])
            + running_sum
                .clone()
                .map(|sum| sum * three.clone())
                .unwrap_or_else(|| D::encrypted_zero(pk));
        terms[i] = Some(term);

        let xor_i = encrypted_xor::<D>(pk, alpha_bits[i], &encrypted_beta_bits[i]);
        running_sum = Some(match running_sum {
            Some(sum) => sum + xor_i,
            None => xor_i,
        });
    }
    // The extra equality term: zero iff alpha == beta bitwise. Scaled by the
    // sign the same way every per-bit term is, via `s_term`, so a tie isn't
    // reported as "found a zero" independent of which `Sign` was sampled.
    let equality_term = s_term.clone()
        + running_sum
            .unwrap_or_else(|| D::encrypted_zero(pk))
            * three.clone();

    let mut all_terms: Vec<D::Ciphertext> = terms.into_iter().map(|t| t.expect("filled")).collect();
    all_terms.push(equality_term);

    let masked: Vec<D::Ciphertext> = all_terms
        .into_iter()
        .zip(tuple.masks.iter())
        .map(|(term, mask)| term * mask.clone())
        .collect();

    let mut permuted = masked;
    permuted.shuffle(&mut RngShim(rng));

    Ok((permuted, sign))
}

/// Client side of one DGK round: decrypts every masked term and reports whether
/// any of them is zero.
pub fn client_evaluate<D: HomomorphicScheme>(
    sk: &D::SecretKey,
    pk: &D::PublicKey,
    masked_terms: &[D::Ciphertext],
) -> Result<bool> {
    for term in masked_terms {
        let plaintext = D::decrypt(sk, pk, term)?;
        if plaintext.is_zero() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Combines the server's chosen [`Sign`] with the client's reported bit to
/// obtain the borrow bit `t`.
pub fn combine_with_sign(delta_b: bool, sign: Sign) -> bool {
    match sign {
        Sign::Plus => !delta_b,
        Sign::Minus => delta_b,
    }
}

/// Ciphertext counterpart of [`combine_with_sign`], for the real client/server
/// split where the server never sees the client's plaintext bit, only
/// `[delta_B]` under the outer scheme.
pub fn combine_with_sign_encrypted<S: HomomorphicScheme>(
    pk: &S::PublicKey,
    delta_b: &S::Ciphertext,
    sign: Sign,
) -> S::Ciphertext {
    match sign {
        Sign::Plus => S::encrypted_one(pk) + (-delta_b.clone()),
        Sign::Minus => delta_b.clone(),
    }
}

/// Adapter so `rand::seq::SliceRandom::shuffle` can drive a `&mut dyn RngCore`.
struct RngShim<'a>(&'a mut dyn RngCore);
impl rand::RngCore for RngShim<'_> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
