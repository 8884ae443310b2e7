//! The server's half of one DGK comparison round: build and permute the
//! masked terms, then combine the client's reported bit with the server's
//! chosen sign once it comes back.

use rand::RngCore;
use secomp_core::cache::DgkBlindingTuple;
use secomp_core::crypto::HomomorphicScheme;
use secomp_core::dgk::{self, Sign};
use secomp_core::error::Result;
use secomp_core::integer::Integer;

/// Builds the `l + 1` masked, permuted terms to send to the client for the
/// server's `alpha` (the cached randomizer's `r mod 2^l`) against the
/// client's encrypted `beta` bits.
pub fn prepare_masked_terms<D: HomomorphicScheme>(
    pk: &D::PublicKey,
    alpha: &Integer,
    l: u32,
    encrypted_beta_bits: &[D::Ciphertext],
    tuple: &DgkBlindingTuple<D>,
    rng: &mut dyn RngCore,
) -> Result<(Vec<D::Ciphertext>, Sign)> {
    dgk::server_prepare_masked_terms::<D>(pk, alpha, l, encrypted_beta_bits, tuple, rng)
}

/// Combines the client's encrypted vote `[delta_B]` (under the outer scheme)
/// with the sign the server chose when it built the masked terms, yielding
/// the borrow bit `[t]`.
pub fn combine_vote<S: HomomorphicScheme>(
    pk: &S::PublicKey,
    delta_b: &S::Ciphertext,
    sign: Sign,
) -> S::Ciphertext {
    dgk::combine_with_sign_encrypted::<S>(pk, delta_b, sign)
}
