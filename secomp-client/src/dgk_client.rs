//! The client's half of one DGK comparison round: report whether any of the
//! server's masked terms decrypts to zero.

use rand::RngCore;
use secomp_core::crypto::HomomorphicScheme;
use secomp_core::dgk;
use secomp_core::error::Result;
use secomp_core::integer::Integer;

/// Encrypts the client's share (`beta`) bitwise under the DGK public key.
///
/// Requires no secret key material; any party holding `value` and the DGK
/// public key can do this.
pub fn encrypt_beta_bits<D: HomomorphicScheme>(
    pk: &D::PublicKey,
    value: &Integer,
    l: u32,
    rng: &mut dyn RngCore,
) -> Result<Vec<D::Ciphertext>> {
    dgk::encrypt_bits::<D>(pk, value, l, rng)
}

/// Decrypts the server's masked, permuted terms and reports whether any of
/// them is zero.
pub fn evaluate<D: HomomorphicScheme>(
    sk: &D::SecretKey,
    pk: &D::PublicKey,
    masked_terms: &[D::Ciphertext],
) -> Result<bool> {
    dgk::client_evaluate::<D>(sk, pk, masked_terms)
}
