//! The client side of the Paillier-layer secure comparison.
//!
//! Holds the decryption keys for both the outer and inner cryptosystems.
//! Per the protocol's privacy contract, the client learns only the blinded
//! value `z` for each comparison; it must never see the unblinded difference
//! `d`, and its key material is wrapped so it is zeroized on drop by whatever
//! `HomomorphicScheme::SecretKey` implementation is plugged in.

use crate::dgk_client;
use parking_lot::Mutex;
use rand::RngCore;
use secomp_core::compare;
use secomp_core::crypto::HomomorphicScheme;
use secomp_core::error::{Error, Result};
use secomp_types::session::{ComparisonCounter, SessionId};
use std::collections::HashMap;

/// Response to a `[z]` message: the re-encrypted quotient plus the client's
/// DGK-encrypted share of the bit-comparison round, both derived from the
/// same decryption of `z`.
pub struct ZResponse<Outer, Inner> {
    /// `[z div 2^l]`, re-encrypted under the outer public key.
    pub z_div_two_pow_l: Outer,
    /// The client's DGK-encrypted bits of `z mod 2^l`.
    pub beta_bits: Vec<Inner>,
}

/// The client side of one comparison session: decrypts `[z]`, derives its DGK
/// share, and later reports the masked-term evaluation.
pub struct SecureComparisonClient<S: HomomorphicScheme, D: HomomorphicScheme> {
    outer_pk: S::PublicKey,
    outer_sk: S::SecretKey,
    dgk_pk: D::PublicKey,
    dgk_sk: D::SecretKey,
    l: u32,
    /// Last comparison counter observed per session, enforced to strictly
    /// increase; out-of-order delivery is a protocol violation.
    last_counter: Mutex<HashMap<SessionId, ComparisonCounter>>,
}

impl<S: HomomorphicScheme, D: HomomorphicScheme> SecureComparisonClient<S, D> {
    /// Builds a client holding both cryptosystems' decryption keys.
    pub fn new(outer_pk: S::PublicKey, outer_sk: S::SecretKey, dgk_pk: D::PublicKey, dgk_sk: D::SecretKey, l: u32) -> Self {
        SecureComparisonClient {
            outer_pk,
            outer_sk,
            dgk_pk,
            dgk_sk,
            l,
            last_counter: Mutex::new(HashMap::new()),
        }
    }

    fn check_and_advance(&self, session: SessionId, counter: ComparisonCounter) -> Result<()> {
        let mut last = self.last_counter.lock();
        if let Some(previous) = last.get(&session) {
            if counter <= *previous {
                return Err(Error::ProtocolViolation(format!(
                    "comparison counter did not strictly increase for session {session}"
                )));
            }
        }
        last.insert(session, counter);
        Ok(())
    }

    /// Handles a `[z]` message: decrypts it, splits it into `z mod 2^l` and
    /// `z div 2^l`, and returns both the re-encrypted quotient and the DGK
    /// encryption of `z mod 2^l`.
    #[tracing::instrument(level = "debug", skip_all, fields(session = %session, counter = %counter))]
    pub fn handle_z(
        &self,
        session: SessionId,
        counter: ComparisonCounter,
        z: &S::Ciphertext,
        rng: &mut dyn RngCore,
    ) -> Result<ZResponse<S::Ciphertext, D::Ciphertext>> {
        self.check_and_advance(session, counter)?;
        let z_plain = S::decrypt(&self.outer_sk, &self.outer_pk, z)?;
        let (z_mod, z_div) = compare::split_z(&z_plain, self.l);
        tracing::trace!("decrypted blinded difference, deriving quotient and dgk share");
        let z_div_two_pow_l = S::encrypt(&self.outer_pk, &z_div, rng)?;
        let beta_bits = dgk_client::encrypt_beta_bits::<D>(&self.dgk_pk, &z_mod, self.l, rng)?;
        Ok(ZResponse {
            z_div_two_pow_l,
            beta_bits,
        })
    }

    /// Handles the server's masked DGK terms: decrypts and votes, then
    /// re-encrypts the vote under the outer public key as `[delta_B]`.
    #[tracing::instrument(level = "debug", skip_all, fields(session = %session, counter = %counter))]
    pub fn handle_masked_terms(
        &self,
        session: SessionId,
        counter: ComparisonCounter,
        masked_terms: &[D::Ciphertext],
        rng: &mut dyn RngCore,
    ) -> Result<S::Ciphertext> {
        let _ = session; // counter already validated by the paired handle_z call
        let _ = counter;
        let delta_b = dgk_client::evaluate::<D>(&self.dgk_sk, &self.dgk_pk, masked_terms)?;
        tracing::trace!(delta_b, "dgk round evaluated");
        S::encrypt(&self.outer_pk, &secomp_core::integer::Integer::from_i64(delta_b as i64), rng)
    }
}
