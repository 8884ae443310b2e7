//! The server side of the secure comparison protocol: holds only public keys
//! and ciphertexts, drives the blinded-difference exchange and the DGK round
//! over a [`Channel`], and never sees a plaintext operand or intermediate
//! value. Grounded on the original `Compare(a, minusB)` orchestration: the two
//! round trips (the Paillier quotient and the DGK vote) are data-independent
//! once `[z]` has been sent, so they are driven concurrently rather than
//! strictly in sequence.

use crate::dgk_server;
use rand::RngCore;
use secomp_client::Channel;
use secomp_core::cache::{DgkRandomizerCache, RandomizerCache};
use secomp_core::compare;
use secomp_core::crypto::HomomorphicScheme;
use secomp_core::dgk::Sign;
use secomp_core::error::{Error, Result};
use secomp_types::message::ComparisonMessage;
use secomp_types::session::{ComparisonCounter, SessionId};
use std::time::Duration;

/// The server side of one matched client pair: holds the randomizer caches
/// and the public keys of both cryptosystems.
pub struct SecureComparisonServer<S: HomomorphicScheme, D: HomomorphicScheme> {
    outer_pk: S::PublicKey,
    dgk_pk: D::PublicKey,
    l: u32,
    cache: RandomizerCache<S>,
    dgk_cache: DgkRandomizerCache<D>,
    response_timeout: Duration,
}

impl<S: HomomorphicScheme, D: HomomorphicScheme> SecureComparisonServer<S, D> {
    /// Builds a server around already-populated randomizer caches.
    pub fn new(
        outer_pk: S::PublicKey,
        dgk_pk: D::PublicKey,
        l: u32,
        cache: RandomizerCache<S>,
        dgk_cache: DgkRandomizerCache<D>,
        response_timeout: Duration,
    ) -> Self {
        SecureComparisonServer {
            outer_pk,
            dgk_pk,
            l,
            cache,
            dgk_cache,
            response_timeout,
        }
    }

    /// The outer public key, needed by callers encrypting operands or a
    /// plaintext threshold before calling [`Self::compare`].
    pub fn outer_public_key(&self) -> &S::PublicKey {
        &self.outer_pk
    }

    /// Runs one full comparison: `[a >= b]`, returned still encrypted under
    /// the outer public key. The caller (its paired client) must decrypt it
    /// to learn the result.
    pub async fn compare<C>(
        &self,
        session: SessionId,
        counter: ComparisonCounter,
        a: &S::Ciphertext,
        b: &S::Ciphertext,
        channel: &C,
        rng: &mut dyn RngCore,
    ) -> Result<S::Ciphertext>
    where
        C: Channel<S::Ciphertext, D::Ciphertext>,
    {
        let tuple = self.cache.pop()?;
        let z = compare::blind_difference::<S>(&self.outer_pk, self.l, a, b, &tuple)?;
        channel
            .send(ComparisonMessage::PaillierZ { session, counter, z })
            .await?;

        let dgk_tuple = self.dgk_cache.pop()?;

        let mut z_div_two_pow_l: Option<S::Ciphertext> = None;
        let mut sign: Option<Sign> = None;
        let mut delta_b: Option<S::Ciphertext> = None;

        while z_div_two_pow_l.is_none() || delta_b.is_none() {
            let message = tokio::time::timeout(self.response_timeout, channel.recv())
                .await
                .map_err(|_| Error::ProtocolViolation("client response timed out".into()))??;
            if message.session() != session || message.counter() != counter {
                return Err(Error::ProtocolViolation(
                    "received message for a different session or comparison".into(),
                ));
            }
            match message {
                ComparisonMessage::PaillierZDivTwoPowL { z_div_two_pow_l: value, .. } => {
                    z_div_two_pow_l = Some(value);
                }
                ComparisonMessage::DgkBetaBits { bits, .. } => {
                    let (terms, chosen_sign) = dgk_server::prepare_masked_terms::<D>(
                        &self.dgk_pk,
                        &tuple.r_mod_two_pow_l,
                        self.l,
                        &bits,
                        &dgk_tuple,
                        rng,
                    )?;
                    channel
                        .send(ComparisonMessage::DgkMaskedTerms { session, counter, terms })
                        .await?;
                    sign = Some(chosen_sign);
                }
                ComparisonMessage::PaillierDeltaB { delta_b: value, .. } => {
                    delta_b = Some(value);
                }
                other => {
                    return Err(Error::ProtocolViolation(format!(
                        "unexpected message on server side: {}",
                        other.kind()
                    )));
                }
            }
        }

        let sign = sign.ok_or_else(|| {
            Error::ProtocolViolation("dgk round finished without masked terms being sent".into())
        })?;
        let t = dgk_server::combine_vote::<S>(&self.outer_pk, &delta_b.expect("checked above"), sign);
        Ok(compare::finish_compare::<S>(
            &z_div_two_pow_l.expect("checked above"),
            &tuple,
            &t,
        ))
    }
}
