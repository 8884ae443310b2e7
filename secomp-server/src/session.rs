//! Owning session orchestration: a matched server/client pair wired together
//! over an in-process channel.
//!
//! The original protocol this codebase's comparison algorithm is drawn from
//! ties a server-side comparator to its client via a non-owning back
//! reference, constructed once and assumed to outlive every comparison it
//! serves. That assumption doesn't hold for a library meant to be embedded:
//! a [`Session`] instead *owns* both ends and the client's background
//! message-handling task, so dropping the session tears down everything it
//! started.

use crate::compare_server::SecureComparisonServer;
use crate::config::ServerConfig;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use secomp_client::channel::{duplex, Channel, InProcessChannel};
use secomp_client::compare_client::SecureComparisonClient;
use secomp_core::cache::{DgkRandomizerCache, RandomizerCache};
use secomp_core::crypto::HomomorphicScheme;
use secomp_core::error::Result;
use secomp_core::integer::Integer;
use secomp_types::message::ComparisonMessage;
use secomp_types::session::{ComparisonCounter, SessionId};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A matched server/client pair for one comparing relationship, communicating
/// over an owned [`InProcessChannel`].
///
/// `S` is the outer (Paillier-style) scheme, `D` the inner (DGK-style) scheme
/// used for the bit-comparison round.
pub struct Session<S: HomomorphicScheme, D: HomomorphicScheme> {
    id: SessionId,
    server: SecureComparisonServer<S, D>,
    server_channel: InProcessChannel<S::Ciphertext, D::Ciphertext>,
    counter: Mutex<ComparisonCounter>,
    client_task: JoinHandle<()>,
}

impl<S: HomomorphicScheme, D: HomomorphicScheme> Session<S, D> {
    /// Builds a session: fills both randomizer caches, wires a server and a
    /// client together over a fresh in-process channel, and spawns the
    /// client's background message-handling loop.
    pub fn new(
        outer_pk: S::PublicKey,
        outer_sk: S::SecretKey,
        dgk_pk: D::PublicKey,
        dgk_sk: D::SecretKey,
        config: &ServerConfig,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let cache = RandomizerCache::<S>::new(
            outer_pk.clone(),
            config.cache.l,
            config.cache.kappa,
            config.cache.capacity,
            config.cache.reuse_allowed,
            rng,
        )?;
        let dgk_cache = DgkRandomizerCache::<D>::new(
            dgk_pk.clone(),
            config.cache.l,
            config.cache.capacity,
            config.cache.reuse_allowed,
            rng,
        )?;
        let server = SecureComparisonServer::new(
            outer_pk.clone(),
            dgk_pk.clone(),
            config.cache.l,
            cache,
            dgk_cache,
            config.session_timeout,
        );

        let client = Arc::new(SecureComparisonClient::<S, D>::new(
            outer_pk,
            outer_sk,
            dgk_pk,
            dgk_sk,
            config.cache.l,
        ));

        let (server_channel, client_channel) = duplex(config.channel_buffer);
        let client_task = tokio::spawn(run_client_loop(client, client_channel));

        Ok(Session {
            id: SessionId::new(),
            server,
            server_channel,
            counter: Mutex::new(ComparisonCounter::initial()),
            client_task,
        })
    }

    /// This session's identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Computes `[a >= b]`, still encrypted under the outer public key; the
    /// caller decrypts it through whatever channel it has to the holder of
    /// the decryption key (in a real deployment, the client's own caller).
    pub async fn compare(&self, a: &S::Ciphertext, b: &S::Ciphertext, rng: &mut dyn RngCore) -> Result<S::Ciphertext> {
        let counter = self.next_counter();
        self.server.compare(self.id, counter, a, b, &self.server_channel, rng).await
    }

    /// Threshold form: computes `[a >= threshold]` against a plaintext
    /// threshold known to the server, by encrypting it deterministically
    /// before running the same comparison.
    pub async fn compare_threshold(
        &self,
        a: &S::Ciphertext,
        threshold: &Integer,
        rng: &mut dyn RngCore,
    ) -> Result<S::Ciphertext> {
        let b = S::encrypt_nonrandom(self.server.outer_public_key(), threshold)?;
        self.compare(a, &b, rng).await
    }

    fn next_counter(&self) -> ComparisonCounter {
        let mut counter = self.counter.lock();
        let current = *counter;
        *counter = current.next();
        current
    }
}

impl<S: HomomorphicScheme, D: HomomorphicScheme> Drop for Session<S, D> {
    fn drop(&mut self) {
        self.client_task.abort();
    }
}

/// The client's background loop: answers `PaillierZ` and `DgkMaskedTerms`
/// messages as they arrive until the channel closes.
async fn run_client_loop<S, D>(
    client: Arc<SecureComparisonClient<S, D>>,
    channel: InProcessChannel<S::Ciphertext, D::Ciphertext>,
) where
    S: HomomorphicScheme,
    D: HomomorphicScheme,
{
    let mut rng = StdRng::from_entropy();
    loop {
        let message = match channel.recv().await {
            Ok(message) => message,
            Err(_) => return,
        };
        match message {
            ComparisonMessage::PaillierZ { session, counter, z } => {
                match client.handle_z(session, counter, &z, &mut rng) {
                    Ok(response) => {
                        let quotient = ComparisonMessage::PaillierZDivTwoPowL {
                            session,
                            counter,
                            z_div_two_pow_l: response.z_div_two_pow_l,
                        };
                        let bits = ComparisonMessage::DgkBetaBits {
                            session,
                            counter,
                            bits: response.beta_bits,
                        };
                        if channel.send(quotient).await.is_err() {
                            return;
                        }
                        if channel.send(bits).await.is_err() {
                            return;
                        }
                    }
                    Err(error) => tracing::warn!(%error, "client failed to handle blinded difference"),
                }
            }
            ComparisonMessage::DgkMaskedTerms { session, counter, terms } => {
                match client.handle_masked_terms(session, counter, &terms, &mut rng) {
                    Ok(delta_b) => {
                        let response = ComparisonMessage::PaillierDeltaB { session, counter, delta_b };
                        if channel.send(response).await.is_err() {
                            return;
                        }
                    }
                    Err(error) => tracing::warn!(%error, "client failed to evaluate dgk round"),
                }
            }
            other => tracing::warn!(kind = other.kind(), "client received unexpected message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use secomp_toycrypto::paillier_keygen;

    #[tokio::test]
    async fn session_round_trip_matches_expected_comparison() {
        let mut rng = rand::thread_rng();
        let (outer_pk, outer_sk) = paillier_keygen(256, &mut rng);
        let (dgk_pk, dgk_sk) = paillier_keygen(256, &mut rng);
        let config = ServerConfig::parse_from(["secomp-server"]);

        let session = Session::<secomp_toycrypto::ToyPaillier, secomp_toycrypto::ToyPaillier>::new(
            outer_pk.clone(),
            outer_sk.clone(),
            dgk_pk,
            dgk_sk,
            &config,
            &mut rng,
        )
        .unwrap();

        let a = secomp_core::compare::encrypt_operand::<secomp_toycrypto::ToyPaillier>(
            &outer_pk,
            &Integer::from_i64(5),
            config.cache.l,
            &mut rng,
        )
        .unwrap();
        let b = secomp_core::compare::encrypt_operand::<secomp_toycrypto::ToyPaillier>(
            &outer_pk,
            &Integer::from_i64(3),
            config.cache.l,
            &mut rng,
        )
        .unwrap();

        let gamma = session.compare(&a, &b, &mut rng).await.unwrap();
        let result = secomp_toycrypto::ToyPaillier::decrypt(&outer_sk, &outer_pk, &gamma).unwrap();
        assert!(result.bit(0));
    }
}
