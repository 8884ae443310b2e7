//! Wire messages exchanged between a comparison server and its client.
//!
//! Every variant carries the [`SessionId`] and [`ComparisonCounter`] of the
//! comparison it belongs to, mirroring the request-id-first framing this
//! codebase uses for correlating multi-step client/server exchanges.

use crate::session::{ComparisonCounter, SessionId};
use serde::{Deserialize, Serialize};

/// One message in the secure comparison wire protocol.
///
/// `Outer` is the ciphertext type of the outer (Paillier-style) scheme;
/// `Inner` is the ciphertext type of the inner (DGK-style) scheme used for the
/// bit-comparison round. They are kept as independent type parameters because
/// nothing in the wire format requires them to be the same Rust type, even
/// though a given cryptosystem implementation may choose to reuse one.
#[derive(Clone, Serialize, Deserialize)]
#[serde(bound = "Outer: Serialize + for<'a> Deserialize<'a>, Inner: Serialize + for<'a> Deserialize<'a>")]
pub enum ComparisonMessage<Outer, Inner> {
    /// The blinded difference `[z] = [2^l] + [a] + (-[b]) + [r]`, server to client.
    PaillierZ {
        /// The session this message belongs to.
        session: SessionId,
        /// The comparison this message belongs to, within the session.
        counter: ComparisonCounter,
        /// `[z]`.
        z: Outer,
    },
    /// The re-encrypted quotient `[z div 2^l]`, client to server.
    PaillierZDivTwoPowL {
        /// The session this message belongs to.
        session: SessionId,
        /// The comparison this message belongs to, within the session.
        counter: ComparisonCounter,
        /// `[z div 2^l]`.
        z_div_two_pow_l: Outer,
    },
    /// The client's DGK-encrypted bits of `beta`, client to server.
    DgkBetaBits {
        /// The session this message belongs to.
        session: SessionId,
        /// The comparison this message belongs to, within the session.
        counter: ComparisonCounter,
        /// `[beta_0], ..., [beta_{l-1}]`, least-significant bit first.
        bits: Vec<Inner>,
    },
    /// The server's masked, permuted DGK terms, server to client.
    DgkMaskedTerms {
        /// The session this message belongs to.
        session: SessionId,
        /// The comparison this message belongs to, within the session.
        counter: ComparisonCounter,
        /// The `l + 1` masked terms, in permuted order.
        terms: Vec<Inner>,
    },
    /// The client's reported equality-to-zero bit `[delta_B]`, client to server.
    PaillierDeltaB {
        /// The session this message belongs to.
        session: SessionId,
        /// The comparison this message belongs to, within the session.
        counter: ComparisonCounter,
        /// `[delta_B]`.
        delta_b: Outer,
    },
}

impl<Outer, Inner> ComparisonMessage<Outer, Inner> {
    /// The session this message belongs to.
    pub fn session(&self) -> SessionId {
        match self {
            ComparisonMessage::PaillierZ { session, .. }
            | ComparisonMessage::PaillierZDivTwoPowL { session, .. }
            | ComparisonMessage::DgkBetaBits { session, .. }
            | ComparisonMessage::DgkMaskedTerms { session, .. }
            | ComparisonMessage::PaillierDeltaB { session, .. } => *session,
        }
    }

    /// The comparison counter this message belongs to.
    pub fn counter(&self) -> ComparisonCounter {
        match self {
            ComparisonMessage::PaillierZ { counter, .. }
            | ComparisonMessage::PaillierZDivTwoPowL { counter, .. }
            | ComparisonMessage::DgkBetaBits { counter, .. }
            | ComparisonMessage::DgkMaskedTerms { counter, .. }
            | ComparisonMessage::PaillierDeltaB { counter, .. } => *counter,
        }
    }

    /// A short tag naming the variant, used in logs instead of the full
    /// (potentially large) payload.
    pub fn kind(&self) -> &'static str {
        match self {
            ComparisonMessage::PaillierZ { .. } => "PaillierZ",
            ComparisonMessage::PaillierZDivTwoPowL { .. } => "PaillierZDivTwoPowL",
            ComparisonMessage::DgkBetaBits { .. } => "DgkBetaBits",
            ComparisonMessage::DgkMaskedTerms { .. } => "DgkMaskedTerms",
            ComparisonMessage::PaillierDeltaB { .. } => "PaillierDeltaB",
        }
    }
}

// A hand-written `Debug` impl that never prints ciphertext payloads, only the
// routing metadata: logs must not leak blinded intermediate values.
impl<Outer, Inner> std::fmt::Debug for ComparisonMessage<Outer, Inner> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonMessage")
            .field("kind", &self.kind())
            .field("session", &self.session())
            .field("counter", &self.counter())
            .finish()
    }
}
