//! The capability boundary this crate requires of an additively homomorphic cryptosystem.
//!
//! Neither Paillier nor DGK is implemented here: the comparison protocol is written
//! once, generically, against [`HomomorphicScheme`]. A toy instantiation of both
//! schemes lives in `secomp-toycrypto` for tests and demos; production deployments
//! are expected to bring their own implementation of this trait.

use crate::error::Result;
use crate::integer::Integer;
use rand::RngCore;
use std::ops::{Add, Mul, Neg};

/// Marker for which concrete cryptosystem a [`HomomorphicScheme::Ciphertext`] belongs to.
///
/// Used only as a type-level tag so `Ciphertext<Paillier>` and `Ciphertext<Dgk>` cannot
/// be confused at a call site; it carries no data.
pub trait SchemeKind: Clone + std::fmt::Debug + Send + Sync + 'static {}

/// Tag for the Paillier-style scheme used at the outer layer of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paillier;
impl SchemeKind for Paillier {}

/// Tag for the DGK-style scheme used for the inner bit-comparison round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dgk;
impl SchemeKind for Dgk {}

/// An additively homomorphic encryption scheme.
///
/// Implementors provide encryption, decryption, and the homomorphic operations the
/// comparison protocol is built from: ciphertext addition, negation, and plaintext
/// scalar multiplication.
pub trait HomomorphicScheme: Clone + Send + Sync + 'static {
    /// Which cryptosystem this implements; purely a documentation/type-safety tag.
    type Kind: SchemeKind;
    /// The public key, shared by both parties.
    type PublicKey: Clone + Send + Sync + std::fmt::Debug + 'static;
    /// The secret key; held only by the decrypting party. Implementors should wrap
    /// key material so it is zeroized on drop.
    type SecretKey: Send + Sync + 'static;
    /// An encrypted element. Must support re-randomization via homomorphic combination.
    type Ciphertext: Clone
        + Send
        + Sync
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>
        + Add<Output = Self::Ciphertext>
        + Neg<Output = Self::Ciphertext>
        + Mul<Integer, Output = Self::Ciphertext>
        + 'static;

    /// Size of the plaintext message space (the modulus plaintexts are reduced into).
    fn message_space_size(pk: &Self::PublicKey) -> Integer;

    /// Randomized encryption: fresh randomness is drawn from `rng` on every call.
    fn encrypt(pk: &Self::PublicKey, message: &Integer, rng: &mut dyn RngCore) -> Result<Self::Ciphertext>;

    /// Deterministic encryption.
    ///
    /// # Preconditions
    /// The result of this call must be combined homomorphically with a randomized
    /// ciphertext (addition, or scalar multiplication by a non-zero plaintext times
    /// a randomized ciphertext) before it is ever placed on the wire. Used only to
    /// build precomputed blinding tables cheaply.
    fn encrypt_nonrandom(pk: &Self::PublicKey, message: &Integer) -> Result<Self::Ciphertext>;

    /// Decrypts `ciphertext` under `sk`, reducing the result into `[0, message_space_size)`.
    fn decrypt(sk: &Self::SecretKey, pk: &Self::PublicKey, ciphertext: &Self::Ciphertext) -> Result<Integer>;

    /// A fixed encryption of zero, used to build masks and sign terms.
    fn encrypted_zero(pk: &Self::PublicKey) -> Self::Ciphertext;

    /// A fixed encryption of one, used to flip bits homomorphically (`1 - x`).
    fn encrypted_one(pk: &Self::PublicKey) -> Self::Ciphertext;

    /// The public key this ciphertext (or the scheme instance) is under.
    fn public_key(pk: &Self::PublicKey) -> &Self::PublicKey {
        pk
    }

    /// Draws a fresh randomization element from the scheme's randomizer space
    /// (the `r` an implementor mixes into [`HomomorphicScheme::encrypt`]).
    ///
    /// Exposed so callers that build their own ciphertexts out of
    /// [`HomomorphicScheme::encrypt_nonrandom`] terms can re-randomize them
    /// without going through a full `encrypt` of a known plaintext.
    fn randomizer(pk: &Self::PublicKey, rng: &mut dyn RngCore) -> Result<Integer>;
}
