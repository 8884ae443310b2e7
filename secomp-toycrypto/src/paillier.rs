//! A toy instantiation of an additively homomorphic cryptosystem, in the
//! simplified-generator form of Paillier (`g = n + 1`).
//!
//! **Not for production use.** Primality testing is probabilistic with no
//! side-channel hardening, there is no proof-carrying key validation, and
//! randomness is drawn from whatever `dyn RngCore` the caller supplies. This
//! exists to let `secomp-core`'s protocol tests and the bundled demo exercise
//! real modular arithmetic without depending on a production bignum-crypto
//! crate.
//!
//! The same concrete scheme is used, under two independently generated key
//! pairs, to stand in for both the outer Paillier layer and the inner DGK
//! layer the comparison protocol calls for: both are "some additively
//! homomorphic cryptosystem with cheap zero-test-on-decrypt", and the
//! `HomomorphicScheme` trait boundary in `secomp-core` does not distinguish
//! them beyond the `Kind` tag. A real deployment would plug in DGK's own,
//! much cheaper, cryptosystem for the inner role.

use crate::keygen::random_prime;
use num_bigint::{BigInt, Sign};
use num_integer::Integer as _;
use num_traits::{One, Zero};
use rand::RngCore;
use secomp_core::crypto::{HomomorphicScheme, Paillier, SchemeKind};
use secomp_core::error::{Error, Result};
use secomp_core::integer::Integer;
use std::ops::{Add, Mul, Neg};
use zeroize::Zeroize;

/// Marker tag reused for both the outer and inner cryptosystem roles; see the
/// module documentation for why one concrete scheme serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToyKind;
impl SchemeKind for ToyKind {}

/// Public key: `n` and `n^2`, cached to avoid recomputing the square on every
/// operation.
#[derive(Debug, Clone)]
pub struct ToyPublicKey {
    pub(crate) n: BigInt,
    pub(crate) n_squared: BigInt,
}

/// Secret key: `lambda = lcm(p-1, q-1)` and its modular inverse mod `n`.
/// Zeroized on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct ToySecretKey {
    lambda_bytes: Vec<u8>,
    mu_bytes: Vec<u8>,
    lambda_negative: bool,
    mu_negative: bool,
}

impl ToySecretKey {
    fn lambda(&self) -> BigInt {
        let magnitude = BigInt::from_bytes_be(Sign::Plus, &self.lambda_bytes);
        if self.lambda_negative {
            -magnitude
        } else {
            magnitude
        }
    }

    fn mu(&self) -> BigInt {
        let magnitude = BigInt::from_bytes_be(Sign::Plus, &self.mu_bytes);
        if self.mu_negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl std::fmt::Debug for ToySecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToySecretKey").finish_non_exhaustive()
    }
}

/// An encrypted element: the ciphertext value plus the modulus it lives
/// under, so homomorphic operations do not need a second key parameter.
///
/// `randomized` tracks whether this value already carries fresh randomness
/// (the output of [`HomomorphicScheme::encrypt`], or any combination that
/// mixes one in) versus being the bare, deterministic output of
/// [`HomomorphicScheme::encrypt_nonrandom`]. It exists purely to let
/// [`ToyCiphertext`]'s `Serialize` impl catch, in debug builds, an
/// `encrypt_nonrandom` result placed on the wire before it has been blinded.
#[derive(Debug, Clone)]
pub struct ToyCiphertext {
    c: BigInt,
    n_squared: BigInt,
    randomized: bool,
}

fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        (a.clone(), BigInt::one(), BigInt::zero())
    } else {
        let (g, x, y) = extended_gcd(b, &(a % b));
        (g, y.clone(), x - (a / b) * y)
    }
}

fn mod_inverse(a: &BigInt, modulus: &BigInt) -> BigInt {
    let (_, x, _) = extended_gcd(&a.mod_floor(modulus), modulus);
    x.mod_floor(modulus)
}

fn mod_pow_signed(base: &BigInt, exponent: &BigInt, modulus: &BigInt) -> BigInt {
    if exponent.sign() == Sign::Minus {
        let inverse = mod_inverse(base, modulus);
        inverse.modpow(&(-exponent), modulus)
    } else {
        base.modpow(exponent, modulus)
    }
}

/// Generates a fresh key pair with an `n` of roughly `2 * prime_bits` bits.
pub fn keygen(prime_bits: u64, rng: &mut dyn RngCore) -> (ToyPublicKey, ToySecretKey) {
    let p = random_prime(prime_bits, rng);
    let q = random_prime(prime_bits, rng);
    let n = &p * &q;
    let n_squared = &n * &n;
    let p_minus_one = &p - BigInt::one();
    let q_minus_one = &q - BigInt::one();
    let lambda = p_minus_one.lcm(&q_minus_one);
    let mu = mod_inverse(&lambda, &n);

    let (_, lambda_bytes) = lambda.to_bytes_be();
    let (_, mu_bytes) = mu.to_bytes_be();
    let sk = ToySecretKey {
        lambda_bytes,
        mu_bytes,
        lambda_negative: lambda.sign() == Sign::Minus,
        mu_negative: mu.sign() == Sign::Minus,
    };
    (ToyPublicKey { n, n_squared }, sk)
}

fn sample_randomizer(pk: &ToyPublicKey, rng: &mut dyn RngCore) -> BigInt {
    let mut r_bytes = vec![0u8; (pk.n.bits() as usize / 8) + 1];
    rng.fill_bytes(&mut r_bytes);
    let mut r = BigInt::from_bytes_be(Sign::Plus, &r_bytes).mod_floor(&pk.n);
    if r.is_zero() {
        r = BigInt::one();
    }
    r
}

fn to_plaintext_bigint(pk: &ToyPublicKey, value: &Integer) -> BigInt {
    let v: BigInt = value.clone().into();
    v.mod_floor(&pk.n)
}

fn from_plaintext_bigint(pk: &ToyPublicKey, value: BigInt) -> Integer {
    let half = &pk.n / 2;
    let signed = if value > half { value - &pk.n } else { value };
    Integer::from(signed)
}

/// The scheme type implementing [`HomomorphicScheme`]; zero-sized.
#[derive(Debug, Clone)]
pub struct ToyPaillier;

impl HomomorphicScheme for ToyPaillier {
    type Kind = ToyKind;
    type PublicKey = ToyPublicKey;
    type SecretKey = ToySecretKey;
    type Ciphertext = ToyCiphertext;

    fn message_space_size(pk: &ToyPublicKey) -> Integer {
        Integer::from(pk.n.clone())
    }

    fn encrypt(pk: &ToyPublicKey, message: &Integer, rng: &mut dyn RngCore) -> Result<ToyCiphertext> {
        let m = to_plaintext_bigint(pk, message);
        let r = sample_randomizer(pk, rng);
        let base = (BigInt::one() + &m * &pk.n).mod_floor(&pk.n_squared);
        let mask = r.modpow(&pk.n, &pk.n_squared);
        let c = (base * mask).mod_floor(&pk.n_squared);
        Ok(ToyCiphertext {
            c,
            n_squared: pk.n_squared.clone(),
            randomized: true,
        })
    }

    fn encrypt_nonrandom(pk: &ToyPublicKey, message: &Integer) -> Result<ToyCiphertext> {
        let m = to_plaintext_bigint(pk, message);
        let c = (BigInt::one() + &m * &pk.n).mod_floor(&pk.n_squared);
        Ok(ToyCiphertext {
            c,
            n_squared: pk.n_squared.clone(),
            randomized: false,
        })
    }

    fn decrypt(sk: &ToySecretKey, pk: &ToyPublicKey, ciphertext: &ToyCiphertext) -> Result<Integer> {
        if ciphertext.n_squared != pk.n_squared {
            return Err(Error::CryptoFailure(
                "ciphertext modulus does not match public key".into(),
            ));
        }
        let u = ciphertext.c.modpow(&sk.lambda(), &pk.n_squared);
        let l_of_u = (&u - BigInt::one()) / &pk.n;
        let m = (l_of_u * sk.mu()).mod_floor(&pk.n);
        Ok(from_plaintext_bigint(pk, m))
    }

    fn encrypted_zero(pk: &ToyPublicKey) -> ToyCiphertext {
        ToyCiphertext {
            c: BigInt::one(),
            n_squared: pk.n_squared.clone(),
            randomized: false,
        }
    }

    fn encrypted_one(pk: &ToyPublicKey) -> ToyCiphertext {
        ToyCiphertext {
            c: (BigInt::one() + &pk.n).mod_floor(&pk.n_squared),
            n_squared: pk.n_squared.clone(),
            randomized: false,
        }
    }

    fn randomizer(pk: &ToyPublicKey, rng: &mut dyn RngCore) -> Result<Integer> {
        Ok(Integer::from(sample_randomizer(pk, rng)))
    }
}

impl Add for ToyCiphertext {
    type Output = ToyCiphertext;
    fn add(self, rhs: ToyCiphertext) -> ToyCiphertext {
        assert_eq!(self.n_squared, rhs.n_squared, "ciphertexts under different keys");
        ToyCiphertext {
            c: (self.c * rhs.c).mod_floor(&self.n_squared),
            randomized: self.randomized || rhs.randomized,
            n_squared: self.n_squared,
        }
    }
}

impl Neg for ToyCiphertext {
    type Output = ToyCiphertext;
    fn neg(self) -> ToyCiphertext {
        let inverse = mod_inverse(&self.c, &self.n_squared);
        ToyCiphertext {
            c: inverse,
            randomized: self.randomized,
            n_squared: self.n_squared,
        }
    }
}

impl Mul<Integer> for ToyCiphertext {
    type Output = ToyCiphertext;
    fn mul(self, rhs: Integer) -> ToyCiphertext {
        let exponent: BigInt = rhs.into();
        ToyCiphertext {
            c: mod_pow_signed(&self.c, &exponent, &self.n_squared),
            randomized: self.randomized,
            n_squared: self.n_squared,
        }
    }
}

/// Wire form of [`ToyCiphertext`]; `randomized` is not carried over the wire
/// since a value that passes the `Serialize` precondition is randomized by
/// construction, and a received ciphertext is reconstituted as such.
#[derive(serde::Serialize, serde::Deserialize)]
struct ToyCiphertextWire {
    c: BigInt,
    n_squared: BigInt,
}

impl serde::Serialize for ToyCiphertext {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        debug_assert!(
            self.randomized,
            "encrypt_nonrandom output serialized onto the wire before being combined \
             with a randomized ciphertext"
        );
        ToyCiphertextWire {
            c: self.c.clone(),
            n_squared: self.n_squared.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ToyCiphertext {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = ToyCiphertextWire::deserialize(deserializer)?;
        Ok(ToyCiphertext {
            c: wire.c,
            n_squared: wire.n_squared,
            randomized: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn test_key(rng: &mut impl RngCore) -> (ToyPublicKey, ToySecretKey) {
        keygen(128, rng)
    }

    #[test]
    fn encrypt_decrypt_roundtrips() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1);
        let (pk, sk) = test_key(&mut rng);
        for value in [0i64, 1, -1, 42, -1000, 123456] {
            let m = Integer::from_i64(value);
            let c = ToyPaillier::encrypt(&pk, &m, &mut rng).unwrap();
            let decrypted = ToyPaillier::decrypt(&sk, &pk, &c).unwrap();
            assert_eq!(decrypted.to_i64(), Some(value));
        }
    }

    #[test]
    fn homomorphic_addition_matches_plaintext_addition() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(2);
        let (pk, sk) = test_key(&mut rng);
        let a = ToyPaillier::encrypt(&pk, &Integer::from_i64(17), &mut rng).unwrap();
        let b = ToyPaillier::encrypt(&pk, &Integer::from_i64(25), &mut rng).unwrap();
        let sum = a + b;
        let decrypted = ToyPaillier::decrypt(&sk, &pk, &sum).unwrap();
        assert_eq!(decrypted.to_i64(), Some(42));
    }

    #[test]
    fn negation_matches_plaintext_negation() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(3);
        let (pk, sk) = test_key(&mut rng);
        let a = ToyPaillier::encrypt(&pk, &Integer::from_i64(9), &mut rng).unwrap();
        let negated = -a;
        let decrypted = ToyPaillier::decrypt(&sk, &pk, &negated).unwrap();
        assert_eq!(decrypted.to_i64(), Some(-9));
    }

    #[test]
    fn scalar_multiplication_matches_plaintext_multiplication() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(4);
        let (pk, sk) = test_key(&mut rng);
        let a = ToyPaillier::encrypt(&pk, &Integer::from_i64(6), &mut rng).unwrap();
        let scaled = a * Integer::from_i64(7);
        let decrypted = ToyPaillier::decrypt(&sk, &pk, &scaled).unwrap();
        assert_eq!(decrypted.to_i64(), Some(42));
    }
}
