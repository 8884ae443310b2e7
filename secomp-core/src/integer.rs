//! Arbitrary-precision integer used by the comparison protocol itself.
//!
//! This is deliberately thin: the protocol only ever needs addition, floored
//! division/modulo, bit extraction and uniform sampling. Everything else
//! (modular exponentiation inside a cryptosystem's group) stays behind
//! [`crate::crypto::HomomorphicScheme`].

use num_bigint::{BigInt, RandBigInt, Sign};
use num_integer::Integer as _;
use num_traits::{Signed, Zero};
use rand::RngCore;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// An arbitrary-precision signed integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Integer(BigInt);

impl Integer {
    /// The additive identity.
    pub fn zero() -> Self {
        Integer(BigInt::zero())
    }

    /// Constructs an `Integer` from a signed 64-bit value.
    pub fn from_i64(value: i64) -> Self {
        Integer(BigInt::from(value))
    }

    /// Constructs an `Integer` from an unsigned 64-bit value.
    pub fn from_u64(value: u64) -> Self {
        Integer(BigInt::from(value))
    }

    /// Samples a uniform random integer in `[0, 2^bits)`.
    pub fn sample_uniform(bits: u32, rng: &mut (impl RngCore + ?Sized)) -> Self {
        Integer(rng.gen_bigint(bits.into()).abs())
    }

    /// `2^exp` as an `Integer`.
    pub fn two_pow(exp: u32) -> Self {
        Integer(BigInt::from(1u8) << exp)
    }

    /// Floored division: `self.div_floor(rhs)` rounds toward negative infinity.
    pub fn div_floor(&self, rhs: &Integer) -> Integer {
        Integer(self.0.div_floor(&rhs.0))
    }

    /// Floored modulo: the result has the same sign as `rhs` and satisfies
    /// `self == self.div_floor(rhs) * rhs + self.mod_floor(rhs)`.
    pub fn mod_floor(&self, rhs: &Integer) -> Integer {
        Integer(self.0.mod_floor(&rhs.0))
    }

    /// Returns the bit at position `i` (0 = least significant) of the non-negative
    /// representative of `self`.
    ///
    /// # Panics
    /// Panics if `self` is negative.
    pub fn bit(&self, i: u32) -> bool {
        assert!(!self.0.is_negative(), "bit() requires a non-negative value");
        let (_, bytes) = self.0.to_bytes_le();
        let byte_index = (i / 8) as usize;
        let bit_index = i % 8;
        bytes
            .get(byte_index)
            .map(|b| (b >> bit_index) & 1 == 1)
            .unwrap_or(false)
    }

    /// True iff `self` is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// True iff `self == 0`.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The absolute value.
    pub fn abs(&self) -> Integer {
        Integer(self.0.abs())
    }

    /// Converts to `i64` if representable; used only for test assertions and logging widths.
    pub fn to_i64(&self) -> Option<i64> {
        use num_traits::ToPrimitive;
        self.0.to_i64()
    }

    /// Reduce `self` into the canonical representative of `Z_n`, i.e. `[0, n)`.
    pub fn rem_euclid_to(&self, modulus: &Integer) -> Integer {
        let m = modulus.0.abs();
        let r = &self.0 % &m;
        if r.sign() == Sign::Minus {
            Integer(r + m)
        } else {
            Integer(r)
        }
    }

    pub(crate) fn inner(&self) -> &BigInt {
        &self.0
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Integer(value)
    }
}

impl From<Integer> for BigInt {
    fn from(value: Integer) -> Self {
        value.0
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Integer {
    type Output = Integer;
    fn add(self, rhs: Integer) -> Integer {
        Integer(self.0 + rhs.0)
    }
}

impl Add<&Integer> for &Integer {
    type Output = Integer;
    fn add(self, rhs: &Integer) -> Integer {
        Integer(&self.0 + &rhs.0)
    }
}

impl Sub for Integer {
    type Output = Integer;
    fn sub(self, rhs: Integer) -> Integer {
        Integer(self.0 - rhs.0)
    }
}

impl Sub<&Integer> for &Integer {
    type Output = Integer;
    fn sub(self, rhs: &Integer) -> Integer {
        Integer(&self.0 - &rhs.0)
    }
}

impl Neg for Integer {
    type Output = Integer;
    fn neg(self) -> Integer {
        Integer(-self.0)
    }
}

impl Neg for &Integer {
    type Output = Integer;
    fn neg(self) -> Integer {
        Integer(-&self.0)
    }
}

impl Mul for Integer {
    type Output = Integer;
    fn mul(self, rhs: Integer) -> Integer {
        Integer(self.0 * rhs.0)
    }
}

impl Mul<&Integer> for &Integer {
    type Output = Integer;
    fn mul(self, rhs: &Integer) -> Integer {
        Integer(&self.0 * &rhs.0)
    }
}
