//! Key-space arithmetic for speculative listing.
//!
//! A key can be read as a number in base 64 over a fixed ordered alphabet:
//! a below-everything sentinel, the digits, uppercase letters, lowercase
//! letters, and an above-everything sentinel. With that reading, "a point at
//! lexicographic distance d past key k" is just `encode(k) + d`, which is how
//! the planner guesses start points for speculative sub-range requests.
//!
//! Keys can be hundreds of bytes long, so the numbers need arbitrary
//! precision. Scaling a distance by the shrink factor goes through an exact
//! decimal intermediate rather than an `f64`, which would lose precision
//! after roughly 15 base-64 digits.

use std::ops::{Add, Mul};

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, BigUint};
use num_traits::{FromPrimitive, Zero};
use wl_error::{ListError, Result};

/// 64 ordered symbols: `!`, `0`-`9`, `A`-`Z`, `a`-`z`, `~`.
///
/// The middle 62 match ASCII printable ordering; the sentinels bracket the
/// range so candidate start points can land between or beyond real keys.
const ALPHABET: &[u8; 64] = b"!0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz~";

const BASE: u32 = ALPHABET.len() as u32;

fn symbol_index(ch: char) -> Option<u32> {
    match ch {
        '!' => Some(0),
        '0'..='9' => Some(1 + (ch as u32 - '0' as u32)),
        'A'..='Z' => Some(11 + (ch as u32 - 'A' as u32)),
        'a'..='z' => Some(37 + (ch as u32 - 'a' as u32)),
        '~' => Some(63),
        _ => None,
    }
}

/// The base-64 interpretation of a key, relative to the shared prefix.
///
/// Used only to generate candidate start points, never to decide equality of
/// real keys; ordering slippage near length boundaries is absorbed by the
/// overlap tolerance of sub-range workers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyNumber(BigUint);

impl KeyNumber {
    /// Encode a key. Fails on any character outside the alphabet.
    pub fn from_key(key: &str) -> Result<Self> {
        let mut value = BigUint::zero();
        for ch in key.chars() {
            let index = symbol_index(ch).ok_or_else(|| ListError::UnsupportedKeyChar {
                key: key.to_string(),
                ch,
            })?;
            value = value * BASE + index;
        }
        Ok(KeyNumber(value))
    }

    /// Decode back to a key. Zero decodes to the empty string.
    pub fn to_key(&self) -> String {
        let base = BigUint::from(BASE);
        let mut current = self.0.clone();
        let mut symbols = Vec::new();
        while !current.is_zero() {
            // the remainder is always < 64; zero yields no digits at all
            let digit = (&current % &base).iter_u32_digits().next().unwrap_or(0);
            symbols.push(ALPHABET[digit as usize]);
            current /= &base;
        }
        symbols.reverse();
        symbols.into_iter().map(char::from).collect()
    }

    /// Checked subtraction. The distance between two observed keys is only
    /// meaningful when `self >= other`; anything else is a logic error.
    pub fn checked_sub(&self, other: &KeyNumber) -> Result<KeyNumber> {
        if self.0 < other.0 {
            return Err(ListError::Invariant(
                "key distance computed with end before start".to_string(),
            ));
        }
        Ok(KeyNumber(&self.0 - &other.0))
    }

    /// Multiply by a float through an exact decimal intermediate, truncating
    /// the product toward zero.
    pub fn scale(&self, factor: f32) -> Result<KeyNumber> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(ListError::Invariant(format!(
                "scale factor must be finite and non-negative, got {factor}"
            )));
        }
        let value = BigDecimal::from(BigInt::from(self.0.clone()));
        let factor = BigDecimal::from_f32(factor).ok_or_else(|| {
            ListError::Invariant("scale factor is not representable".to_string())
        })?;
        let (scaled, _) = (value * factor)
            .with_scale_round(0, RoundingMode::Down)
            .into_bigint_and_exponent();
        match scaled.to_biguint() {
            Some(value) => Ok(KeyNumber(value)),
            None => Err(ListError::Invariant(
                "scaled key distance is negative".to_string(),
            )),
        }
    }
}

impl From<u64> for KeyNumber {
    fn from(value: u64) -> Self {
        KeyNumber(BigUint::from(value))
    }
}

impl Add<&KeyNumber> for &KeyNumber {
    type Output = KeyNumber;

    fn add(self, rhs: &KeyNumber) -> KeyNumber {
        KeyNumber(&self.0 + &rhs.0)
    }
}

impl Add<u64> for &KeyNumber {
    type Output = KeyNumber;

    fn add(self, rhs: u64) -> KeyNumber {
        KeyNumber(&self.0 + rhs)
    }
}

impl Mul<usize> for &KeyNumber {
    type Output = KeyNumber;

    fn mul(self, rhs: usize) -> KeyNumber {
        KeyNumber(&self.0 * rhs as u64)
    }
}
