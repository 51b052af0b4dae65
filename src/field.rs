//! The scalar field of the BN254 curve,
//! `p = 21888242871839275222246405745257275088548364400416034343698204186575808495617`.
//!
//! This wraps `ark-ff`'s `PrimeField` machinery instead of hand-rolling
//! modular arithmetic: `p` here *is* `ark_bn254::Fr`'s modulus, so the
//! reduction, inversion, and canonical-form logic already exist upstream.

use std::fmt;

use ark_ff::{BigInteger, Field as ArkField, PrimeField};
use num_bigint::BigUint;

/// A field element in `[0, p)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldElement(pub ark_bn254::Fr);

impl Default for FieldElement {
    fn default() -> Self {
        Self::zero()
    }
}

impl FieldElement {
    pub fn zero() -> Self {
        FieldElement(ark_bn254::Fr::from(0u64))
    }

    pub fn one() -> Self {
        FieldElement(ark_bn254::Fr::from(1u64))
    }

    pub fn from_u64(x: u64) -> Self {
        FieldElement(ark_bn254::Fr::from(x))
    }

    /// Parses a decimal or `0x`-prefixed hex string, reducing modulo `p`.
    pub fn from_str_radix(s: &str) -> Option<Self> {
        let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => (hex, 16),
            None => (s, 10),
        };
        let value = BigUint::parse_bytes(digits.as_bytes(), radix)?;
        Some(FieldElement(ark_bn254::Fr::from_le_bytes_mod_order(
            &value.to_bytes_le(),
        )))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == ark_bn254::Fr::from(0u64)
    }

    pub fn is_one(&self) -> bool {
        self.0 == ark_bn254::Fr::from(1u64)
    }

    /// `true` for values in `{0, 1}`.
    pub fn is_boolean(&self) -> bool {
        self.is_zero() || self.is_one()
    }

    /// `x⁻¹`, or `None` at zero (the `zerop` gadget's witness uses this).
    pub fn inverse(&self) -> Option<Self> {
        ArkField::inverse(&self.0).map(FieldElement)
    }

    pub fn neg(&self) -> Self {
        FieldElement(-self.0)
    }

    pub fn add(&self, other: &Self) -> Self {
        FieldElement(self.0 + other.0)
    }

    pub fn sub(&self, other: &Self) -> Self {
        FieldElement(self.0 - other.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        FieldElement(self.0 * other.0)
    }

    fn to_biguint(self) -> BigUint {
        BigUint::from_bytes_le(&self.0.into_bigint().to_bytes_le())
    }

    /// Little-endian bit decomposition, `n` bits. Truncates silently;
    /// callers (the `split` evaluator) must check `fits_in_bits` first and
    /// surface a `CircuitError::EvaluationInvariant` if it doesn't.
    pub fn to_bits_le(&self, n: usize) -> Vec<bool> {
        let bytes = self.0.into_bigint().to_bytes_le();
        (0..n)
            .map(|i| {
                let byte = bytes.get(i / 8).copied().unwrap_or(0);
                (byte >> (i % 8)) & 1 == 1
            })
            .collect()
    }

    /// Whether this value is representable in `n` bits, i.e. `< 2^n`.
    pub fn fits_in_bits(&self, n: usize) -> bool {
        if n >= 254 {
            return true;
        }
        self.to_biguint() < (BigUint::from(1u32) << n)
    }

    pub fn from_bits_le(bits: &[bool]) -> Self {
        let mut acc = BigUint::from(0u32);
        for (i, &b) in bits.iter().enumerate() {
            if b {
                acc |= BigUint::from(1u32) << i;
            }
        }
        FieldElement(ark_bn254::Fr::from_le_bytes_mod_order(&acc.to_bytes_le()))
    }

    /// Unpadded lowercase hex, matching the `.arith`/`.in` text formats.
    pub fn to_hex(&self) -> String {
        let bytes = self.0.into_bigint().to_bytes_be();
        let hex = hex::encode(bytes);
        let trimmed = hex.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_matches_bn254_scalar_field() {
        // The field prime, as a decimal string.
        let p = "21888242871839275222246405745257275088548364400416034343698204186575808495617";
        let expected: BigUint = p.parse().unwrap();
        let modulus: BigUint = ark_bn254::Fr::MODULUS.into();
        assert_eq!(modulus, expected);
    }

    #[test]
    fn hex_round_trip() {
        let v = FieldElement::from_u64(0xDEADBEEF);
        assert_eq!(v.to_hex(), "deadbeef");
        assert_eq!(FieldElement::from_str_radix("0xdeadbeef").unwrap(), v);
    }

    #[test]
    fn bit_round_trip() {
        let v = FieldElement::from_u64(0xDEADBEEF);
        let bits = v.to_bits_le(32);
        assert_eq!(FieldElement::from_bits_le(&bits), v);
    }

    #[test]
    fn fits_in_bits_boundary() {
        let v = FieldElement::from_u64(255);
        assert!(v.fits_in_bits(8));
        assert!(!v.fits_in_bits(7));
    }

    #[test]
    fn inverse_of_zero_is_none() {
        assert!(FieldElement::zero().inverse().is_none());
    }
}
