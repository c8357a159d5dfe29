use crate::*;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Interpret bytes as a big-endian unsigned integer
pub fn bytes_to_integer(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Minimal big-endian encoding of an unsigned integer
pub fn integer_to_bytes(value: &BigUint) -> Vec<u8> {
    value.to_bytes_be()
}

/// Canonical lowercase hex, without a `0x` prefix or leading zeros.
pub fn integer_to_hex(value: &BigUint) -> String {
    value.to_str_radix(16)
}

/// Parse a hex string produced by `integer_to_hex`.
///
/// Upper-case digits and leading zeros are tolerated. Prefixes, signs,
/// whitespace and empty strings are not.
pub fn hex_to_integer(hex: &str) -> Result<BigUint, Error> {
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidHex);
    }
    BigUint::parse_bytes(hex.as_bytes(), 16).ok_or(Error::InvalidHex)
}

/// `base^exponent mod modulus`
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint, Error> {
    if modulus.is_zero() {
        return Err(Error::Domain("modulus must be positive"));
    }
    Ok(base.modpow(exponent, modulus))
}

/// `a * b mod modulus`
pub fn mul_mod(a: &BigUint, b: &BigUint, modulus: &BigUint) -> Result<BigUint, Error> {
    if modulus.is_zero() {
        return Err(Error::Domain("modulus must be positive"));
    }
    Ok((a * b) % modulus)
}

/// Multiplicative inverse of `a` modulo `modulus`
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Result<BigUint, Error> {
    if modulus.is_zero() {
        return Err(Error::Domain("modulus must be positive"));
    }
    let reduced = a % modulus;
    if reduced.is_zero() || !gcd(&reduced, modulus).is_one() {
        return Err(Error::NoInverse);
    }
    reduced.modinv(modulus).ok_or(Error::NoInverse)
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}
