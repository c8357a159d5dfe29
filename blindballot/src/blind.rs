//! RSA blind signatures over SHA-256 message representatives.
//!
//! The voter blinds the representative `m` of their ballot token with a
//! random factor `r`, the signer signs `m·r^e` without learning `m`, and the
//! voter divides `r` back out to obtain an ordinary RSA signature `m^d`.
//!
//! The representative is the raw SHA-256 digest of the message read as a
//! big-endian integer and reduced mod `n`. No full-domain-hash or PSS style
//! padding is applied; the signing key **must not** be used for anything other
//! than blind-signing ballot tokens.
//!
//! ### Example
//! ```
//! use blindballot::*;
//!
//! let mut rng = rand::thread_rng();
//! // Note: Uses INSECURE 512 bit key for a quick example
//! let key = KeyMaterial::generate(&mut rng, 512).unwrap().material;
//! let public_key = key.to_public();
//!
//! // Voter blinds their ballot token and keeps the blinding factor
//! let blinded = blind(&mut rng, b"candidate-7", &public_key).unwrap();
//!
//! // Signer signs without seeing the token
//! let blind_signature = sign(&blinded.blinded_value, &key).unwrap();
//!
//! // Voter unblinds and anyone can verify
//! let signature = unblind(&blind_signature, blinded.blinding_factor(), &public_key).unwrap();
//! assert!(verify(&signature, b"candidate-7", &public_key).unwrap());
//! ```

use crate::*;
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

/// Upper bound on blinding factor draws before giving up on a modulus
pub const MAX_BLINDING_ATTEMPTS: usize = 1000;

/// A blinded message representative together with its blinding factor.
///
/// Only `blinded_value` is ever sent to the signer. The blinding factor stays
/// with the voter until it is consumed by `unblind`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BlindedMessage {
    #[serde(with = "BigUintHex")]
    pub blinded_value: BigUint,

    #[serde(with = "BigUintHex")]
    blinding_factor: BigUint,
}

impl BlindedMessage {
    pub fn blinding_factor(&self) -> &BigUint {
        &self.blinding_factor
    }

    /// Split into `(blinded_value, blinding_factor)`
    pub fn into_parts(self) -> (BigUint, BigUint) {
        (self.blinded_value, self.blinding_factor)
    }
}

/// Hash a message into its integer representative modulo `n`
pub fn message_representative(message: &[u8], public_key: &KeyMaterial) -> BigUint {
    let digest = Sha256::digest(message);
    bytes_to_integer(&digest) % public_key.modulus()
}

/// Blind a message for signing.
///
/// The blinding factor is drawn uniformly from `[1, n)` and redrawn until it
/// is coprime to `n`.
pub fn blind<R: CryptoRng + RngCore>(
    rng: &mut R,
    message: &[u8],
    public_key: &KeyMaterial,
) -> Result<BlindedMessage, Error> {
    public_key.validate()?;
    let n = public_key.modulus();
    let m = message_representative(message, public_key);

    let one = BigUint::one();
    for attempt in 1..=MAX_BLINDING_ATTEMPTS {
        let r = rng.gen_biguint_range(&one, n);
        if gcd(&r, n).is_one() {
            return blind_representative(m, r, public_key);
        }
        debug!("blinding factor draw {} shares a factor with n, retrying", attempt);
    }

    Err(Error::Domain("no blinding factor coprime to the modulus"))
}

/// Blind an already computed representative with a caller chosen factor.
///
/// Used for known-answer tests. `r` must lie in `[1, n)` and be coprime to `n`.
pub fn blind_with_factor(
    message_representative: &BigUint,
    blinding_factor: &BigUint,
    public_key: &KeyMaterial,
) -> Result<BlindedMessage, Error> {
    public_key.validate()?;
    let n = public_key.modulus();
    if message_representative >= n {
        return Err(Error::Domain("message representative must be less than n"));
    }
    if blinding_factor.is_zero() || blinding_factor >= n || !gcd(blinding_factor, n).is_one() {
        return Err(Error::NoInverse);
    }

    blind_representative(
        message_representative.clone(),
        blinding_factor.clone(),
        public_key,
    )
}

fn blind_representative(
    m: BigUint,
    r: BigUint,
    public_key: &KeyMaterial,
) -> Result<BlindedMessage, Error> {
    let n = public_key.modulus();
    let r_e = mod_pow(&r, public_key.public_exponent(), n)?;
    let blinded_value = mul_mod(&m, &r_e, n)?;

    Ok(BlindedMessage {
        blinded_value,
        blinding_factor: r,
    })
}

/// Sign a blinded value with the session's private key: `blinded^d mod n`.
///
/// This performs no bookkeeping. Callers gate it on an unconsumed redemption key.
pub fn sign(blinded_value: &BigUint, private_key: &KeyMaterial) -> Result<BigUint, Error> {
    private_key.validate()?;
    let d = private_key.private_exponent()?;
    let n = private_key.modulus();
    if blinded_value >= n {
        return Err(Error::Domain("blinded value must be less than n"));
    }

    mod_pow(blinded_value, d, n)
}

/// Remove the blinding factor from a blind signature: `s·r^-1 mod n`.
pub fn unblind(
    blind_signature: &BigUint,
    blinding_factor: &BigUint,
    public_key: &KeyMaterial,
) -> Result<BigUint, Error> {
    public_key.validate()?;
    let n = public_key.modulus();
    if blinding_factor.is_zero() || blinding_factor >= n {
        error!("blindballot: unblind called with a blinding factor outside [1, n)");
        return Err(Error::NoInverse);
    }

    let r_inverse = mod_inverse(blinding_factor, n).map_err(|e| {
        error!("blindballot: blinding factor is not invertible, mismatched blinding factor?");
        e
    })?;

    mul_mod(blind_signature, &r_inverse, n)
}

/// Verify an unblinded signature against the original message.
///
/// A mismatch is `Ok(false)`. Only malformed key material is an error.
pub fn verify(
    signature: &BigUint,
    message: &[u8],
    public_key: &KeyMaterial,
) -> Result<bool, Error> {
    public_key.validate()?;
    let m = message_representative(message, public_key);
    verify_representative(signature, &m, public_key)
}

/// Verify a signature directly against a message representative
pub fn verify_representative(
    signature: &BigUint,
    message_representative: &BigUint,
    public_key: &KeyMaterial,
) -> Result<bool, Error> {
    public_key.validate()?;
    let n = public_key.modulus();
    if signature >= n {
        return Ok(false);
    }

    let recovered = mod_pow(signature, public_key.public_exponent(), n)?;
    Ok(&recovered == message_representative)
}
