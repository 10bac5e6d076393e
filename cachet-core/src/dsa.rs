//! DSA signature engine.
//!
//! Domain-parameter generation, keypairs, signing and verification over
//! hand-picked prime groups. Messages are digested with SHA-256 and
//! reduced modulo the subgroup order.
//!
//! Verification is a pure boolean predicate: out-of-range signature
//! components are rejected up front (no modular inversion is attempted)
//! and a mismatch is an outcome, never an error.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};

use crate::numeric::{is_probable_prime, mod_inverse, random_prime};

/// Default width of the group prime `p`.
pub const DEFAULT_P_BITS: u64 = 512;

/// Default width of the subgroup order `q`.
pub const DEFAULT_Q_BITS: u64 = 160;

/// Miller-Rabin rounds for the `p = q*m + 1` search.
const P_SEARCH_ROUNDS: u32 = 64;

/// The shared group description `(p, q, g)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParameters {
    /// Group prime.
    pub p: BigUint,
    /// Prime order of the subgroup generated by `g`; divides `p - 1`.
    pub q: BigUint,
    /// Generator of the order-`q` subgroup.
    pub g: BigUint,
}

/// A signing keypair bound to a set of domain parameters.
#[derive(Debug, Clone)]
pub struct SignatureKeyPair {
    /// Private exponent `x` in `[1, q-1]`.
    pub x: BigUint,
    /// Public value `y = g^x mod p`.
    pub y: BigUint,
}

/// A signature: the pair `(r, s)`, each in `[1, q-1]` by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// First component.
    pub r: BigUint,
    /// Second component.
    pub s: BigUint,
}

/// Generate domain parameters `(p, q, g)`.
///
/// Picks a prime `q` of `q_bits`, then searches for a prime
/// `p = q*m + 1` of `p_bits`, then derives a generator
/// `g = h^((p-1)/q) mod p != 1`.
pub fn generate_parameters<R: Rng + CryptoRng>(
    p_bits: u64,
    q_bits: u64,
    rng: &mut R,
) -> DomainParameters {
    debug_assert!(q_bits >= 16 && q_bits + 8 <= p_bits);

    let q = random_prime(q_bits, rng);
    let cofactor_bits = p_bits - q_bits;

    let p = loop {
        let mut m = rng.gen_biguint(cofactor_bits);
        m.set_bit(cofactor_bits - 1, true);
        m.set_bit(0, false); // keep p = q*m + 1 odd
        let candidate = &q * &m + BigUint::one();
        if candidate.bits() == p_bits && is_probable_prime(&candidate, P_SEARCH_ROUNDS, rng) {
            break candidate;
        }
    };

    let exponent = (&p - BigUint::one()) / &q;
    let mut h = BigUint::from(2u32);
    let g = loop {
        let g = h.modpow(&exponent, &p);
        if !g.is_one() {
            break g;
        }
        h += BigUint::one();
    };

    DomainParameters { p, q, g }
}

/// Generate a keypair under the given parameters.
pub fn generate_keypair<R: Rng + CryptoRng>(
    params: &DomainParameters,
    rng: &mut R,
) -> SignatureKeyPair {
    let x = rng.gen_biguint_range(&BigUint::one(), &params.q);
    let y = params.g.modpow(&x, &params.p);
    SignatureKeyPair { x, y }
}

/// SHA-256 digest reduced modulo `q`.
fn digest(message: &[u8], q: &BigUint) -> BigUint {
    let hash = Sha256::digest(message);
    BigUint::from_bytes_be(&hash) % q
}

/// Sign a message with the private exponent `x`.
///
/// Samples a fresh ephemeral `k` per signature; `k` values producing a
/// zero `r` or `s` are resampled.
pub fn sign<R: Rng + CryptoRng>(
    message: &[u8],
    x: &BigUint,
    params: &DomainParameters,
    rng: &mut R,
) -> Signature {
    let h = digest(message, &params.q);
    loop {
        let k = rng.gen_biguint_range(&BigUint::one(), &params.q);
        let r = params.g.modpow(&k, &params.p) % &params.q;
        if r.is_zero() {
            continue;
        }

        // k is sampled from [1, q-1] with q prime, so the inverse exists.
        let k_inv = match mod_inverse(&k, &params.q) {
            Some(inv) => inv,
            None => continue,
        };
        let s = (k_inv * (&h + x * &r)) % &params.q;
        if s.is_zero() {
            continue;
        }

        return Signature { r, s };
    }
}

/// Verify a signature against the public value `y`.
///
/// Rejects immediately when `r` or `s` lies outside `[1, q-1]`, without
/// attempting a modular inversion. Returns a boolean, never an error.
pub fn verify(
    message: &[u8],
    signature: &Signature,
    y: &BigUint,
    params: &DomainParameters,
) -> bool {
    let Signature { r, s } = signature;
    if r.is_zero() || s.is_zero() || r >= &params.q || s >= &params.q {
        return false;
    }

    let w = match mod_inverse(s, &params.q) {
        Some(w) => w,
        None => return false,
    };
    let h = digest(message, &params.q);
    let u1 = (h * &w) % &params.q;
    let u2 = (r * &w) % &params.q;
    let v = (params.g.modpow(&u1, &params.p) * y.modpow(&u2, &params.p)) % &params.p % &params.q;
    v == *r
}
