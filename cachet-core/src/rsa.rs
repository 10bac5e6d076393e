//! RSA key transport engine.
//!
//! Raw (unpadded) RSA over arbitrary-precision integers, used solely to
//! move the 64-bit session key to the responder. Keypair generation uses
//! Miller-Rabin-tested primes and derives the private exponent modulo
//! the Carmichael function lambda(n) = lcm(p-1, q-1).

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, Rng};

use crate::numeric::{mod_inverse, random_prime};

/// Default modulus width for the responder's long-lived keypair.
///
/// Illustrative strength only; the generator accepts any width whose
/// modulus exceeds the integers encrypted under it.
pub const DEFAULT_MODULUS_BITS: u64 = 512;

/// Preferred public exponent.
const PUBLIC_EXPONENT: u32 = 65537;

/// The public half of a keypair: `(e, n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Public exponent.
    pub e: BigUint,
    /// Modulus.
    pub n: BigUint,
}

/// The private half of a keypair: `(d, n)`.
#[derive(Debug, Clone)]
pub struct RsaPrivateKey {
    /// Private exponent.
    pub d: BigUint,
    /// Modulus.
    pub n: BigUint,
}

/// An RSA keypair. Owned by the responder; only the public half ever
/// crosses the wire.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    /// The shareable half.
    pub public: RsaPublicKey,
    /// The secret half.
    pub private: RsaPrivateKey,
}

/// Generate a fresh keypair with a modulus of roughly `modulus_bits`.
///
/// Samples two primes of half the modulus width, fixes `e = 65537`
/// (falling back to successive odd candidates in the rare case it shares
/// a factor with lambda(n)), and derives `d = e^-1 mod lambda(n)`.
pub fn generate_keypair<R: Rng + CryptoRng>(modulus_bits: u64, rng: &mut R) -> RsaKeyPair {
    debug_assert!(modulus_bits >= 16);
    loop {
        let p = random_prime(modulus_bits / 2, rng);
        let q = random_prime(modulus_bits / 2, rng);
        if p == q {
            continue;
        }

        let n = &p * &q;
        let lambda = (&p - BigUint::one()).lcm(&(&q - BigUint::one()));

        let mut e = BigUint::from(PUBLIC_EXPONENT);
        // Tiny moduli may have lambda <= 65537; walk down to a coprime
        // exponent instead of failing.
        if e >= lambda {
            e = BigUint::from(3u32);
        }
        let d = loop {
            if let Some(d) = mod_inverse(&e, &lambda) {
                break d;
            }
            e += BigUint::from(2u32);
            if e >= lambda {
                break BigUint::one();
            }
        };
        if d.is_one() {
            continue;
        }

        return RsaKeyPair {
            public: RsaPublicKey { e, n: n.clone() },
            private: RsaPrivateKey { d, n },
        };
    }
}

/// Encrypt an integer under a public key: `m^e mod n`.
///
/// Caller obligation: `0 <= m < n`. A larger message wraps modulo `n`
/// and will not round-trip; this is not detected here.
pub fn encrypt(message: &BigUint, public: &RsaPublicKey) -> BigUint {
    message.modpow(&public.e, &public.n)
}

/// Decrypt an integer under the private key: `c^d mod n`.
pub fn decrypt(ciphertext: &BigUint, private: &RsaPrivateKey) -> BigUint {
    ciphertext.modpow(&private.d, &private.n)
}
