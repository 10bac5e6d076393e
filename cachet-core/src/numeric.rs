//! Shared number theory for the RSA and DSA engines.
//!
//! Everything here takes its randomness as an explicit parameter so key
//! generation is reproducible under a seeded RNG.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};

/// Miller-Rabin rounds used for prime generation.
///
/// 2^-128 false-positive bound; plenty for illustrative key sizes.
const MILLER_RABIN_ROUNDS: u32 = 64;

/// Small primes used for cheap trial division before Miller-Rabin.
const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67,
    71, 73, 79, 83, 89, 97,
];

/// Miller-Rabin probabilistic primality test with random bases.
pub fn is_probable_prime<R: Rng + CryptoRng>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for sp in SMALL_PRIMES {
        let sp = BigUint::from(sp);
        if n == &sp {
            return true;
        }
        if (n % &sp).is_zero() {
            return false;
        }
    }

    // Write n-1 as 2^r * d with d odd.
    let n_minus_1 = n - BigUint::one();
    let mut d = n_minus_1.clone();
    let mut r = 0u32;
    while d.is_even() {
        d >>= 1;
        r += 1;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generate a random prime of exactly `bits` bits.
///
/// Top and bottom bits are forced so the result has full width and is odd.
pub fn random_prime<R: Rng + CryptoRng>(bits: u64, rng: &mut R) -> BigUint {
    debug_assert!(bits >= 2);
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, rng) {
            return candidate;
        }
    }
}

/// Modular inverse via the extended Euclidean algorithm.
///
/// Returns `None` when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = BigInt::from(a.clone());
    let m = BigInt::from(m.clone());
    let ext = a.extended_gcd(&m);
    if !ext.gcd.is_one() {
        return None;
    }
    let inv = ext.x.mod_floor(&m);
    inv.to_biguint()
}
