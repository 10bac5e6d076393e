//! DES block cipher and ECB mode.
//!
//! Hand-implemented 16-round Feistel cipher over 64-bit blocks with the
//! published DES tables. Decryption is encryption with the round keys in
//! reverse order; any deviation in table values breaks that symmetry, so
//! the tables are pinned by the classic test vector below.
//!
//! # Deliberate limitations
//!
//! - ECB mode: blocks are encrypted independently, no chaining, no
//!   integrity tag. Corruption is undetectable here and only surfaces
//!   indirectly through signature verification.
//! - Padding is PKCS#7-style but stripped leniently on decrypt, so a
//!   wrong key produces garbage bytes instead of a structural error.

use rand::{CryptoRng, Rng};

use crate::error::ProtocolError;

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 8;

/// Number of Feistel rounds.
const ROUNDS: usize = 16;

/// Initial permutation (bit positions are 1-based from the MSB).
#[rustfmt::skip]
const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10,  2,
    60, 52, 44, 36, 28, 20, 12,  4,
    62, 54, 46, 38, 30, 22, 14,  6,
    64, 56, 48, 40, 32, 24, 16,  8,
    57, 49, 41, 33, 25, 17,  9,  1,
    59, 51, 43, 35, 27, 19, 11,  3,
    61, 53, 45, 37, 29, 21, 13,  5,
    63, 55, 47, 39, 31, 23, 15,  7,
];

/// Final permutation (inverse of IP).
#[rustfmt::skip]
const FP: [u8; 64] = [
    40,  8, 48, 16, 56, 24, 64, 32,
    39,  7, 47, 15, 55, 23, 63, 31,
    38,  6, 46, 14, 54, 22, 62, 30,
    37,  5, 45, 13, 53, 21, 61, 29,
    36,  4, 44, 12, 52, 20, 60, 28,
    35,  3, 43, 11, 51, 19, 59, 27,
    34,  2, 42, 10, 50, 18, 58, 26,
    33,  1, 41,  9, 49, 17, 57, 25,
];

/// Expansion of the 32-bit half-block to 48 bits.
#[rustfmt::skip]
const E: [u8; 48] = [
    32,  1,  2,  3,  4,  5,
     4,  5,  6,  7,  8,  9,
     8,  9, 10, 11, 12, 13,
    12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21,
    20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29,
    28, 29, 30, 31, 32,  1,
];

/// Permutation applied to the S-box output.
#[rustfmt::skip]
const P: [u8; 32] = [
    16,  7, 20, 21,
    29, 12, 28, 17,
     1, 15, 23, 26,
     5, 18, 31, 10,
     2,  8, 24, 14,
    32, 27,  3,  9,
    19, 13, 30,  6,
    22, 11,  4, 25,
];

/// Permuted choice 1: 64-bit key to 56 bits (drops parity bits).
#[rustfmt::skip]
const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17,  9,
     1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27,
    19, 11,  3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15,
     7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29,
    21, 13,  5, 28, 20, 12,  4,
];

/// Permuted choice 2: 56 bits to the 48-bit round key.
#[rustfmt::skip]
const PC2: [u8; 48] = [
    14, 17, 11, 24,  1,  5,
     3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8,
    16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55,
    30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53,
    46, 42, 50, 36, 29, 32,
];

/// Per-round left-rotation amounts for the key halves.
const SHIFTS: [u32; ROUNDS] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

/// The eight S-boxes, each flattened to 4 rows of 16 entries.
#[rustfmt::skip]
const SBOXES: [[u8; 64]; 8] = [
    [
        14,  4, 13,  1,  2, 15, 11,  8,  3, 10,  6, 12,  5,  9,  0,  7,
         0, 15,  7,  4, 14,  2, 13,  1, 10,  6, 12, 11,  9,  5,  3,  8,
         4,  1, 14,  8, 13,  6,  2, 11, 15, 12,  9,  7,  3, 10,  5,  0,
        15, 12,  8,  2,  4,  9,  1,  7,  5, 11,  3, 14, 10,  0,  6, 13,
    ],
    [
        15,  1,  8, 14,  6, 11,  3,  4,  9,  7,  2, 13, 12,  0,  5, 10,
         3, 13,  4,  7, 15,  2,  8, 14, 12,  0,  1, 10,  6,  9, 11,  5,
         0, 14,  7, 11, 10,  4, 13,  1,  5,  8, 12,  6,  9,  3,  2, 15,
        13,  8, 10,  1,  3, 15,  4,  2, 11,  6,  7, 12,  0,  5, 14,  9,
    ],
    [
        10,  0,  9, 14,  6,  3, 15,  5,  1, 13, 12,  7, 11,  4,  2,  8,
        13,  7,  0,  9,  3,  4,  6, 10,  2,  8,  5, 14, 12, 11, 15,  1,
        13,  6,  4,  9,  8, 15,  3,  0, 11,  1,  2, 12,  5, 10, 14,  7,
         1, 10, 13,  0,  6,  9,  8,  7,  4, 15, 14,  3, 11,  5,  2, 12,
    ],
    [
         7, 13, 14,  3,  0,  6,  9, 10,  1,  2,  8,  5, 11, 12,  4, 15,
        13,  8, 11,  5,  6, 15,  0,  3,  4,  7,  2, 12,  1, 10, 14,  9,
        10,  6,  9,  0, 12, 11,  7, 13, 15,  1,  3, 14,  5,  2,  8,  4,
         3, 15,  0,  6, 10,  1, 13,  8,  9,  4,  5, 11, 12,  7,  2, 14,
    ],
    [
         2, 12,  4,  1,  7, 10, 11,  6,  8,  5,  3, 15, 13,  0, 14,  9,
        14, 11,  2, 12,  4,  7, 13,  1,  5,  0, 15, 10,  3,  9,  8,  6,
         4,  2,  1, 11, 10, 13,  7,  8, 15,  9, 12,  5,  6,  3,  0, 14,
        11,  8, 12,  7,  1, 14,  2, 13,  6, 15,  0,  9, 10,  4,  5,  3,
    ],
    [
        12,  1, 10, 15,  9,  2,  6,  8,  0, 13,  3,  4, 14,  7,  5, 11,
        10, 15,  4,  2,  7, 12,  9,  5,  6,  1, 13, 14,  0, 11,  3,  8,
         9, 14, 15,  5,  2,  8, 12,  3,  7,  0,  4, 10,  1, 13, 11,  6,
         4,  3,  2, 12,  9,  5, 15, 10, 11, 14,  1,  7,  6,  0,  8, 13,
    ],
    [
         4, 11,  2, 14, 15,  0,  8, 13,  3, 12,  9,  7,  5, 10,  6,  1,
        13,  0, 11,  7,  4,  9,  1, 10, 14,  3,  5, 12,  2, 15,  8,  6,
         1,  4, 11, 13, 12,  3,  7, 14, 10, 15,  6,  8,  0,  5,  9,  2,
         6, 11, 13,  8,  1,  4, 10,  7,  9,  5,  0, 15, 14,  2,  3, 12,
    ],
    [
        13,  2,  8,  4,  6, 15, 11,  1, 10,  9,  3, 14,  5,  0, 12,  7,
         1, 15, 13,  8, 10,  3,  7,  4, 12,  5,  6, 11,  0, 14,  9,  2,
         7, 11,  4,  1,  9, 12, 14,  2,  0,  6, 10, 13, 15,  3,  5,  8,
         2,  1, 14,  7,  4, 10,  8, 13, 15, 12,  9,  0,  3,  5,  6, 11,
    ],
];

/// Apply a bit permutation table to `value`.
///
/// Table entries are 1-based positions counted from the MSB of a
/// `from_width`-bit value; the output packs selected bits MSB-first.
fn permute(value: u64, from_width: u32, table: &[u8]) -> u64 {
    let mut out = 0u64;
    for &pos in table {
        out = (out << 1) | ((value >> (from_width - u32::from(pos))) & 1);
    }
    out
}

/// A 64-bit symmetric session key.
///
/// Wire representation is a 16-nibble hex string. Generated fresh per
/// exchange, never reused, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricKey(u64);

impl SymmetricKey {
    /// Generate a uniformly random key.
    pub fn generate<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        Self(rng.gen())
    }

    /// Parse a key from its 16-nibble hex form.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidKey`] unless the input is exactly
    /// 16 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, ProtocolError> {
        if s.len() != 16 {
            return Err(ProtocolError::InvalidKey);
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ProtocolError::InvalidKey)
    }

    /// The 16-nibble hex form used at the wire boundary.
    pub fn to_hex(self) -> String {
        format!("{:016X}", self.0)
    }

    /// The key as a raw 64-bit value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Build a key from a raw 64-bit value.
    pub fn from_u64(bits: u64) -> Self {
        Self(bits)
    }
}

/// The expanded round-key sequence.
///
/// A pure, deterministic function of the key. Sixteen 48-bit subkeys
/// stored in the low bits of each word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundKeys([u64; ROUNDS]);

impl RoundKeys {
    /// Expand a 64-bit key via PC-1, the rotation schedule and PC-2.
    pub fn schedule(key: u64) -> Self {
        let permuted = permute(key, 64, &PC1);
        let mut c = (permuted >> 28) & 0x0FFF_FFFF;
        let mut d = permuted & 0x0FFF_FFFF;

        let mut keys = [0u64; ROUNDS];
        for (round, &shift) in SHIFTS.iter().enumerate() {
            c = ((c << shift) | (c >> (28 - shift))) & 0x0FFF_FFFF;
            d = ((d << shift) | (d >> (28 - shift))) & 0x0FFF_FFFF;
            keys[round] = permute((c << 28) | d, 56, &PC2);
        }
        Self(keys)
    }
}

/// The Feistel round function: expand, mix the round key, substitute,
/// permute.
fn f(half: u32, round_key: u64) -> u32 {
    let expanded = permute(u64::from(half), 32, &E);
    let mixed = expanded ^ round_key;

    let mut out = 0u32;
    for (i, sbox) in SBOXES.iter().enumerate() {
        let chunk = ((mixed >> (42 - 6 * i)) & 0x3F) as usize;
        let row = ((chunk >> 4) & 0b10) | (chunk & 1);
        let col = (chunk >> 1) & 0xF;
        out = (out << 4) | u32::from(sbox[row * 16 + col]);
    }
    permute(u64::from(out), 32, &P) as u32
}

/// Run the 16 Feistel rounds with the given key order.
fn run_rounds(block: u64, keys: &RoundKeys, decrypt: bool) -> u64 {
    let permuted = permute(block, 64, &IP);
    let mut left = (permuted >> 32) as u32;
    let mut right = permuted as u32;

    for round in 0..ROUNDS {
        let key = if decrypt {
            keys.0[ROUNDS - 1 - round]
        } else {
            keys.0[round]
        };
        let next = left ^ f(right, key);
        left = right;
        right = next;
    }

    // Halves are swapped before the final permutation.
    let preoutput = (u64::from(right) << 32) | u64::from(left);
    permute(preoutput, 64, &FP)
}

/// Encrypt one 64-bit block.
pub fn encrypt_block(block: u64, keys: &RoundKeys) -> u64 {
    run_rounds(block, keys, false)
}

/// Decrypt one 64-bit block (same rounds, reversed key order).
pub fn decrypt_block(block: u64, keys: &RoundKeys) -> u64 {
    run_rounds(block, keys, true)
}

/// Encrypt a byte sequence in ECB mode, returning hex text.
///
/// The plaintext is padded PKCS#7-style: 1..=8 bytes, each equal to the
/// pad length, so a block-aligned input gains one full padding block.
/// Blocks are encrypted independently with no chaining.
pub fn ecb_encrypt(plaintext: &[u8], key: &SymmetricKey) -> String {
    let keys = RoundKeys::schedule(key.as_u64());

    let pad = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
    let mut padded = plaintext.to_vec();
    padded.resize(plaintext.len() + pad, pad as u8);

    let mut out = Vec::with_capacity(padded.len());
    for chunk in padded.chunks_exact(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        let encrypted = encrypt_block(u64::from_be_bytes(block), &keys);
        out.extend_from_slice(&encrypted.to_be_bytes());
    }
    hex::encode(out)
}

/// Decrypt ECB hex text back into bytes.
///
/// Padding removal is lenient: if the final byte is in 1..=8 that many
/// bytes are stripped, otherwise nothing is. Decrypting with the wrong
/// key therefore yields garbage rather than an error (ECB has no
/// integrity check).
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidCiphertext`] if the input is not hex
/// or not a positive whole number of blocks.
pub fn ecb_decrypt(ciphertext_hex: &str, key: &SymmetricKey) -> Result<Vec<u8>, ProtocolError> {
    let bytes = hex::decode(ciphertext_hex).map_err(|_| ProtocolError::InvalidCiphertext)?;
    if bytes.is_empty() || bytes.len() % BLOCK_SIZE != 0 {
        return Err(ProtocolError::InvalidCiphertext);
    }

    let keys = RoundKeys::schedule(key.as_u64());
    let mut out = Vec::with_capacity(bytes.len());
    for chunk in bytes.chunks_exact(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        let decrypted = decrypt_block(u64::from_be_bytes(block), &keys);
        out.extend_from_slice(&decrypted.to_be_bytes());
    }

    let pad = usize::from(*out.last().unwrap_or(&0));
    if (1..=BLOCK_SIZE).contains(&pad) {
        out.truncate(out.len() - pad);
    }
    Ok(out)
}
