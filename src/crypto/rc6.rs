//! # RC6 Block Cipher
//!
//! RC6-32/20/b as specified by Rivest, Robshaw, Sidney and Yin for the AES
//! competition: 32-bit words, 20 rounds, 16/24/32-byte keys, 16-byte blocks.
//!
//! ## Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         RC6 ENCRYPTION                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Block = (A, B, C, D), four little-endian 32-bit words                 │
//! │                                                                         │
//! │  B += S[0];  D += S[1]                                                 │
//! │  for i in 1..=20:                                                      │
//! │      t = (B * (2B + 1)) <<< 5                                          │
//! │      u = (D * (2D + 1)) <<< 5                                          │
//! │      A = ((A ^ t) <<< u) + S[2i]                                       │
//! │      C = ((C ^ u) <<< t) + S[2i + 1]                                   │
//! │      (A, B, C, D) = (B, C, D, A)                                       │
//! │  A += S[42];  C += S[43]                                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic is modulo 2^32; rotation amounts use the low 5 bits of the
//! rotating operand. The 44-word round-key schedule mixes the key with the
//! magic constants P32/Q32 for `3 * max(c, 44)` iterations.
//!
//! Interoperability depends entirely on peers running the same code, so the
//! round counts, rotation amounts and constants here must match the
//! reference specification bit for bit.

use crate::error::{Error, Result};

/// RC6 block size in bytes
pub const RC6_BLOCK_SIZE: usize = 16;

/// Number of RC6 rounds
const ROUNDS: usize = 20;

/// Round keys: 2r + 4
const SCHEDULE_WORDS: usize = 2 * ROUNDS + 4;

/// P32 = Odd((e - 2) * 2^32)
const P32: u32 = 0xB7E1_5163;

/// Q32 = Odd((φ - 1) * 2^32)
const Q32: u32 = 0x9E37_79B9;

/// An RC6 cipher instance holding the expanded round-key schedule
#[derive(Clone)]
pub struct Rc6 {
    round_keys: [u32; SCHEDULE_WORDS],
}

impl Rc6 {
    /// Expand a 16-, 24- or 32-byte key into the round-key schedule
    pub fn new(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(Error::InvalidKeyLength(key.len()));
        }

        // Load the key into c little-endian words
        let c = key.len() / 4;
        let mut l = vec![0u32; c];
        for (i, chunk) in key.chunks_exact(4).enumerate() {
            l[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let mut s = [0u32; SCHEDULE_WORDS];
        s[0] = P32;
        for i in 1..SCHEDULE_WORDS {
            s[i] = s[i - 1].wrapping_add(Q32);
        }

        // Mix the key into the schedule
        let (mut a, mut b) = (0u32, 0u32);
        let (mut i, mut j) = (0usize, 0usize);
        for _ in 0..3 * SCHEDULE_WORDS.max(c) {
            a = s[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
            s[i] = a;
            let ab = a.wrapping_add(b);
            b = l[j].wrapping_add(ab).rotate_left(ab & 31);
            l[j] = b;
            i = (i + 1) % SCHEDULE_WORDS;
            j = (j + 1) % c;
        }

        Ok(Self { round_keys: s })
    }

    /// Encrypt exactly one 16-byte block
    pub fn encrypt_block(&self, block: &[u8; RC6_BLOCK_SIZE]) -> [u8; RC6_BLOCK_SIZE] {
        let (mut a, mut b, mut c, mut d) = load_words(block);
        let s = &self.round_keys;

        b = b.wrapping_add(s[0]);
        d = d.wrapping_add(s[1]);
        for i in 1..=ROUNDS {
            let t = b
                .wrapping_mul(b.wrapping_mul(2).wrapping_add(1))
                .rotate_left(5);
            let u = d
                .wrapping_mul(d.wrapping_mul(2).wrapping_add(1))
                .rotate_left(5);
            a = (a ^ t).rotate_left(u & 31).wrapping_add(s[2 * i]);
            c = (c ^ u).rotate_left(t & 31).wrapping_add(s[2 * i + 1]);
            (a, b, c, d) = (b, c, d, a);
        }
        a = a.wrapping_add(s[2 * ROUNDS + 2]);
        c = c.wrapping_add(s[2 * ROUNDS + 3]);

        store_words(a, b, c, d)
    }

    /// Decrypt exactly one 16-byte block
    pub fn decrypt_block(&self, block: &[u8; RC6_BLOCK_SIZE]) -> [u8; RC6_BLOCK_SIZE] {
        let (mut a, mut b, mut c, mut d) = load_words(block);
        let s = &self.round_keys;

        c = c.wrapping_sub(s[2 * ROUNDS + 3]);
        a = a.wrapping_sub(s[2 * ROUNDS + 2]);
        for i in (1..=ROUNDS).rev() {
            (a, b, c, d) = (d, a, b, c);
            let u = d
                .wrapping_mul(d.wrapping_mul(2).wrapping_add(1))
                .rotate_left(5);
            let t = b
                .wrapping_mul(b.wrapping_mul(2).wrapping_add(1))
                .rotate_left(5);
            c = c.wrapping_sub(s[2 * i + 1]).rotate_right(t & 31) ^ u;
            a = a.wrapping_sub(s[2 * i]).rotate_right(u & 31) ^ t;
        }
        d = d.wrapping_sub(s[1]);
        b = b.wrapping_sub(s[0]);

        store_words(a, b, c, d)
    }
}

impl std::fmt::Debug for Rc6 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Round keys are key material; never print them
        write!(f, "Rc6")
    }
}

fn load_words(block: &[u8; RC6_BLOCK_SIZE]) -> (u32, u32, u32, u32) {
    let w = |i: usize| u32::from_le_bytes([block[i], block[i + 1], block[i + 2], block[i + 3]]);
    (w(0), w(4), w(8), w(12))
}

fn store_words(a: u32, b: u32, c: u32, d: u32) -> [u8; RC6_BLOCK_SIZE] {
    let mut out = [0u8; RC6_BLOCK_SIZE];
    out[0..4].copy_from_slice(&a.to_le_bytes());
    out[4..8].copy_from_slice(&b.to_le_bytes());
    out[8..12].copy_from_slice(&c.to_le_bytes());
    out[12..16].copy_from_slice(&d.to_le_bytes());
    out
}

// ============================================================================
// TESTS
// ============================================================================
