//! # MAGENTA Block Cipher
//!
//! MAGENTA (Deutsche Telekom's AES submission): a Feistel network over
//! 16-byte blocks whose round function is built from exponentiation in
//! GF(2^8).
//!
//! ## Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       MAGENTA ROUND FUNCTION                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  f(x)      = α^x in GF(2^8) / (x^8 + x^6 + x^5 + x^2 + 1), f(255) = 0 │
//! │  A(x, y)   = f(x ⊕ f(y))                                               │
//! │  PE(x, y)  = (A(x, y), A(y, x))                                        │
//! │  Π(x0..15) = PE(x0,x8) ‖ PE(x1,x9) ‖ … ‖ PE(x7,x15)                    │
//! │  T         = Π ∘ Π ∘ Π ∘ Π                                             │
//! │  S(x0..15) = (x0, x2, …, x14, x1, x3, …, x15)                          │
//! │  C¹ = T,  Cʲ(w) = T(w ⊕ S(Cʲ⁻¹(w)))                                   │
//! │                                                                         │
//! │  F(X2, Kn) = first 8 bytes of S(C³(X2 ‖ Kn))                           │
//! │  Round:  (X1, X2) → (X2, X1 ⊕ F(X2, Kn))                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Key orders per key length (Ki = i-th 8-byte key half):
//!
//! | Key bits | Rounds | Order |
//! |----------|--------|-------|
//! | 128 | 6 | K1 K1 K2 K2 K1 K1 |
//! | 192 | 6 | K1 K2 K3 K3 K2 K1 |
//! | 256 | 8 | K1 K2 K3 K4 K4 K3 K2 K1 |
//!
//! The key orders are palindromic, so decryption is `V ∘ E_K ∘ V` where `V`
//! swaps the two block halves.

use crate::error::{Error, Result};

/// MAGENTA block size in bytes
pub const MAGENTA_BLOCK_SIZE: usize = 16;

/// The GF(2^8) exponentiation table, built once per process
static F_TABLE: once_cell::sync::Lazy<[u8; 256]> = once_cell::sync::Lazy::new(build_f_table);

/// f(x) = α^x with reduction by x^8 + x^6 + x^5 + x^2 + 1, and f(255) = 0
/// so that f is a bijection on [0, 255].
fn build_f_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut value: u16 = 1;
    for entry in table.iter_mut().take(255) {
        *entry = value as u8;
        value <<= 1;
        if value & 0x100 != 0 {
            value ^= 0x165;
        }
    }
    table[255] = 0;
    table
}

#[inline]
fn f(x: u8) -> u8 {
    F_TABLE[x as usize]
}

#[inline]
fn a(x: u8, y: u8) -> u8 {
    f(x ^ f(y))
}

/// Π: byte-wise combination of the two block halves
fn pi(input: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..8 {
        out[2 * i] = a(input[i], input[i + 8]);
        out[2 * i + 1] = a(input[i + 8], input[i]);
    }
    out
}

/// T = Π applied four times
fn t(input: &[u8; 16]) -> [u8; 16] {
    pi(&pi(&pi(&pi(input))))
}

/// S: even-indexed bytes, then odd-indexed bytes
fn shuffle(input: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..8 {
        out[i] = input[2 * i];
        out[i + 8] = input[2 * i + 1];
    }
    out
}

/// C³: three chained T applications with S-feedback
fn c3(w: &[u8; 16]) -> [u8; 16] {
    let c1 = t(w);
    let mut x = *w;
    xor_in_place(&mut x, &shuffle(&c1));
    let c2 = t(&x);
    let mut y = *w;
    xor_in_place(&mut y, &shuffle(&c2));
    t(&y)
}

/// Round function: first 8 bytes of S(C³(x2 ‖ key))
fn round_fn(x2: &[u8; 8], key: &[u8; 8]) -> [u8; 8] {
    let mut w = [0u8; 16];
    w[..8].copy_from_slice(x2);
    w[8..].copy_from_slice(key);
    let s = shuffle(&c3(&w));
    let mut out = [0u8; 8];
    out.copy_from_slice(&s[..8]);
    out
}

fn xor_in_place(dst: &mut [u8; 16], src: &[u8; 16]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// A MAGENTA cipher instance holding the per-round key-half sequence
#[derive(Clone)]
pub struct Magenta {
    round_keys: Vec<[u8; 8]>,
}

impl Magenta {
    /// Build from a 16-, 24- or 32-byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        let halves: Vec<[u8; 8]> = key
            .chunks_exact(8)
            .map(|c| {
                let mut h = [0u8; 8];
                h.copy_from_slice(c);
                h
            })
            .collect();

        let order: &[usize] = match key.len() {
            16 => &[0, 0, 1, 1, 0, 0],
            24 => &[0, 1, 2, 2, 1, 0],
            32 => &[0, 1, 2, 3, 3, 2, 1, 0],
            other => return Err(Error::InvalidKeyLength(other)),
        };

        Ok(Self {
            round_keys: order.iter().map(|&i| halves[i]).collect(),
        })
    }

    /// Encrypt exactly one 16-byte block
    pub fn encrypt_block(&self, block: &[u8; MAGENTA_BLOCK_SIZE]) -> [u8; MAGENTA_BLOCK_SIZE] {
        let mut x1 = [0u8; 8];
        let mut x2 = [0u8; 8];
        x1.copy_from_slice(&block[..8]);
        x2.copy_from_slice(&block[8..]);

        for key in &self.round_keys {
            let fx = round_fn(&x2, key);
            let mut next = [0u8; 8];
            for i in 0..8 {
                next[i] = x1[i] ^ fx[i];
            }
            x1 = x2;
            x2 = next;
        }

        let mut out = [0u8; MAGENTA_BLOCK_SIZE];
        out[..8].copy_from_slice(&x1);
        out[8..].copy_from_slice(&x2);
        out
    }

    /// Decrypt exactly one 16-byte block
    ///
    /// The key orders are palindromic, so decryption is encryption wrapped
    /// in half-swaps: `D = V ∘ E ∘ V`.
    pub fn decrypt_block(&self, block: &[u8; MAGENTA_BLOCK_SIZE]) -> [u8; MAGENTA_BLOCK_SIZE] {
        swap_halves(&self.encrypt_block(&swap_halves(block)))
    }
}

impl std::fmt::Debug for Magenta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Round keys are key material; never print them
        write!(f, "Magenta({} rounds)", self.round_keys.len())
    }
}

fn swap_halves(block: &[u8; MAGENTA_BLOCK_SIZE]) -> [u8; MAGENTA_BLOCK_SIZE] {
    let mut out = [0u8; MAGENTA_BLOCK_SIZE];
    out[..8].copy_from_slice(&block[8..]);
    out[8..].copy_from_slice(&block[..8]);
    out
}

// ============================================================================
// TESTS
// ============================================================================
