//! # Block Cipher Dispatch
//!
//! A closed enum over the two supported algorithms. The supported set is
//! fixed, so dispatch is a tagged variant resolved once at context
//! construction — exhaustiveness checking catches an unhandled suite at
//! compile time.

use crate::crypto::magenta::Magenta;
use crate::crypto::rc6::Rc6;
use crate::error::Result;
use crate::suite::Algorithm;

/// Block size shared by both supported algorithms, in bytes
pub const BLOCK_SIZE: usize = 16;

/// One fixed-size cipher block
pub type Block = [u8; BLOCK_SIZE];

/// A keyed block cipher: pure, deterministic, stateless per call
#[derive(Debug, Clone)]
pub enum BlockCipher {
    /// RC6-32/20
    Rc6(Rc6),
    /// MAGENTA
    Magenta(Magenta),
}

impl BlockCipher {
    /// Construct the cipher selected by `algorithm`, keyed with `key`
    ///
    /// Fails with `InvalidKeyLength` unless the key is 16, 24 or 32 bytes.
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self> {
        Ok(match algorithm {
            Algorithm::Rc6 => BlockCipher::Rc6(Rc6::new(key)?),
            Algorithm::Magenta => BlockCipher::Magenta(Magenta::new(key)?),
        })
    }

    /// Encrypt exactly one block
    pub fn encrypt_block(&self, block: &Block) -> Block {
        match self {
            BlockCipher::Rc6(c) => c.encrypt_block(block),
            BlockCipher::Magenta(c) => c.encrypt_block(block),
        }
    }

    /// Decrypt exactly one block
    pub fn decrypt_block(&self, block: &Block) -> Block {
        match self {
            BlockCipher::Rc6(c) => c.decrypt_block(block),
            BlockCipher::Magenta(c) => c.decrypt_block(block),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
