//! # Secure Context
//!
//! Composes one block cipher, one mode of operation, one padding scheme and
//! an IV into the single encrypt/decrypt-chunk API consumed by the chat and
//! file pipelines.
//!
//! ## Streaming Contract
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CHUNKED STREAM SHAPE                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Sender                                                                │
//! │    chunk 1..N-1:  encrypt_decrypt_inner(raw, chain, true)              │
//! │                   (must already be block-aligned, no padding)          │
//! │    chunk N:       add_padding → encrypt_decrypt_inner                  │
//! │                                                                         │
//! │  Receiver                                                              │
//! │    chunk 1..N-1:  encrypt_decrypt_inner(ct, chain, false)              │
//! │    chunk N:       encrypt_decrypt_inner → remove_padding               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Padding only the last chunk is essential: padding mid-stream would
//! corrupt the chaining state carried into the following chunk.
//!
//! The suite is resolved to concrete variants exactly once, here; a room
//! that changes its suite needs a fresh context, which also resets all
//! chaining state.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::block::{Block, BlockCipher, BLOCK_SIZE};
use crate::crypto::mode::{ChainState, ModeEngine};
use crate::crypto::padding;
use crate::error::{Error, Result};
use crate::suite::{CipherSuite, PaddingKind, SessionKey};

/// One room's ready-to-use encryption pipeline
///
/// Pure computation; no internal locking. Callers must serialize chunk
/// calls per logical stream (see [`crate::crypto::mode`]).
#[derive(Debug)]
pub struct SecureContext {
    cipher: BlockCipher,
    mode: crate::suite::ModeOfOperation,
    padding: PaddingKind,
    iv: Block,
}

impl SecureContext {
    /// Build a context from a room's suite and its aligned session key
    ///
    /// Fails fast on an unsupported key length or a wrong-size IV; there is
    /// no fallback suite.
    pub fn new(suite: &CipherSuite, key: &SessionKey) -> Result<Self> {
        if key.len() != suite.key_length.byte_len() {
            return Err(Error::InvalidKeyLength(key.len()));
        }
        if suite.iv.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvLength(suite.iv.len(), BLOCK_SIZE));
        }

        let cipher = BlockCipher::new(suite.algorithm, key.as_bytes())?;
        let mut iv = [0u8; BLOCK_SIZE];
        iv.copy_from_slice(&suite.iv);

        tracing::debug!(
            algorithm = suite.algorithm.wire_name(),
            mode = suite.mode.wire_name(),
            padding = suite.padding.wire_name(),
            "secure context built"
        );

        Ok(Self {
            cipher,
            mode: suite.mode,
            padding: suite.padding,
            iv,
        })
    }

    /// Transform one block-aligned chunk, threading the chain state
    ///
    /// `previous = None` starts a fresh stream seeded from the IV. The
    /// returned state must be passed to the next call for the same stream,
    /// and discarded if the stream is aborted.
    pub fn encrypt_decrypt_inner(
        &self,
        data: &[u8],
        previous: Option<&ChainState>,
        encrypting: bool,
    ) -> Result<(Vec<u8>, ChainState)> {
        ModeEngine::new(&self.cipher, self.mode, self.iv).process_chunk(data, previous, encrypting)
    }

    /// Pad a final plaintext fragment with this context's padding scheme
    pub fn add_padding(&self, data: &[u8]) -> Vec<u8> {
        padding::pad(self.padding, data)
    }

    /// Reverse [`Self::add_padding`] on a decrypted final fragment
    pub fn remove_padding(&self, data: &[u8]) -> Result<Vec<u8>> {
        padding::unpad(self.padding, data)
    }

    /// Encrypt one whole message (chat text path): pad, then single chunk
    pub fn encrypt_message(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let padded = self.add_padding(plaintext);
        let (ciphertext, _) = self.encrypt_decrypt_inner(&padded, None, true)?;
        Ok(ciphertext)
    }

    /// Decrypt one whole message (chat text path): single chunk, then unpad
    pub fn decrypt_message(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let (padded, _) = self.encrypt_decrypt_inner(ciphertext, None, false)?;
        self.remove_padding(&padded)
    }

    /// [`Self::encrypt_message`] with the base64 ciphertext the chat wire
    /// carries
    pub fn encrypt_message_b64(&self, plaintext: &[u8]) -> Result<String> {
        Ok(BASE64.encode(self.encrypt_message(plaintext)?))
    }

    /// Reverse [`Self::encrypt_message_b64`]
    pub fn decrypt_message_b64(&self, ciphertext: &str) -> Result<Vec<u8>> {
        let raw = BASE64
            .decode(ciphertext.as_bytes())
            .map_err(|e| Error::MalformedCiphertext(e.to_string()))?;
        self.decrypt_message(&raw)
    }
}

// ============================================================================
// TESTS
// ============================================================================
