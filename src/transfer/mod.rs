//! # Chunked File Transfer
//!
//! Streams a file through a [`SecureContext`] in fixed-size chunks so
//! neither side ever holds the whole ciphertext in memory.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CHUNK STREAM                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  sender                                receiver                         │
//! │  ──────                                ────────                         │
//! │  chunk 1..N-1: raw 512 KiB slice  ──►  decrypt, thread chain state      │
//! │                encrypt + chain                                          │
//! │  chunk N:      pad remainder      ──►  decrypt, unpad,                  │
//! │                (even when empty)       verify declared count            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every chunk carries its sequence number, the declared total and a last
//! flag. The receiver enforces in-order delivery (the chain state makes any
//! other order undecryptable anyway) and checks the declared total when the
//! last chunk lands. Any per-chunk error is terminal: the transfer is
//! dropped and partial plaintext discarded.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::crypto::{ChainState, SecureContext, BLOCK_SIZE};
use crate::error::{Error, Result};

/// Chunk payload size used by the file pipeline: 512 KiB
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;

/// Number of chunks a transfer of `len` bytes produces
///
/// An empty file still ships one (all-padding) chunk.
pub fn amount_chunks(len: usize, chunk_size: usize) -> u64 {
    (len.div_ceil(chunk_size) as u64).max(1)
}

/// One encrypted chunk as it travels on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferChunk {
    /// 1-based sequence number
    pub number: u64,
    /// Total chunks the sender will ship
    pub amount_chunks: u64,
    /// Marks the padded final chunk
    pub is_last: bool,
    /// Ciphertext
    pub data: Vec<u8>,
}

// ============================================================================
// SENDER
// ============================================================================

/// Sender side: walks a plaintext stream chunk by chunk
///
/// Mid-stream chunks must arrive block-aligned (the natural consequence of a
/// block-multiple chunk size); only the final chunk is padded.
#[derive(Debug)]
pub struct OutboundTransfer<'a> {
    ctx: &'a SecureContext,
    chain: Option<ChainState>,
    next_number: u64,
    finished: bool,
}

impl<'a> OutboundTransfer<'a> {
    /// Start a transfer over an established room context
    pub fn new(ctx: &'a SecureContext) -> Self {
        Self {
            ctx,
            chain: None,
            next_number: 1,
            finished: false,
        }
    }

    /// Encrypt a mid-stream chunk (block-aligned, unpadded)
    pub fn push(&mut self, plaintext: &[u8], amount: u64) -> Result<TransferChunk> {
        self.encrypt(plaintext, amount, false)
    }

    /// Pad and encrypt the final chunk; any size including empty
    pub fn finish(&mut self, plaintext: &[u8], amount: u64) -> Result<TransferChunk> {
        let padded = self.ctx.add_padding(plaintext);
        self.encrypt(&padded, amount, true)
    }

    fn encrypt(&mut self, data: &[u8], amount: u64, is_last: bool) -> Result<TransferChunk> {
        if self.finished {
            return Err(Error::OutOfOrderChunk {
                expected: self.next_number,
                got: self.next_number + 1,
            });
        }
        let (ciphertext, chain) = self
            .ctx
            .encrypt_decrypt_inner(data, self.chain.as_ref(), true)?;
        self.chain = Some(chain);
        let number = self.next_number;
        self.next_number += 1;
        self.finished = is_last;
        Ok(TransferChunk {
            number,
            amount_chunks: amount,
            is_last,
            data: ciphertext,
        })
    }
}

/// Split a whole in-memory file into encrypted chunks
///
/// Convenience over [`OutboundTransfer`] for callers that do not stream from
/// disk. `chunk_size` must be a positive block multiple.
pub fn encrypt_file(
    ctx: &SecureContext,
    data: &[u8],
    chunk_size: usize,
) -> Result<Vec<TransferChunk>> {
    if chunk_size == 0 || chunk_size % BLOCK_SIZE != 0 {
        return Err(Error::MisalignedChunk(chunk_size, BLOCK_SIZE));
    }

    let amount = amount_chunks(data.len(), chunk_size);
    let mut transfer = OutboundTransfer::new(ctx);
    let mut out = Vec::with_capacity(amount as usize);

    if data.is_empty() {
        out.push(transfer.finish(&[], amount)?);
        return Ok(out);
    }

    let mut pieces = data.chunks(chunk_size).peekable();
    while let Some(piece) = pieces.next() {
        if pieces.peek().is_some() {
            out.push(transfer.push(piece, amount)?);
        } else {
            out.push(transfer.finish(piece, amount)?);
        }
    }

    tracing::debug!(bytes = data.len(), chunks = out.len(), "file encrypted");
    Ok(out)
}

// ============================================================================
// RECEIVER
// ============================================================================

/// Receiver side of one in-flight transfer
#[derive(Debug, Default)]
pub struct InboundTransfer {
    chain: Option<ChainState>,
    received: u64,
    finished: bool,
}

impl InboundTransfer {
    /// Start an empty receive state
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrypt the next chunk, returning its plaintext
    ///
    /// Enforces 1-based in-order delivery. On the final chunk the padding is
    /// removed and the declared total is checked against what arrived. Any
    /// error leaves the transfer unusable; the caller drops it and discards
    /// partial output.
    pub fn accept(&mut self, ctx: &SecureContext, chunk: &TransferChunk) -> Result<Vec<u8>> {
        let expected = self.received + 1;
        if self.finished || chunk.number != expected {
            return Err(Error::OutOfOrderChunk {
                expected,
                got: chunk.number,
            });
        }

        let (plaintext, chain) = ctx.encrypt_decrypt_inner(&chunk.data, self.chain.as_ref(), false)?;
        self.chain = Some(chain);
        self.received = expected;

        if !chunk.is_last {
            return Ok(plaintext);
        }

        if self.received != chunk.amount_chunks {
            return Err(Error::MissingChunks {
                declared: chunk.amount_chunks,
                received: self.received,
            });
        }
        self.finished = true;
        ctx.remove_padding(&plaintext)
    }

    /// Whether the final chunk has been accepted
    pub fn is_complete(&self) -> bool {
        self.finished
    }
}

/// Transfer-id → receive state, shared by the receive loop
///
/// Completed and failed transfers are removed; an abort is simply
/// [`TransferStore::remove`].
#[derive(Debug, Default)]
pub struct TransferStore {
    inner: RwLock<HashMap<String, Arc<Mutex<InboundTransfer>>>>,
}

impl TransferStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrypt a chunk for the given transfer, creating state on first sight
    ///
    /// The entry is removed when the transfer completes or fails, so a retry
    /// starts clean from chunk 1.
    pub fn accept(
        &self,
        transfer_id: &str,
        ctx: &SecureContext,
        chunk: &TransferChunk,
    ) -> Result<Vec<u8>> {
        let state = {
            let mut map = self.inner.write();
            Arc::clone(
                map.entry(transfer_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(InboundTransfer::new()))),
            )
        };

        let mut state = state.lock();
        let result = state.accept(ctx, chunk);
        if state.is_complete() || result.is_err() {
            self.inner.write().remove(transfer_id);
        }
        if let Err(e) = &result {
            tracing::warn!(transfer_id, error = %e, "transfer dropped");
        }
        result
    }

    /// Drop an in-flight transfer (sender aborted or room closed)
    pub fn remove(&self, transfer_id: &str) -> bool {
        self.inner.write().remove(transfer_id).is_some()
    }

    /// Number of in-flight transfers
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no transfer is in flight
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
