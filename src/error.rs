//! # Error Handling
//!
//! This module provides the error types for the Vesper secure channel engine.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Suite Errors                                                      │
//! │  │   ├── InvalidKeyLength       - Key is not 16/24/32 bytes            │
//! │  │   ├── InvalidIvLength        - IV is not one cipher block           │
//! │  │   └── UnsupportedCipherSuite - Unknown algorithm/mode/padding name  │
//! │  │                                                                      │
//! │  ├── Handshake Errors                                                  │
//! │  │   ├── MalformedToken         - Token fails base64/field-count check │
//! │  │   ├── NoSharedSecret         - Context requested before handshake   │
//! │  │   ├── MalformedPublicValue   - Peer public value not a decimal int  │
//! │  │   └── PeerUnreachable        - Handshake delivery failed (caller)   │
//! │  │                                                                      │
//! │  ├── Stream Errors                                                     │
//! │  │   ├── MisalignedChunk        - Chunk not a block multiple           │
//! │  │   ├── PaddingValidationFailure - Wrong key or corrupted data        │
//! │  │   ├── MissingChunks          - Declared/received count mismatch     │
//! │  │   ├── OutOfOrderChunk        - Chunk number broke the sequence      │
//! │  │   ├── TransferNotFound       - Unknown transfer id                  │
//! │  │   ├── ChainStateMismatch     - Chain state from a different mode    │
//! │  │   └── MalformedCiphertext    - Wire ciphertext not valid base64     │
//! │  │                                                                      │
//! │  └── Generation Errors                                                 │
//! │      ├── InvalidConfidence      - Confidence outside [0.5, 1.0)        │
//! │      └── BitLengthTooSmall      - Candidate width below the minimum    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Construction-time errors (bad suite, bad key length, bad IV) fail fast —
//! the engine never falls back to a default suite. Per-chunk cryptographic
//! errors are terminal for the affected stream: the caller discards partial
//! output and the chain state, and decides whether to notify the user.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the secure channel engine
///
/// Errors are categorized by the stage of the pipeline that produced them:
/// suite construction, handshake, streaming, or key-material generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ========================================================================
    // Suite Errors (100-199)
    // ========================================================================

    /// Key length is not one of the three supported sizes
    #[error("Invalid key length: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeyLength(usize),

    /// IV length does not match the cipher block size
    #[error("Invalid IV length: {0} bytes (expected one {1}-byte block)")]
    InvalidIvLength(usize, usize),

    /// Unknown algorithm, mode or padding name
    #[error("Unsupported cipher suite component: {0}")]
    UnsupportedCipherSuite(String),

    // ========================================================================
    // Handshake Errors (200-299)
    // ========================================================================

    /// Handshake token is not valid base64/UTF-8 or has the wrong field count
    #[error("Malformed room token: {0}")]
    MalformedToken(String),

    /// A secure context was requested before the handshake completed
    #[error("No shared secret for room '{0}'. Complete the handshake first.")]
    NoSharedSecret(String),

    /// Peer public value is not a decimal integer
    #[error("Malformed peer public value: {0}")]
    MalformedPublicValue(String),

    /// Handshake delivery failed (reported by the transport caller)
    #[error("Peer unreachable: handshake for room '{0}' was not delivered")]
    PeerUnreachable(String),

    // ========================================================================
    // Stream Errors (300-399)
    // ========================================================================

    /// A chunk handed to the mode engine was not a multiple of the block size
    #[error("Misaligned chunk: {0} bytes is not a multiple of the {1}-byte block")]
    MisalignedChunk(usize, usize),

    /// Padding bytes are not well-formed for the declared scheme
    ///
    /// Signals either a wrong key or data corruption. Terminal for the
    /// affected stream.
    #[error("Padding validation failed: {0}")]
    PaddingValidationFailure(String),

    /// Declared chunk count does not match the received count
    #[error("Missing chunks: declared {declared}, received {received}")]
    MissingChunks {
        /// Chunk count announced by the sender
        declared: u64,
        /// Chunks actually received when the stream completed
        received: u64,
    },

    /// A chunk arrived out of sequence
    #[error("Out-of-order chunk: expected {expected}, got {got}")]
    OutOfOrderChunk {
        /// The next chunk number the stream expected
        expected: u64,
        /// The chunk number that actually arrived
        got: u64,
    },

    /// No active transfer with the given id
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    /// A chain state produced under a different mode was threaded in
    #[error("Chain state does not belong to this mode of operation")]
    ChainStateMismatch,

    /// Wire ciphertext is not valid base64
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    // ========================================================================
    // Generation Errors (400-499)
    // ========================================================================

    /// Primality confidence outside the supported range
    #[error("Confidence must be in [0.5, 1.0), got {0}")]
    InvalidConfidence(f64),

    /// Requested bit length is too small to be meaningful
    #[error("Bit length too small: {0} (minimum {1})")]
    BitLengthTooSmall(u64, u64),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Cipher suite construction
    /// - 200-299: Handshake
    /// - 300-399: Streaming
    /// - 400-499: Key-material generation
    pub fn code(&self) -> i32 {
        match self {
            // Suite (100-199)
            Error::InvalidKeyLength(_) => 100,
            Error::InvalidIvLength(_, _) => 101,
            Error::UnsupportedCipherSuite(_) => 102,

            // Handshake (200-299)
            Error::MalformedToken(_) => 200,
            Error::NoSharedSecret(_) => 201,
            Error::MalformedPublicValue(_) => 202,
            Error::PeerUnreachable(_) => 203,

            // Stream (300-399)
            Error::MisalignedChunk(_, _) => 300,
            Error::PaddingValidationFailure(_) => 301,
            Error::MissingChunks { .. } => 302,
            Error::OutOfOrderChunk { .. } => 303,
            Error::TransferNotFound(_) => 304,
            Error::ChainStateMismatch => 305,
            Error::MalformedCiphertext(_) => 306,

            // Generation (400-499)
            Error::InvalidConfidence(_) => 400,
            Error::BitLengthTooSmall(_, _) => 401,
        }
    }

    /// Whether this error is terminal for the stream that produced it
    ///
    /// Terminal errors mean the caller must discard partial output and the
    /// chain state; construction-time errors are not stream-scoped at all.
    pub fn is_stream_fatal(&self) -> bool {
        matches!(
            self,
            Error::PaddingValidationFailure(_)
                | Error::MissingChunks { .. }
                | Error::OutOfOrderChunk { .. }
                | Error::MisalignedChunk(_, _)
                | Error::ChainStateMismatch
                | Error::MalformedCiphertext(_)
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
