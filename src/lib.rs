//! # Vesper Core
//!
//! The secure channel engine for a peer-to-peer encrypted chat: key
//! agreement, per-room cipher configuration, and chunked stream encryption
//! for text and file traffic.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VESPER CORE MODULES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐   │
//! │  │  Handshake  │  │    Suite    │  │   Crypto    │  │   Transfer   │   │
//! │  │             │  │             │  │             │  │              │   │
//! │  │ - DH (2048) │  │ - Algorithm │  │ - RC6       │  │ - 512 KiB    │   │
//! │  │ - Sessions  │  │ - Mode      │  │ - MAGENTA   │  │   chunks     │   │
//! │  │ - Tokens    │  │ - Padding   │  │ - 7 modes   │  │ - Chain      │   │
//! │  │ - Replies   │  │ - Key align │  │ - 4 pads    │  │   threading  │   │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘  └──────┬───────┘   │
//! │         │                │                │                │           │
//! │         └────────────────┴───────┬────────┴────────────────┘           │
//! │                                  │                                     │
//! │  ┌─────────────┐                 │                                     │
//! │  │   Primes    │◄────────────────┘                                     │
//! │  │             │   (safe primes & group pairs for                      │
//! │  │ - 3 tests   │    parameter generation tooling)                      │
//! │  │ - Safe p    │                                                       │
//! │  └─────────────┘                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire engine
//! - [`suite`] - Cipher suite configuration and session-key alignment
//! - [`crypto`] - Ciphers, chaining modes, padding, [`SecureContext`]
//! - [`primes`] - Probabilistic primality testing and group generation
//! - [`handshake`] - Diffie–Hellman sessions, room tokens, coordination
//! - [`transfer`] - Chunked encrypted file streaming
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY PROPERTIES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Confidentiality: RC6 or MAGENTA under the room's chaining mode,       │
//! │  keyed by a per-room DH shared secret over the fixed RFC 3526          │
//! │  2048-bit group.                                                       │
//! │                                                                         │
//! │  NOT provided: peer authentication. Public values are exchanged        │
//! │  unauthenticated, so an active man in the middle can substitute        │
//! │  keys. Equally absent: ciphertext integrity. Both are accepted         │
//! │  trade-offs of the channel design, not oversights in the embedding.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod crypto;
pub mod error;
pub mod handshake;
pub mod primes;
pub mod suite;
pub mod transfer;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{ChainState, SecureContext, BLOCK_SIZE};
pub use error::{Error, Result};
pub use handshake::{
    HandshakeCoordinator, HandshakeOutcome, OutboundHandshake, RoomToken, SessionStore,
};
pub use suite::{
    derive_session_key, Algorithm, CipherSuite, KeyLength, ModeOfOperation, PaddingKind,
    SessionKey,
};
pub use transfer::{TransferChunk, TransferStore, DEFAULT_CHUNK_SIZE};

/// Library version from Cargo.toml
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
