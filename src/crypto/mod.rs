//! # Cipher Pipeline
//!
//! The symmetric half of the secure channel: block ciphers, chaining modes,
//! padding, and the `SecureContext` that composes them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CIPHER PIPELINE                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  CipherSuite ──► BlockCipher (RC6 | MAGENTA)                           │
//! │       │               │                                                 │
//! │       │               ▼                                                 │
//! │       ├────────► ModeEngine (ECB CBC PCBC CFB OFB CTR RANDOM_DELTA)    │
//! │       │               │        carries ChainState between chunks       │
//! │       │               ▼                                                 │
//! │       └────────► PaddingScheme (ZEROS PKCS7 ANSI_X923 ISO_10126)       │
//! │                       │        final chunk only                         │
//! │                       ▼                                                 │
//! │                  SecureContext.encrypt_decrypt_inner                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both ciphers are deliberately from-scratch implementations: the chat
//! peers interoperate only with each other, and the wire format depends on
//! this exact code. Nothing here authenticates ciphertext — integrity
//! checking is out of scope for the channel by design.

mod block;
mod context;
mod magenta;
mod mode;
mod padding;
mod rc6;

pub use block::{Block, BlockCipher, BLOCK_SIZE};
pub use context::SecureContext;
pub use magenta::{Magenta, MAGENTA_BLOCK_SIZE};
pub use mode::{ChainState, ModeEngine};
pub use padding::{pad, unpad};
pub use rc6::{Rc6, RC6_BLOCK_SIZE};
