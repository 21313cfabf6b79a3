//! # Cipher Suite
//!
//! The tuple of algorithm, key length, mode of operation, padding scheme and
//! IV that governs one room's traffic.
//!
//! A suite is immutable once a [`SecureContext`](crate::crypto::SecureContext)
//! has been built from it. A room may change its suite between messages; the
//! caller must then build a fresh context so that all chaining state resets.
//!
//! ## Wire Names
//!
//! | Component | Accepted names |
//! |-----------|----------------|
//! | Algorithm | `RC6`, `MAGENTA` |
//! | Key bits  | `128`, `192`, `256` |
//! | Mode      | `ECB`, `CBC`, `PCBC`, `CFB`, `OFB`, `CTR`, `RANDOM_DELTA` |
//! | Padding   | `ZEROS`, `PKCS7`, `ANSI_X923`, `ISO_10126` |
//!
//! Unknown names fail fast with [`Error::UnsupportedCipherSuite`] — the
//! engine never falls back to a default suite.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::BLOCK_SIZE;
use crate::error::{Error, Result};

// ============================================================================
// COMPONENT ENUMS
// ============================================================================

/// Symmetric block cipher algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// RC6-32/20 (16-byte block, data-dependent rotations)
    Rc6,
    /// MAGENTA (16-byte block, GF(2^8) Feistel network)
    Magenta,
}

impl Algorithm {
    /// Parse a wire name as carried in room tokens
    pub fn from_wire(name: &str) -> Result<Self> {
        match name {
            "RC6" => Ok(Algorithm::Rc6),
            "MAGENTA" => Ok(Algorithm::Magenta),
            other => Err(Error::UnsupportedCipherSuite(format!(
                "algorithm '{other}'"
            ))),
        }
    }

    /// The wire name as carried in room tokens
    pub fn wire_name(&self) -> &'static str {
        match self {
            Algorithm::Rc6 => "RC6",
            Algorithm::Magenta => "MAGENTA",
        }
    }
}

/// Supported key lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyLength {
    /// 128-bit key (16 bytes)
    Bits128,
    /// 192-bit key (24 bytes)
    Bits192,
    /// 256-bit key (32 bytes)
    Bits256,
}

impl KeyLength {
    /// Key size in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            KeyLength::Bits128 => 16,
            KeyLength::Bits192 => 24,
            KeyLength::Bits256 => 32,
        }
    }

    /// Parse a wire name (`"128"`, `"192"`, `"256"`)
    pub fn from_wire(name: &str) -> Result<Self> {
        match name {
            "128" => Ok(KeyLength::Bits128),
            "192" => Ok(KeyLength::Bits192),
            "256" => Ok(KeyLength::Bits256),
            other => Err(Error::UnsupportedCipherSuite(format!(
                "key length '{other}'"
            ))),
        }
    }

    /// The wire name as carried in room tokens
    pub fn wire_name(&self) -> &'static str {
        match self {
            KeyLength::Bits128 => "128",
            KeyLength::Bits192 => "192",
            KeyLength::Bits256 => "256",
        }
    }

    /// Classify a raw key's byte length
    pub fn from_byte_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(KeyLength::Bits128),
            24 => Ok(KeyLength::Bits192),
            32 => Ok(KeyLength::Bits256),
            other => Err(Error::InvalidKeyLength(other)),
        }
    }
}

/// Mode of operation driving a block cipher across a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeOfOperation {
    /// Electronic codebook — no feedback
    Ecb,
    /// Cipher block chaining
    Cbc,
    /// Propagating cipher block chaining
    Pcbc,
    /// Cipher feedback (full-block)
    Cfb,
    /// Output feedback
    Ofb,
    /// Counter mode, counter seeded from the IV
    Ctr,
    /// CBC-style chaining with an additive per-block mask
    RandomDelta,
}

impl ModeOfOperation {
    /// Parse a wire name as carried in room tokens
    pub fn from_wire(name: &str) -> Result<Self> {
        match name {
            "ECB" => Ok(ModeOfOperation::Ecb),
            "CBC" => Ok(ModeOfOperation::Cbc),
            "PCBC" => Ok(ModeOfOperation::Pcbc),
            "CFB" => Ok(ModeOfOperation::Cfb),
            "OFB" => Ok(ModeOfOperation::Ofb),
            "CTR" => Ok(ModeOfOperation::Ctr),
            "RANDOM_DELTA" => Ok(ModeOfOperation::RandomDelta),
            other => Err(Error::UnsupportedCipherSuite(format!("mode '{other}'"))),
        }
    }

    /// The wire name as carried in room tokens
    pub fn wire_name(&self) -> &'static str {
        match self {
            ModeOfOperation::Ecb => "ECB",
            ModeOfOperation::Cbc => "CBC",
            ModeOfOperation::Pcbc => "PCBC",
            ModeOfOperation::Cfb => "CFB",
            ModeOfOperation::Ofb => "OFB",
            ModeOfOperation::Ctr => "CTR",
            ModeOfOperation::RandomDelta => "RANDOM_DELTA",
        }
    }
}

/// Reversible padding of the final plaintext fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddingKind {
    /// Zero bytes; unpad strips trailing zeros (documented lossy)
    Zeros,
    /// Every pad byte equals the pad length
    Pkcs7,
    /// Zero bytes, final byte equals the pad length
    AnsiX923,
    /// Random bytes, final byte equals the pad length
    Iso10126,
}

impl PaddingKind {
    /// Parse a wire name as carried in room tokens
    pub fn from_wire(name: &str) -> Result<Self> {
        match name {
            "ZEROS" => Ok(PaddingKind::Zeros),
            "PKCS7" => Ok(PaddingKind::Pkcs7),
            "ANSI_X923" => Ok(PaddingKind::AnsiX923),
            "ISO_10126" => Ok(PaddingKind::Iso10126),
            other => Err(Error::UnsupportedCipherSuite(format!(
                "padding '{other}'"
            ))),
        }
    }

    /// The wire name as carried in room tokens
    pub fn wire_name(&self) -> &'static str {
        match self {
            PaddingKind::Zeros => "ZEROS",
            PaddingKind::Pkcs7 => "PKCS7",
            PaddingKind::AnsiX923 => "ANSI_X923",
            PaddingKind::Iso10126 => "ISO_10126",
        }
    }
}

// ============================================================================
// CIPHER SUITE
// ============================================================================

/// The full per-room cipher configuration
///
/// Stored per room by the (external) persistence layer and treated here as
/// authoritative configuration when building a `SecureContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSuite {
    /// Block cipher algorithm
    pub algorithm: Algorithm,
    /// Key length
    pub key_length: KeyLength,
    /// Mode of operation
    pub mode: ModeOfOperation,
    /// Padding scheme
    pub padding: PaddingKind,
    /// Initialization vector, exactly one cipher block
    pub iv: Vec<u8>,
}

impl CipherSuite {
    /// Build a suite, validating the IV length
    pub fn new(
        algorithm: Algorithm,
        key_length: KeyLength,
        mode: ModeOfOperation,
        padding: PaddingKind,
        iv: Vec<u8>,
    ) -> Result<Self> {
        if iv.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvLength(iv.len(), BLOCK_SIZE));
        }
        Ok(Self {
            algorithm,
            key_length,
            mode,
            padding,
            iv,
        })
    }

    /// Build a suite from the string fields carried in a room token
    pub fn from_wire_fields(
        algorithm: &str,
        mode: &str,
        padding: &str,
        iv: Vec<u8>,
        key_bits: &str,
    ) -> Result<Self> {
        Self::new(
            Algorithm::from_wire(algorithm)?,
            KeyLength::from_wire(key_bits)?,
            ModeOfOperation::from_wire(mode)?,
            PaddingKind::from_wire(padding)?,
            iv,
        )
    }
}

// ============================================================================
// KEY ALIGNMENT
// ============================================================================

/// A symmetric key derived from a DH shared secret
///
/// Zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey(Vec<u8>);

impl SessionKey {
    /// The raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty (never true for a derived key)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key bytes
        write!(f, "SessionKey({} bytes)", self.0.len())
    }
}

/// Align a DH shared secret to a fixed-size symmetric key
///
/// The secret's big-endian byte representation is aligned to
/// `key_length.byte_len()` bytes:
///
/// - longer secrets keep their **low-order (rightmost)** bytes;
/// - shorter secrets are **left-padded with zero bytes**.
///
/// Both peers must apply this rule identically — any other truncation
/// strategy silently changes the effective key.
pub fn derive_session_key(shared_secret: &BigUint, key_length: KeyLength) -> SessionKey {
    let full = shared_secret.to_bytes_be();
    let required = key_length.byte_len();

    let mut key = vec![0u8; required];
    let copy_len = full.len().min(required);
    let src_offset = full.len() - copy_len;
    key[required - copy_len..].copy_from_slice(&full[src_offset..]);

    SessionKey(key)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        for name in ["RC6", "MAGENTA"] {
            assert_eq!(Algorithm::from_wire(name).unwrap().wire_name(), name);
        }
        for name in ["ECB", "CBC", "PCBC", "CFB", "OFB", "CTR", "RANDOM_DELTA"] {
            assert_eq!(ModeOfOperation::from_wire(name).unwrap().wire_name(), name);
        }
        for name in ["ZEROS", "PKCS7", "ANSI_X923", "ISO_10126"] {
            assert_eq!(PaddingKind::from_wire(name).unwrap().wire_name(), name);
        }
        for name in ["128", "192", "256"] {
            assert_eq!(KeyLength::from_wire(name).unwrap().wire_name(), name);
        }
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!(Algorithm::from_wire("AES").is_err());
        assert!(ModeOfOperation::from_wire("GCM").is_err());
        assert!(PaddingKind::from_wire("NONE").is_err());
        assert!(KeyLength::from_wire("512").is_err());
    }

    #[test]
    fn test_bad_iv_length_rejected() {
        let err = CipherSuite::new(
            Algorithm::Rc6,
            KeyLength::Bits128,
            ModeOfOperation::Cbc,
            PaddingKind::Pkcs7,
            vec![0u8; 8],
        )
        .unwrap_err();
        assert_eq!(err, Error::InvalidIvLength(8, BLOCK_SIZE));
    }

    #[test]
    fn test_key_alignment_truncates_low_order_bytes() {
        // 130-byte secret: the derived 16-byte key must be the rightmost
        // 16 bytes, not the leftmost.
        let mut secret_bytes = vec![0x11u8; 130];
        let tail: Vec<u8> = (0..16).map(|i| 0xA0 + i as u8).collect();
        secret_bytes[114..].copy_from_slice(&tail);

        let secret = BigUint::from_bytes_be(&secret_bytes);
        let key = derive_session_key(&secret, KeyLength::Bits128);

        assert_eq!(key.as_bytes(), &tail[..]);
    }

    #[test]
    fn test_key_alignment_left_pads_short_secrets() {
        let secret = BigUint::from(0xDEADBEEFu32);
        let key = derive_session_key(&secret, KeyLength::Bits192);

        assert_eq!(key.len(), 24);
        assert_eq!(&key.as_bytes()[..20], &[0u8; 20]);
        assert_eq!(&key.as_bytes()[20..], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_key_alignment_exact_size() {
        let secret_bytes: Vec<u8> = (0..32).collect();
        let secret = BigUint::from_bytes_be(&secret_bytes);
        let key = derive_session_key(&secret, KeyLength::Bits256);

        // Leading zero byte of the representation is preserved by padding
        assert_eq!(key.as_bytes(), &secret_bytes[..]);
    }

    #[test]
    fn test_suite_serde_round_trip() {
        let suite = CipherSuite::new(
            Algorithm::Magenta,
            KeyLength::Bits256,
            ModeOfOperation::Ctr,
            PaddingKind::AnsiX923,
            vec![7u8; BLOCK_SIZE],
        )
        .unwrap();

        let json = serde_json::to_string(&suite).unwrap();
        let back: CipherSuite = serde_json::from_str(&json).unwrap();
        assert_eq!(back, suite);
    }
}
