//! # Room Token Codec
//!
//! The room token carries a room's identity and full cipher suite as one
//! opaque string, attached to every handshake and message.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       TOKEN WIRE FORMAT                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  base64( room_id | algorithm | mode | padding | iv_b64 | key_bits )     │
//! │                                                                         │
//! │  e.g. room_id   "3f2a…"        (UUID string)                            │
//! │       algorithm "RC6"          mode     "CBC"                           │
//! │       padding   "PKCS7"        key_bits "128"                           │
//! │       iv_b64    base64 of the 16-byte IV (inner encoding, so the        │
//! │                 raw IV can never collide with the '|' separator)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding rejects, as [`Error::MalformedToken`]: bad outer base64, a
//! payload that is not UTF-8, and any field count other than exactly six.
//! Unknown component names and a wrong-length IV surface as the suite's own
//! construction errors.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Error, Result};
use crate::suite::CipherSuite;

/// Number of `|`-separated fields in the token payload
const FIELD_COUNT: usize = 6;

/// A decoded room token: room identity plus cipher suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomToken {
    /// Room identifier (a UUID string on the creating side)
    pub room_id: String,
    /// The room's full cipher configuration
    pub suite: CipherSuite,
}

impl RoomToken {
    /// Assemble a token for a room
    pub fn new(room_id: impl Into<String>, suite: CipherSuite) -> Self {
        Self {
            room_id: room_id.into(),
            suite,
        }
    }

    /// Encode to the opaque wire string
    pub fn encode(&self) -> String {
        let payload = format!(
            "{}|{}|{}|{}|{}|{}",
            self.room_id,
            self.suite.algorithm.wire_name(),
            self.suite.mode.wire_name(),
            self.suite.padding.wire_name(),
            BASE64.encode(&self.suite.iv),
            self.suite.key_length.wire_name(),
        );
        BASE64.encode(payload.as_bytes())
    }

    /// Decode a wire string back into a token
    pub fn decode(token: &str) -> Result<Self> {
        let raw = BASE64
            .decode(token.as_bytes())
            .map_err(|e| Error::MalformedToken(format!("outer base64: {e}")))?;
        let payload = String::from_utf8(raw)
            .map_err(|_| Error::MalformedToken("payload is not UTF-8".into()))?;

        let fields: Vec<&str> = payload.split('|').collect();
        if fields.len() != FIELD_COUNT {
            return Err(Error::MalformedToken(format!(
                "expected {FIELD_COUNT} fields, got {}",
                fields.len()
            )));
        }

        let iv = BASE64
            .decode(fields[4].as_bytes())
            .map_err(|e| Error::MalformedToken(format!("iv base64: {e}")))?;
        let suite = CipherSuite::from_wire_fields(fields[1], fields[2], fields[3], iv, fields[5])?;

        Ok(Self {
            room_id: fields[0].to_string(),
            suite,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
