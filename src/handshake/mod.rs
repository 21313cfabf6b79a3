//! # Handshake Coordination
//!
//! Drives the per-room key agreement: who replies to whom, when a reply is
//! resent, and when a room's suite is adopted or updated.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       HANDSHAKE FLOW                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  creator                                peer                            │
//! │  ───────                                ────                            │
//! │  create_room ─── token + g^a ─────────► on_handshake (room unknown)     │
//! │                                           adopt suite, derive secret    │
//! │  on_handshake ◄───── token + g^b ─────── reply with g^b                 │
//! │    no secret yet → resend g^a,                                          │
//! │    then derive secret                                                   │
//! │  (peer sees same g^a again:                                             │
//! │   secret present, value unchanged → no further reply; flow settles)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The coordinator computes; the embedding transport delivers. Every reply
//! is handed back as an [`OutboundHandshake`] for the caller to send, and a
//! delivery failure is the caller's to report (as
//! [`Error::PeerUnreachable`](crate::error::Error)) and to retry on the next
//! inbound message, which this flow tolerates by construction.

pub mod session;
pub mod store;
pub mod token;

use uuid::Uuid;

use crate::crypto::SecureContext;
use crate::error::{Error, Result};
use crate::suite::{derive_session_key, CipherSuite, SessionKey};

pub use session::{DhSession, FIXED_GROUP, PRIVATE_EXPONENT_BITS};
pub use store::SessionStore;
pub use token::RoomToken;

/// A handshake message for the caller's transport to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundHandshake {
    /// Target room
    pub room_id: String,
    /// Encoded room token carrying the suite
    pub token: String,
    /// Own public value, decimal
    pub public_value: String,
}

/// What an inbound handshake changed, and what to send back
#[derive(Debug)]
pub struct HandshakeOutcome {
    /// Room the handshake addressed
    pub room_id: String,
    /// Suite carried by the inbound token; persist it when `suite_changed`
    pub suite: CipherSuite,
    /// The room was unknown to this side before the handshake
    pub room_is_new: bool,
    /// Inbound suite differs from the one the caller knew
    pub suite_changed: bool,
    /// Reply to deliver to the peer, if one is due
    pub reply: Option<OutboundHandshake>,
}

/// Per-room handshake state machine over a [`SessionStore`]
#[derive(Debug, Default)]
pub struct HandshakeCoordinator {
    sessions: SessionStore,
}

impl HandshakeCoordinator {
    /// Create a coordinator with an empty session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new room: fresh id, fresh keypair, opening handshake
    pub fn create_room(&self, suite: CipherSuite) -> OutboundHandshake {
        let room_id = Uuid::new_v4().to_string();
        self.initiate(&room_id, suite)
    }

    /// Start (or restart) the handshake for a known room id
    ///
    /// Replaces any existing session with a fresh keypair; also the path for
    /// announcing a suite change, which re-keys the room.
    pub fn initiate(&self, room_id: &str, suite: CipherSuite) -> OutboundHandshake {
        let session = self.sessions.replace(room_id);
        let public_value = session.lock().public_value_decimal();
        tracing::info!(room_id, "handshake initiated");
        OutboundHandshake {
            room_id: room_id.to_string(),
            token: RoomToken::new(room_id, suite).encode(),
            public_value,
        }
    }

    /// Handle an inbound handshake message
    ///
    /// `known_suite` is the suite the caller has persisted for this room, or
    /// `None` when the room is unknown. Reply rules:
    ///
    /// - no session for the room yet: derive the secret and reply with our
    ///   public value (the peer cannot have it)
    /// - session present but no secret, or the peer's value changed: resend
    ///   our public value, then (re)derive
    /// - secret present and value unchanged: absorb silently, no reply
    pub fn on_handshake(
        &self,
        raw_token: &str,
        peer_public: &str,
        known_suite: Option<&CipherSuite>,
    ) -> Result<HandshakeOutcome> {
        let token = RoomToken::decode(raw_token)?;
        let peer_value = DhSession::parse_peer_value(peer_public)?;

        let room_is_new = known_suite.is_none();
        let suite_changed = known_suite.is_some_and(|suite| *suite != token.suite);

        let (reply_due, public_value) = match self.sessions.get(&token.room_id) {
            None => {
                let session = self.sessions.get_or_create(&token.room_id);
                let mut session = session.lock();
                session.receive_peer_value(&peer_value);
                (true, session.public_value_decimal())
            }
            Some(session) => {
                let mut session = session.lock();
                let reply_due = !session.is_established()
                    || session.peer_value() != Some(&peer_value);
                session.receive_peer_value(&peer_value);
                (reply_due, session.public_value_decimal())
            }
        };

        tracing::debug!(
            room_id = %token.room_id,
            room_is_new,
            suite_changed,
            reply_due,
            "handshake absorbed"
        );

        let reply = reply_due.then(|| OutboundHandshake {
            room_id: token.room_id.clone(),
            token: raw_token.to_string(),
            public_value,
        });

        Ok(HandshakeOutcome {
            room_id: token.room_id,
            suite: token.suite,
            room_is_new,
            suite_changed,
            reply,
        })
    }

    /// Handle the handshake piggybacked on a regular message envelope
    ///
    /// Unlike [`Self::on_handshake`], an already-established session is left
    /// untouched even if the attached value differs, and no reply is ever
    /// due; the sender is not waiting for one.
    pub fn on_message_envelope(
        &self,
        raw_token: &str,
        peer_public: &str,
        known_suite: Option<&CipherSuite>,
    ) -> Result<HandshakeOutcome> {
        let token = RoomToken::decode(raw_token)?;
        let peer_value = DhSession::parse_peer_value(peer_public)?;

        let session = self.sessions.get_or_create(&token.room_id);
        {
            let mut session = session.lock();
            if !session.is_established() {
                session.receive_peer_value(&peer_value);
            }
        }

        Ok(HandshakeOutcome {
            room_is_new: known_suite.is_none(),
            suite_changed: known_suite.is_some_and(|suite| *suite != token.suite),
            room_id: token.room_id,
            suite: token.suite,
            reply: None,
        })
    }

    /// Own public value for a room, creating a session if needed
    ///
    /// Attached to every outgoing message so a peer that lost its session
    /// can rebuild the secret from regular traffic.
    pub fn public_value_for(&self, room_id: &str) -> String {
        self.sessions.get_or_create(room_id).lock().public_value_decimal()
    }

    /// Whether the room's exchange has produced a shared secret
    pub fn is_established(&self, room_id: &str) -> bool {
        self.sessions.is_established(room_id)
    }

    /// Drop a room's session
    pub fn evict(&self, room_id: &str) -> bool {
        self.sessions.evict(room_id)
    }

    /// Derive the room's symmetric key at the suite's length
    pub fn session_key(&self, room_id: &str, suite: &CipherSuite) -> Result<SessionKey> {
        let session = self
            .sessions
            .get(room_id)
            .ok_or_else(|| Error::NoSharedSecret(room_id.to_string()))?;
        let session = session.lock();
        let secret = session
            .shared_secret()
            .ok_or_else(|| Error::NoSharedSecret(room_id.to_string()))?;
        Ok(derive_session_key(secret, suite.key_length))
    }

    /// Build the room's ready-to-use cipher pipeline
    pub fn secure_context(&self, room_id: &str, suite: &CipherSuite) -> Result<SecureContext> {
        let key = self.session_key(room_id, suite)?;
        SecureContext::new(suite, &key)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::BLOCK_SIZE;
    use crate::suite::{Algorithm, KeyLength, ModeOfOperation, PaddingKind};

    fn suite() -> CipherSuite {
        CipherSuite::new(
            Algorithm::Rc6,
            KeyLength::Bits128,
            ModeOfOperation::Cbc,
            PaddingKind::Pkcs7,
            vec![7u8; BLOCK_SIZE],
        )
        .unwrap()
    }

    fn other_suite() -> CipherSuite {
        CipherSuite::new(
            Algorithm::Magenta,
            KeyLength::Bits256,
            ModeOfOperation::Ofb,
            PaddingKind::Iso10126,
            vec![9u8; BLOCK_SIZE],
        )
        .unwrap()
    }

    /// Run the full opening exchange and return both coordinators plus the
    /// room id.
    fn establish() -> (HandshakeCoordinator, HandshakeCoordinator, String) {
        let alice = HandshakeCoordinator::new();
        let bob = HandshakeCoordinator::new();

        let opening = alice.create_room(suite());
        let room_id = opening.room_id.clone();

        // Bob: unknown room, must reply
        let at_bob = bob
            .on_handshake(&opening.token, &opening.public_value, None)
            .unwrap();
        assert!(at_bob.room_is_new);
        let reply = at_bob.reply.expect("new room must produce a reply");

        // Alice: session without a secret yet, resends then derives
        let at_alice = alice
            .on_handshake(&reply.token, &reply.public_value, Some(&suite()))
            .unwrap();
        let resend = at_alice.reply.expect("secret was missing, resend is due");

        // Bob sees the same value again: settled, no further reply
        let settled = bob
            .on_handshake(&resend.token, &resend.public_value, Some(&suite()))
            .unwrap();
        assert!(settled.reply.is_none());

        (alice, bob, room_id)
    }

    #[test]
    fn test_opening_exchange_settles_with_equal_keys() {
        let (alice, bob, room_id) = establish();
        assert!(alice.is_established(&room_id));
        assert!(bob.is_established(&room_id));

        let s = suite();
        let ka = alice.session_key(&room_id, &s).unwrap();
        let kb = bob.session_key(&room_id, &s).unwrap();
        assert_eq!(ka.as_bytes(), kb.as_bytes());
        assert_eq!(ka.len(), 16);
    }

    #[test]
    fn test_contexts_from_both_sides_interoperate() {
        let (alice, bob, room_id) = establish();
        let s = suite();
        let ctx_a = alice.secure_context(&room_id, &s).unwrap();
        let ctx_b = bob.secure_context(&room_id, &s).unwrap();

        let wire = ctx_a.encrypt_message_b64(b"hello world").unwrap();
        assert_eq!(ctx_b.decrypt_message_b64(&wire).unwrap(), b"hello world");
    }

    #[test]
    fn test_file_transfer_over_established_room() {
        let (alice, bob, room_id) = establish();
        let s = suite();
        let ctx_a = alice.secure_context(&room_id, &s).unwrap();
        let ctx_b = bob.secure_context(&room_id, &s).unwrap();

        let data: Vec<u8> = (0..10_000).map(|i| (i % 256) as u8).collect();
        let chunk_size = 64 * BLOCK_SIZE;
        let chunks = crate::transfer::encrypt_file(&ctx_a, &data, chunk_size).unwrap();

        let store = crate::transfer::TransferStore::new();
        let mut out = Vec::new();
        for chunk in &chunks {
            out.extend_from_slice(&store.accept("report.pdf", &ctx_b, chunk).unwrap());
        }
        assert_eq!(out, data);
        assert!(store.is_empty());
    }

    #[test]
    fn test_key_before_handshake_is_an_error() {
        let coordinator = HandshakeCoordinator::new();
        assert!(matches!(
            coordinator.session_key("nowhere", &suite()),
            Err(Error::NoSharedSecret(_))
        ));

        // Session exists but no peer value yet
        let opening = coordinator.create_room(suite());
        assert!(matches!(
            coordinator.session_key(&opening.room_id, &suite()),
            Err(Error::NoSharedSecret(_))
        ));
    }

    #[test]
    fn test_suite_change_is_flagged_and_rekeys() {
        let (alice, bob, room_id) = establish();
        let old_key = bob.session_key(&room_id, &suite()).unwrap();

        // Alice announces a new suite for the same room
        let update = alice.initiate(&room_id, other_suite());
        let at_bob = bob
            .on_handshake(&update.token, &update.public_value, Some(&suite()))
            .unwrap();
        assert!(at_bob.suite_changed);
        assert!(!at_bob.room_is_new);
        assert_eq!(at_bob.suite, other_suite());
        // Fresh keypair on Alice's side means a changed value, so Bob replies
        let reply = at_bob.reply.expect("changed peer value must be answered");

        let at_alice = alice
            .on_handshake(&reply.token, &reply.public_value, Some(&other_suite()))
            .unwrap();
        assert!(!at_alice.suite_changed);

        let new_key = bob.session_key(&room_id, &other_suite()).unwrap();
        assert_ne!(old_key.as_bytes(), new_key.as_bytes());
        assert_eq!(new_key.len(), 32);
    }

    #[test]
    fn test_message_envelope_rebuilds_lost_session() {
        let (alice, bob, room_id) = establish();

        // Bob loses its session state
        bob.evict(&room_id);
        assert!(!bob.is_established(&room_id));

        // A regular message from Alice carries token + public value
        let token = RoomToken::new(room_id.clone(), suite()).encode();
        let outcome = bob
            .on_message_envelope(&token, &alice.public_value_for(&room_id), Some(&suite()))
            .unwrap();
        assert!(outcome.reply.is_none());
        assert!(bob.is_established(&room_id));
    }

    #[test]
    fn test_message_envelope_keeps_established_secret() {
        let (_alice, bob, room_id) = establish();
        let before = bob.session_key(&room_id, &suite()).unwrap();

        // A stale value attached to a chat message must not clobber the key
        let stranger = DhSession::generate();
        let token = RoomToken::new(room_id.clone(), suite()).encode();
        bob.on_message_envelope(&token, &stranger.public_value_decimal(), Some(&suite()))
            .unwrap();

        let after = bob.session_key(&room_id, &suite()).unwrap();
        assert_eq!(before.as_bytes(), after.as_bytes());
    }

    #[test]
    fn test_malformed_inputs_rejected() {
        let coordinator = HandshakeCoordinator::new();
        let token = RoomToken::new("room", suite()).encode();

        assert!(matches!(
            coordinator.on_handshake("%%%", "123", None),
            Err(Error::MalformedToken(_))
        ));
        assert!(matches!(
            coordinator.on_handshake(&token, "not-a-number", None),
            Err(Error::MalformedPublicValue(_))
        ));
    }
}
