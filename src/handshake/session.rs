//! # Diffie–Hellman Session
//!
//! One room's half of an unauthenticated finite-field Diffie–Hellman
//! exchange over the fixed RFC 3526 2048-bit MODP group (`g = 2`).
//!
//! Every session uses the same well-known group; only the private exponent
//! is fresh. The private exponent is 1024 bits — half the modulus width,
//! which keeps `g^x mod p` affordable while leaving the discrete log far out
//! of reach.
//!
//! Nothing here authenticates the peer. A man in the middle who can rewrite
//! public values can sit between the two parties undetected; the channel
//! deliberately accepts that trade-off and the surrounding application makes
//! no claim otherwise.

use num_bigint::{BigUint, RandBigInt};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Width of the random private exponent in bits
pub const PRIVATE_EXPONENT_BITS: u64 = 1024;

/// RFC 3526 group 14: the 2048-bit MODP prime
const MODP_2048_HEX: &str = "
    FFFFFFFF FFFFFFFF C90FDAA2 2168C234 C4C6628B 80DC1CD1
    29024E08 8A67CC74 020BBEA6 3B139B22 514A0879 8E3404DD
    EF9519B3 CD3A431B 302B0A6D F25F1437 4FE1356D 6D51C245
    E485B576 625E7EC6 F44C42E9 A637ED6B 0BFF5CB6 F406B7ED
    EE386BFB 5A899FA5 AE9F2411 7C4B1FE6 49286651 ECE45B3D
    C2007CB8 A163BF05 98DA4836 1C55D39A 69163FA8 FD24CF5F
    83655D23 DCA3AD96 1C62F356 208552BB 9ED52907 7096966D
    670C354E 4ABC9804 F1746C08 CA18217C 32905E46 2E36CE3B
    E39E772C 180E8603 9B2783A2 EC07A28F B5C55DF0 6F4C52C9
    DE2BCBF6 95581718 3995497C EA956AE5 15D22618 98FA0510
    15728E5A 8AACAA68 FFFFFFFF FFFFFFFF
";

/// A fixed multiplicative group for the key exchange
#[derive(Debug, Clone)]
pub struct DhGroup {
    /// Prime modulus
    pub p: BigUint,
    /// Generator
    pub g: BigUint,
}

/// The group every session uses
pub static FIXED_GROUP: Lazy<DhGroup> = Lazy::new(|| {
    let hex: String = MODP_2048_HEX.chars().filter(|c| !c.is_whitespace()).collect();
    // Compile-time constant; parse cannot fail
    let p = BigUint::parse_bytes(hex.as_bytes(), 16)
        .unwrap_or_else(|| unreachable!("RFC 3526 prime constant is valid hex"));
    DhGroup {
        p,
        g: BigUint::from(2u8),
    }
});

/// One room's key-exchange state
///
/// Holds the private exponent for the lifetime of the room session so that a
/// re-received (or changed) peer value can recompute the shared secret
/// without regenerating the keypair.
#[derive(Debug)]
pub struct DhSession {
    private_exponent: BigUint,
    public_value: BigUint,
    peer_public: Option<BigUint>,
    shared_secret: Option<BigUint>,
}

impl DhSession {
    /// Generate a fresh keypair in the fixed group
    pub fn generate() -> Self {
        let group = &*FIXED_GROUP;
        let private_exponent = OsRng.gen_biguint(PRIVATE_EXPONENT_BITS);
        let public_value = group.g.modpow(&private_exponent, &group.p);
        Self {
            private_exponent,
            public_value,
            peer_public: None,
            shared_secret: None,
        }
    }

    /// Own public value `g^x mod p`
    pub fn public_value(&self) -> &BigUint {
        &self.public_value
    }

    /// Own public value as the decimal string carried on the wire
    pub fn public_value_decimal(&self) -> String {
        self.public_value.to_str_radix(10)
    }

    /// Absorb the peer's public value and (re)compute the shared secret
    ///
    /// Idempotent for a repeated value; a changed value replaces the secret.
    pub fn receive_peer_value(&mut self, peer: &BigUint) {
        self.shared_secret = Some(peer.modpow(&self.private_exponent, &FIXED_GROUP.p));
        self.peer_public = Some(peer.clone());
    }

    /// Parse a wire-format decimal public value
    pub fn parse_peer_value(raw: &str) -> Result<BigUint> {
        if raw.is_empty() {
            return Err(Error::MalformedPublicValue("empty value".into()));
        }
        BigUint::parse_bytes(raw.as_bytes(), 10)
            .ok_or_else(|| Error::MalformedPublicValue(raw.chars().take(32).collect()))
    }

    /// The last peer public value absorbed, if any
    pub fn peer_value(&self) -> Option<&BigUint> {
        self.peer_public.as_ref()
    }

    /// The computed shared secret, if the exchange has completed
    pub fn shared_secret(&self) -> Option<&BigUint> {
        self.shared_secret.as_ref()
    }

    /// Whether a shared secret exists for this session
    pub fn is_established(&self) -> bool {
        self.shared_secret.is_some()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_constant_shape() {
        let group = &*FIXED_GROUP;
        assert_eq!(group.p.bits(), 2048);
        assert_eq!(group.g, BigUint::from(2u8));
        // A safe prime is ≡ 3 (mod 4)
        assert_eq!(&group.p % 4u8, BigUint::from(3u8));
    }

    #[test]
    fn test_two_sessions_agree() {
        let mut alice = DhSession::generate();
        let mut bob = DhSession::generate();

        alice.receive_peer_value(bob.public_value());
        bob.receive_peer_value(alice.public_value());

        assert!(alice.is_established());
        assert_eq!(alice.shared_secret(), bob.shared_secret());
    }

    #[test]
    fn test_fresh_session_has_no_secret() {
        let session = DhSession::generate();
        assert!(!session.is_established());
        assert!(session.shared_secret().is_none());
        assert!(session.peer_value().is_none());
    }

    #[test]
    fn test_public_value_in_group_range() {
        let session = DhSession::generate();
        assert!(session.public_value() < &FIXED_GROUP.p);
        assert!(session.public_value() > &BigUint::from(1u8));
    }

    #[test]
    fn test_changed_peer_value_recomputes_secret() {
        let mut session = DhSession::generate();
        let peer_a = DhSession::generate();
        let peer_b = DhSession::generate();

        session.receive_peer_value(peer_a.public_value());
        let first = session.shared_secret().cloned();
        session.receive_peer_value(peer_b.public_value());

        assert_ne!(session.shared_secret().cloned(), first);
        assert_eq!(session.peer_value(), Some(peer_b.public_value()));
    }

    #[test]
    fn test_decimal_round_trip() {
        let session = DhSession::generate();
        let parsed = DhSession::parse_peer_value(&session.public_value_decimal()).unwrap();
        assert_eq!(&parsed, session.public_value());
    }

    #[test]
    fn test_malformed_peer_value_rejected() {
        assert!(matches!(
            DhSession::parse_peer_value(""),
            Err(Error::MalformedPublicValue(_))
        ));
        assert!(matches!(
            DhSession::parse_peer_value("12a34"),
            Err(Error::MalformedPublicValue(_))
        ));
        assert!(matches!(
            DhSession::parse_peer_value("-5"),
            Err(Error::MalformedPublicValue(_))
        ));
    }
}
