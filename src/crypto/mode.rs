//! # Modes of Operation
//!
//! Drives a [`BlockCipher`] across an arbitrary-length, block-aligned buffer
//! using one of seven chaining disciplines, carrying cross-call feedback
//! state so a logical message can be processed in independent chunks.
//!
//! ## Chaining Rules
//!
//! ```text
//! ┌──────────────┬──────────────────────────┬─────────────────────────────┐
//! │ Mode         │ Feedback carried forward │ Encrypt step                │
//! ├──────────────┼──────────────────────────┼─────────────────────────────┤
//! │ ECB          │ none                     │ E(p)                        │
//! │ CBC          │ prev ciphertext          │ E(p ⊕ prev)                 │
//! │ PCBC         │ prev p ⊕ prev c          │ E(p ⊕ fb)                   │
//! │ CFB          │ prev ciphertext          │ p ⊕ E(prev)                 │
//! │ OFB          │ prev keystream           │ p ⊕ E(prev_ks)              │
//! │ CTR          │ counter (from IV)        │ p ⊕ E(ctr), ctr += 1        │
//! │ RANDOM_DELTA │ prev ciphertext + mask   │ E(p ⊕ prev) ⊕ mask          │
//! └──────────────┴──────────────────────────┴─────────────────────────────┘
//! ```
//!
//! RANDOM_DELTA is a non-standard construction carried over for wire
//! compatibility: the per-session delta constant is the IV read as a
//! big-endian 128-bit integer, the first block's mask equals the delta, and
//! the mask grows by the delta (wrapping) for every subsequent block. This
//! module is the authoritative contract for it; external literature does not
//! describe it.
//!
//! ## Ordering Requirement
//!
//! Processing chunk N+1 requires chunk N's output chain state. Concurrent or
//! reordered chunk processing on one stream is a correctness violation, not
//! a performance concern — callers must serialize per stream. A chain state
//! must never be reused across two different streams or after a key/IV
//! change; doing so breaks confidentiality for every chaining mode.

use crate::crypto::block::{Block, BlockCipher, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::suite::ModeOfOperation;

// ============================================================================
// CHAIN STATE
// ============================================================================

/// Opaque carry value threaded between successive chunk calls on one stream
///
/// Produced by [`ModeEngine::process_chunk`]; the caller only stores and
/// threads it. Contents depend on the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState(StateInner);

#[derive(Debug, Clone, PartialEq, Eq)]
enum StateInner {
    /// ECB carries nothing
    None,
    /// CBC / PCBC / CFB / OFB: one feedback block
    Feedback(Block),
    /// CTR: the next counter value
    Counter(u128),
    /// RANDOM_DELTA: previous ciphertext block and the current mask
    Delta { prev: Block, mask: u128 },
}

// ============================================================================
// MODE ENGINE
// ============================================================================

/// Applies one mode of operation over a borrowed block cipher
#[derive(Debug)]
pub struct ModeEngine<'a> {
    cipher: &'a BlockCipher,
    mode: ModeOfOperation,
    iv: Block,
}

impl<'a> ModeEngine<'a> {
    /// Create an engine for `mode`, seeded by `iv` on the first chunk
    pub fn new(cipher: &'a BlockCipher, mode: ModeOfOperation, iv: Block) -> Self {
        Self { cipher, mode, iv }
    }

    /// The chain state a fresh stream starts from (derived from the IV)
    fn initial_state(&self) -> StateInner {
        match self.mode {
            ModeOfOperation::Ecb => StateInner::None,
            ModeOfOperation::Cbc
            | ModeOfOperation::Pcbc
            | ModeOfOperation::Cfb
            | ModeOfOperation::Ofb => StateInner::Feedback(self.iv),
            ModeOfOperation::Ctr => StateInner::Counter(u128::from_be_bytes(self.iv)),
            ModeOfOperation::RandomDelta => StateInner::Delta {
                prev: self.iv,
                mask: u128::from_be_bytes(self.iv),
            },
        }
    }

    /// Process one block-aligned chunk, producing the output bytes and the
    /// chain state the next chunk must start from
    ///
    /// `chain_in = None` means "first chunk of the stream": feedback is
    /// seeded from the IV. Passing a chain state produced under a different
    /// mode is rejected.
    pub fn process_chunk(
        &self,
        input: &[u8],
        chain_in: Option<&ChainState>,
        encrypting: bool,
    ) -> Result<(Vec<u8>, ChainState)> {
        if input.len() % BLOCK_SIZE != 0 {
            return Err(Error::MisalignedChunk(input.len(), BLOCK_SIZE));
        }

        let mut state = match chain_in {
            Some(ChainState(inner)) => {
                self.check_state(inner)?;
                inner.clone()
            }
            None => self.initial_state(),
        };

        let mut output = Vec::with_capacity(input.len());
        for chunk in input.chunks_exact(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            let out = self.process_block(&block, &mut state, encrypting);
            output.extend_from_slice(&out);
        }

        Ok((output, ChainState(state)))
    }

    /// Reject chain states that belong to a different mode
    fn check_state(&self, state: &StateInner) -> Result<()> {
        let ok = matches!(
            (self.mode, state),
            (ModeOfOperation::Ecb, StateInner::None)
                | (ModeOfOperation::Cbc, StateInner::Feedback(_))
                | (ModeOfOperation::Pcbc, StateInner::Feedback(_))
                | (ModeOfOperation::Cfb, StateInner::Feedback(_))
                | (ModeOfOperation::Ofb, StateInner::Feedback(_))
                | (ModeOfOperation::Ctr, StateInner::Counter(_))
                | (ModeOfOperation::RandomDelta, StateInner::Delta { .. })
        );
        if ok {
            Ok(())
        } else {
            Err(Error::ChainStateMismatch)
        }
    }

    fn process_block(&self, block: &Block, state: &mut StateInner, encrypting: bool) -> Block {
        match (self.mode, &mut *state) {
            (ModeOfOperation::Ecb, StateInner::None) => {
                if encrypting {
                    self.cipher.encrypt_block(block)
                } else {
                    self.cipher.decrypt_block(block)
                }
            }

            (ModeOfOperation::Cbc, StateInner::Feedback(prev)) => {
                if encrypting {
                    let c = self.cipher.encrypt_block(&xor(block, prev));
                    *prev = c;
                    c
                } else {
                    let p = xor(&self.cipher.decrypt_block(block), prev);
                    *prev = *block;
                    p
                }
            }

            (ModeOfOperation::Pcbc, StateInner::Feedback(fb)) => {
                if encrypting {
                    let c = self.cipher.encrypt_block(&xor(block, fb));
                    *fb = xor(block, &c);
                    c
                } else {
                    let p = xor(&self.cipher.decrypt_block(block), fb);
                    *fb = xor(block, &p);
                    p
                }
            }

            (ModeOfOperation::Cfb, StateInner::Feedback(prev)) => {
                let keystream = self.cipher.encrypt_block(prev);
                let out = xor(block, &keystream);
                // Feedback is always the ciphertext block
                *prev = if encrypting { out } else { *block };
                out
            }

            (ModeOfOperation::Ofb, StateInner::Feedback(prev_ks)) => {
                let keystream = self.cipher.encrypt_block(prev_ks);
                *prev_ks = keystream;
                xor(block, &keystream)
            }

            (ModeOfOperation::Ctr, StateInner::Counter(counter)) => {
                let keystream = self.cipher.encrypt_block(&counter.to_be_bytes());
                *counter = counter.wrapping_add(1);
                xor(block, &keystream)
            }

            (ModeOfOperation::RandomDelta, StateInner::Delta { prev, mask }) => {
                let delta = u128::from_be_bytes(self.iv);
                let mask_block = mask.to_be_bytes();
                let out = if encrypting {
                    let c = xor(&self.cipher.encrypt_block(&xor(block, prev)), &mask_block);
                    *prev = c;
                    c
                } else {
                    let p = xor(&self.cipher.decrypt_block(&xor(block, &mask_block)), prev);
                    *prev = *block;
                    p
                };
                *mask = mask.wrapping_add(delta);
                out
            }

            // check_state and initial_state keep mode and state in lockstep
            _ => unreachable!("chain state does not match mode"),
        }
    }
}

#[inline]
fn xor(a: &Block, b: &Block) -> Block {
    let mut out = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        out[i] = a[i] ^ b[i];
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::Algorithm;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const ALL_MODES: [ModeOfOperation; 7] = [
        ModeOfOperation::Ecb,
        ModeOfOperation::Cbc,
        ModeOfOperation::Pcbc,
        ModeOfOperation::Cfb,
        ModeOfOperation::Ofb,
        ModeOfOperation::Ctr,
        ModeOfOperation::RandomDelta,
    ];

    fn test_cipher() -> BlockCipher {
        BlockCipher::new(Algorithm::Rc6, &[0x42u8; 16]).unwrap()
    }

    #[test]
    fn test_single_chunk_round_trip_every_mode() {
        let cipher = test_cipher();
        let iv = [9u8; BLOCK_SIZE];
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        for mode in ALL_MODES {
            let engine = ModeEngine::new(&cipher, mode, iv);
            for blocks in 1..=8 {
                let mut plaintext = vec![0u8; blocks * BLOCK_SIZE];
                rng.fill(&mut plaintext[..]);

                let (ciphertext, _) = engine.process_chunk(&plaintext, None, true).unwrap();
                let (decrypted, _) = engine.process_chunk(&ciphertext, None, false).unwrap();

                assert_eq!(decrypted, plaintext, "mode {mode:?}, {blocks} blocks");
            }
        }
    }

    #[test]
    fn test_split_chunks_match_single_call() {
        let cipher = test_cipher();
        let iv = [3u8; BLOCK_SIZE];
        let mut rng = ChaCha8Rng::seed_from_u64(22);

        let mut plaintext = vec![0u8; 6 * BLOCK_SIZE];
        rng.fill(&mut plaintext[..]);

        for mode in ALL_MODES {
            let engine = ModeEngine::new(&cipher, mode, iv);

            let (whole, _) = engine.process_chunk(&plaintext, None, true).unwrap();

            let (first, mid_state) = engine
                .process_chunk(&plaintext[..2 * BLOCK_SIZE], None, true)
                .unwrap();
            let (second, _) = engine
                .process_chunk(&plaintext[2 * BLOCK_SIZE..], Some(&mid_state), true)
                .unwrap();

            let mut split = first;
            split.extend_from_slice(&second);
            assert_eq!(split, whole, "mode {mode:?} split/whole mismatch");
        }
    }

    #[test]
    fn test_split_decryption_threads_state() {
        let cipher = test_cipher();
        let iv = [7u8; BLOCK_SIZE];
        let mut rng = ChaCha8Rng::seed_from_u64(23);

        let mut plaintext = vec![0u8; 5 * BLOCK_SIZE];
        rng.fill(&mut plaintext[..]);

        for mode in ALL_MODES {
            let engine = ModeEngine::new(&cipher, mode, iv);
            let (ciphertext, _) = engine.process_chunk(&plaintext, None, true).unwrap();

            let (head, state) = engine
                .process_chunk(&ciphertext[..3 * BLOCK_SIZE], None, false)
                .unwrap();
            let (tail, _) = engine
                .process_chunk(&ciphertext[3 * BLOCK_SIZE..], Some(&state), false)
                .unwrap();

            let mut joined = head;
            joined.extend_from_slice(&tail);
            assert_eq!(joined, plaintext, "mode {mode:?}");
        }
    }

    #[test]
    fn test_misaligned_input_rejected() {
        let cipher = test_cipher();
        let engine = ModeEngine::new(&cipher, ModeOfOperation::Cbc, [0u8; BLOCK_SIZE]);
        let err = engine.process_chunk(&[0u8; 17], None, true).unwrap_err();
        assert_eq!(err, Error::MisalignedChunk(17, BLOCK_SIZE));
    }

    #[test]
    fn test_foreign_chain_state_rejected() {
        let cipher = test_cipher();
        let iv = [0u8; BLOCK_SIZE];
        let cbc = ModeEngine::new(&cipher, ModeOfOperation::Cbc, iv);
        let ctr = ModeEngine::new(&cipher, ModeOfOperation::Ctr, iv);

        let (_, cbc_state) = cbc.process_chunk(&[0u8; BLOCK_SIZE], None, true).unwrap();
        let err = ctr
            .process_chunk(&[0u8; BLOCK_SIZE], Some(&cbc_state), true)
            .unwrap_err();
        assert_eq!(err, Error::ChainStateMismatch);
    }

    #[test]
    fn test_ctr_counter_advances_per_block() {
        let cipher = test_cipher();
        let engine = ModeEngine::new(&cipher, ModeOfOperation::Ctr, [0u8; BLOCK_SIZE]);

        // Two identical plaintext blocks must encrypt differently
        let plaintext = vec![0xAAu8; 2 * BLOCK_SIZE];
        let (ciphertext, _) = engine.process_chunk(&plaintext, None, true).unwrap();
        assert_ne!(ciphertext[..BLOCK_SIZE], ciphertext[BLOCK_SIZE..]);
    }

    #[test]
    fn test_cbc_identical_blocks_chain() {
        let cipher = test_cipher();
        let engine = ModeEngine::new(&cipher, ModeOfOperation::Cbc, [1u8; BLOCK_SIZE]);

        let plaintext = vec![0x55u8; 2 * BLOCK_SIZE];
        let (ciphertext, _) = engine.process_chunk(&plaintext, None, true).unwrap();
        assert_ne!(ciphertext[..BLOCK_SIZE], ciphertext[BLOCK_SIZE..]);
    }

    #[test]
    fn test_ecb_identical_blocks_repeat() {
        let cipher = test_cipher();
        let engine = ModeEngine::new(&cipher, ModeOfOperation::Ecb, [0u8; BLOCK_SIZE]);

        let plaintext = vec![0x55u8; 2 * BLOCK_SIZE];
        let (ciphertext, _) = engine.process_chunk(&plaintext, None, true).unwrap();
        assert_eq!(ciphertext[..BLOCK_SIZE], ciphertext[BLOCK_SIZE..]);
    }

    #[test]
    fn test_random_delta_differs_from_cbc() {
        let cipher = test_cipher();
        let iv = [5u8; BLOCK_SIZE];
        let cbc = ModeEngine::new(&cipher, ModeOfOperation::Cbc, iv);
        let rd = ModeEngine::new(&cipher, ModeOfOperation::RandomDelta, iv);

        let plaintext = vec![0x33u8; 2 * BLOCK_SIZE];
        let (cbc_ct, _) = cbc.process_chunk(&plaintext, None, true).unwrap();
        let (rd_ct, _) = rd.process_chunk(&plaintext, None, true).unwrap();
        assert_ne!(cbc_ct, rd_ct);
    }

    #[test]
    fn test_empty_chunk_is_identity() {
        let cipher = test_cipher();
        for mode in ALL_MODES {
            let engine = ModeEngine::new(&cipher, mode, [0u8; BLOCK_SIZE]);
            let (out, state) = engine.process_chunk(&[], None, true).unwrap();
            assert!(out.is_empty());
            // The state is still usable for the actual first block
            let (_, _) = engine
                .process_chunk(&[0u8; BLOCK_SIZE], Some(&state), true)
                .unwrap();
        }
    }
}
