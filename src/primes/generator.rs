//! # Prime and Group Generation
//!
//! Produces the key-agreement parameters: safe primes `p = 2q + 1` and a
//! generator `g` of the order-`q` subgroup of `(Z/pZ)*`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       GROUP PAIR SEARCH                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  loop:                                                                  │
//! │    q ← random odd candidate, exactly `bits` wide                        │
//! │    q probably prime?  ──no──► retry                                     │
//! │    p ← 2q + 1                                                           │
//! │    p probably prime?  ──no──► retry                                     │
//! │                                                                         │
//! │  g ← 2, 3, 4, ...  until                                                │
//! │    g^((p-1)/q) ≠ 1 (mod p)  and  g^((p-1)/2) ≠ 1 (mod p)                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Safe-prime search is expensive and embarrassingly parallel, so
//! [`generate_group_pair_parallel`] races two workers and takes the first
//! result; the loser is cancelled between attempts via a shared flag.
//!
//! The search loops are unbounded: for any sane bit length a safe prime
//! exists and the expected number of attempts is finite, so there is no
//! retry cap to tune.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::OsRng;

use crate::error::{Error, Result};
use crate::primes::PrimalityStrategy;

/// Smallest candidate width accepted; below this "safe prime" is noise
pub const MIN_BIT_LENGTH: u64 = 16;

/// Number of workers raced by [`generate_group_pair_parallel`]
const PARALLEL_WORKERS: usize = 2;

/// Configured source of probable primes and DH group parameters
#[derive(Debug, Clone, Copy)]
pub struct PrimeGenerator {
    strategy: PrimalityStrategy,
    confidence: f64,
    bit_length: u64,
}

impl PrimeGenerator {
    /// Create a generator, validating confidence and bit length up front
    pub fn new(strategy: PrimalityStrategy, confidence: f64, bit_length: u64) -> Result<Self> {
        if !(0.5..1.0).contains(&confidence) {
            return Err(Error::InvalidConfidence(confidence));
        }
        if bit_length < MIN_BIT_LENGTH {
            return Err(Error::BitLengthTooSmall(bit_length, MIN_BIT_LENGTH));
        }
        Ok(Self {
            strategy,
            confidence,
            bit_length,
        })
    }

    /// Draw a random odd candidate of exactly `bit_length` bits
    ///
    /// The top bit is forced so the width is exact; the bottom bit is forced
    /// because an even candidate can never be prime.
    pub fn generate_candidate(&self) -> BigUint {
        let mut candidate = OsRng.gen_biguint(self.bit_length);
        candidate.set_bit(self.bit_length - 1, true);
        candidate.set_bit(0, true);
        candidate
    }

    /// Generate a probable prime of exactly `bit_length` bits
    pub fn generate_prime(&self) -> BigUint {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let candidate = self.generate_candidate();
            if self.strategy.is_probably_prime(&candidate, self.confidence) {
                tracing::debug!(bits = self.bit_length, attempts, "prime found");
                return candidate;
            }
        }
    }

    /// Generate a safe prime `p = 2q + 1` where `q` is also probably prime
    ///
    /// `bit_length` is the width of `q`; the returned `p` is one bit wider.
    pub fn generate_safe_prime(&self) -> BigUint {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            if let Some(p) = self.try_safe_prime_once() {
                tracing::debug!(bits = self.bit_length, attempts, "safe prime found");
                return p;
            }
        }
    }

    /// One safe-prime attempt: candidate `q`, then retest `p = 2q + 1`
    fn try_safe_prime_once(&self) -> Option<BigUint> {
        let q = self.generate_candidate();
        if !self.strategy.is_probably_prime(&q, self.confidence) {
            return None;
        }
        let p = (&q << 1) + BigUint::one();
        if !self.strategy.is_probably_prime(&p, self.confidence) {
            return None;
        }
        Some(p)
    }

    /// Generate a safe prime and a generator of its order-`q` subgroup
    ///
    /// The generator search walks `g` upward from 2 and keeps the first `g`
    /// with `g^((p-1)/q) ≠ 1` and `g^((p-1)/2) ≠ 1` modulo `p`. For a safe
    /// prime those two conditions rule out the only proper subgroups, so the
    /// search terminates almost immediately.
    pub fn generate_group_pair(&self) -> (BigUint, BigUint) {
        let p = self.generate_safe_prime();
        let g = find_subgroup_generator(&p);
        (p, g)
    }

    /// One full group-pair attempt; used by the parallel race
    fn try_group_pair_once(&self) -> Option<(BigUint, BigUint)> {
        let p = self.try_safe_prime_once()?;
        let g = find_subgroup_generator(&p);
        Some((p, g))
    }
}

/// Find the smallest generator of the order-`q` subgroup of a safe prime `p`
fn find_subgroup_generator(p: &BigUint) -> BigUint {
    let one = BigUint::one();
    let p_minus_one = p - &one;
    let q = &p_minus_one >> 1;
    let cofactor = &p_minus_one / &q;

    let mut g = BigUint::from(2u8);
    loop {
        if g.modpow(&cofactor, p) != one && g.modpow(&q, p) != one {
            return g;
        }
        g += &one;
    }
}

/// Race [`PARALLEL_WORKERS`] independent group-pair searches
///
/// Returns the first pair found; the remaining workers observe the shared
/// cancel flag between attempts and exit without a result.
pub fn generate_group_pair_parallel(
    strategy: PrimalityStrategy,
    confidence: f64,
    bit_length: u64,
) -> Result<(BigUint, BigUint)> {
    let generator = PrimeGenerator::new(strategy, confidence, bit_length)?;

    let found = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();

    let mut workers = Vec::with_capacity(PARALLEL_WORKERS);
    for _ in 0..PARALLEL_WORKERS {
        let found = Arc::clone(&found);
        let tx = tx.clone();
        workers.push(thread::spawn(move || {
            while !found.load(Ordering::Relaxed) {
                if let Some(pair) = generator.try_group_pair_once() {
                    found.store(true, Ordering::Relaxed);
                    let _ = tx.send(pair);
                    return;
                }
            }
        }));
    }
    drop(tx);

    // Workers only exit after sending or after `found` is set by a sender,
    // so the channel always yields exactly one pair.
    let pair = match rx.recv() {
        Ok(pair) => pair,
        Err(_) => unreachable!("all group-pair workers exited without a result"),
    };
    for worker in workers {
        let _ = worker.join();
    }
    Ok(pair)
}

// ============================================================================
// TESTS
// ============================================================================
