//! # Probabilistic Primality Testing
//!
//! Decides, with a caller-specified confidence, whether a large integer is
//! probably prime. Three interchangeable strategies implement the same
//! one-round witness contract:
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────┬──────────────────────┐
//! │ Strategy         │ One witness round            │ Per-round error      │
//! ├──────────────────┼──────────────────────────────┼──────────────────────┤
//! │ Fermat           │ a^(n-1) ≡ 1 (mod n)          │ ≤ 1/2 (weak; fooled  │
//! │                  │                              │   by Carmichael n)   │
//! │ Miller–Rabin     │ strong pseudoprime check on  │ ≤ 1/4                │
//! │                  │ n-1 = d·2^s                  │                      │
//! │ Solovay–Strassen │ a^((n-1)/2) ≡ (a/n) (mod n)  │ ≤ 1/4                │
//! │                  │ via the Jacobi symbol        │                      │
//! └──────────────────┴──────────────────────────────┴──────────────────────┘
//! ```
//!
//! The shared driver draws uniformly random bases in `[2, n-2]` and repeats
//! until the accumulated error bound drops to `1 - confidence`, or a round
//! proves compositeness. A witness round can prove a number composite but
//! never prime.
//!
//! Small-input handling: `n ≤ 1` is never prime, 2 and 3 are prime, and any
//! other even `n` is rejected before a single witness round runs (a fast
//! path; the witness math itself assumes odd `n > 3`).

pub mod generator;

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::OsRng;

pub use generator::PrimeGenerator;

/// The witness strategy used for a primality decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimalityStrategy {
    /// Fermat's little theorem test
    Fermat,
    /// Miller–Rabin strong pseudoprime test
    MillerRabin,
    /// Solovay–Strassen test (Euler criterion against the Jacobi symbol)
    SolovayStrassen,
}

impl PrimalityStrategy {
    /// Theoretical worst-case probability that one round passes a composite
    fn round_error(&self) -> f64 {
        match self {
            PrimalityStrategy::Fermat => 0.5,
            PrimalityStrategy::MillerRabin | PrimalityStrategy::SolovayStrassen => 0.25,
        }
    }

    /// Number of witness rounds needed so the false-positive probability is
    /// at most `1 - confidence` under this strategy's per-round bound
    pub fn rounds_for(&self, confidence: f64) -> usize {
        // Out-of-range confidences are clamped; the generator validates the
        // range up front where a hard error is wanted.
        let confidence = confidence.clamp(0.5, 1.0 - 1e-12);
        let rounds = (1.0 - confidence).ln() / self.round_error().ln();
        (rounds.ceil() as usize).max(1)
    }

    /// Run one witness round with base `a`; `true` means "no evidence of
    /// compositeness", `false` proves `n` composite
    fn witness_round(&self, n: &BigUint, a: &BigUint) -> bool {
        match self {
            PrimalityStrategy::Fermat => fermat_round(n, a),
            PrimalityStrategy::MillerRabin => miller_rabin_round(n, a),
            PrimalityStrategy::SolovayStrassen => solovay_strassen_round(n, a),
        }
    }

    /// Decide whether `n` is probably prime at the given confidence
    pub fn is_probably_prime(&self, n: &BigUint, confidence: f64) -> bool {
        let two = BigUint::from(2u8);
        let three = BigUint::from(3u8);

        if n <= &BigUint::one() {
            return false;
        }
        if n == &two || n == &three {
            return true;
        }
        if n.is_even() {
            return false;
        }

        let mut rng = OsRng;
        let n_minus_one = n - BigUint::one();
        for _ in 0..self.rounds_for(confidence) {
            // Uniform base in [2, n-2]
            let a = rng.gen_biguint_range(&two, &n_minus_one);
            if !self.witness_round(n, &a) {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// WITNESS ROUNDS
// ============================================================================

fn fermat_round(n: &BigUint, a: &BigUint) -> bool {
    a.modpow(&(n - BigUint::one()), n).is_one()
}

fn miller_rabin_round(n: &BigUint, a: &BigUint) -> bool {
    let one = BigUint::one();
    let n_minus_one = n - &one;

    // n - 1 = d * 2^s with d odd
    let mut d = n_minus_one.clone();
    let mut s = 0u64;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let mut x = a.modpow(&d, n);
    if x == one || x == n_minus_one {
        return true;
    }
    for _ in 1..s {
        x = (&x * &x) % n;
        if x == n_minus_one {
            return true;
        }
    }
    false
}

fn solovay_strassen_round(n: &BigUint, a: &BigUint) -> bool {
    let j = jacobi(a, n);
    if j == 0 {
        return false;
    }

    let exponent = (n - BigUint::one()) >> 1;
    let x = a.modpow(&exponent, n);

    if j == 1 {
        x.is_one()
    } else {
        x == n - BigUint::one()
    }
}

// ============================================================================
// JACOBI SYMBOL
// ============================================================================

/// The Jacobi symbol (a/n) for odd `n ≥ 1`
///
/// Returns -1, 0 or 1. Computed by quadratic reciprocity with the standard
/// factor-out-twos reduction.
pub fn jacobi(a: &BigUint, n: &BigUint) -> i8 {
    debug_assert!(n.is_odd(), "Jacobi symbol requires odd n");

    let mut a = a % n;
    let mut n = n.clone();
    let mut result: i8 = 1;

    let three = BigUint::from(3u8);
    let five = BigUint::from(5u8);

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1;
            // (2/n) = -1 iff n ≡ ±3 (mod 8)
            let r = &n % 8u8;
            if r == three || r == five {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        // Reciprocity: flip sign iff both ≡ 3 (mod 4)
        if &a % 4u8 == three && &n % 4u8 == three {
            result = -result;
        }
        a %= &n;
    }

    if n.is_one() {
        result
    } else {
        0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STRATEGIES: [PrimalityStrategy; 3] = [
        PrimalityStrategy::Fermat,
        PrimalityStrategy::MillerRabin,
        PrimalityStrategy::SolovayStrassen,
    ];

    /// Simple sieve of Eratosthenes for ground truth below `limit`
    fn sieve(limit: usize) -> Vec<bool> {
        let mut is_prime = vec![true; limit];
        is_prime[0] = false;
        if limit > 1 {
            is_prime[1] = false;
        }
        let mut i = 2;
        while i * i < limit {
            if is_prime[i] {
                let mut j = i * i;
                while j < limit {
                    is_prime[j] = false;
                    j += i;
                }
            }
            i += 1;
        }
        is_prime
    }

    /// Carmichael numbers below 10,000: composites the Fermat test can only
    /// catch with a base sharing a factor.
    const CARMICHAEL: [u32; 7] = [561, 1105, 1729, 2465, 2821, 6601, 8911];

    #[test]
    fn test_all_primes_below_ten_thousand_accepted() {
        let truth = sieve(10_000);
        for strategy in ALL_STRATEGIES {
            for n in 2..10_000u32 {
                if truth[n as usize] {
                    assert!(
                        strategy.is_probably_prime(&BigUint::from(n), 0.999),
                        "{strategy:?} rejected prime {n}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_composites_rejected() {
        let truth = sieve(10_000);
        // High confidence keeps the probabilistic miss chance negligible
        // across ~8700 composites.
        let confidence = 0.999_999_999;
        for strategy in ALL_STRATEGIES {
            for n in 4..10_000u32 {
                if truth[n as usize] {
                    continue;
                }
                if strategy == PrimalityStrategy::Fermat && CARMICHAEL.contains(&n) {
                    continue;
                }
                assert!(
                    !strategy.is_probably_prime(&BigUint::from(n), confidence),
                    "{strategy:?} accepted composite {n}"
                );
            }
        }
    }

    #[test]
    fn test_small_edge_cases() {
        for strategy in ALL_STRATEGIES {
            assert!(!strategy.is_probably_prime(&BigUint::zero(), 0.99));
            assert!(!strategy.is_probably_prime(&BigUint::one(), 0.99));
            assert!(strategy.is_probably_prime(&BigUint::from(2u8), 0.99));
            assert!(strategy.is_probably_prime(&BigUint::from(3u8), 0.99));
            assert!(!strategy.is_probably_prime(&BigUint::from(4u8), 0.99));
        }
    }

    #[test]
    fn test_round_counts_follow_error_bounds() {
        // 1 - 0.999 = 0.001: 0.25^5 < 0.001, 0.5^10 < 0.001
        assert_eq!(PrimalityStrategy::MillerRabin.rounds_for(0.999), 5);
        assert_eq!(PrimalityStrategy::SolovayStrassen.rounds_for(0.999), 5);
        assert_eq!(PrimalityStrategy::Fermat.rounds_for(0.999), 10);
        // Clamped inputs still produce at least one round
        assert!(PrimalityStrategy::MillerRabin.rounds_for(0.0) >= 1);
    }

    #[test]
    fn test_jacobi_against_known_values() {
        // (a/n) sampled from standard tables
        let cases: [(u32, u32, i8); 8] = [
            (1, 1, 1),
            (2, 3, -1),
            (2, 7, 1),
            (3, 5, -1),
            (5, 9, 1),
            (1001, 9907, -1),
            (19, 45, 1),
            (8, 21, -1),
        ];
        for (a, n, expected) in cases {
            assert_eq!(
                jacobi(&BigUint::from(a), &BigUint::from(n)),
                expected,
                "({a}/{n})"
            );
        }
    }

    #[test]
    fn test_jacobi_zero_when_not_coprime() {
        assert_eq!(jacobi(&BigUint::from(6u8), &BigUint::from(9u8)), 0);
        assert_eq!(jacobi(&BigUint::from(21u8), &BigUint::from(49u8)), 0);
    }

    #[test]
    fn test_large_known_prime() {
        // 2^127 - 1 is a Mersenne prime
        let m127 = (BigUint::one() << 127) - BigUint::one();
        for strategy in ALL_STRATEGIES {
            assert!(strategy.is_probably_prime(&m127, 0.9999));
        }
    }
}
