//! Chip sequence generation for BPSK pulses
//!
//! - [`SequenceType::Random`]: independent fair bits from the caller's RNG,
//!   so every pulse of a train gets a different code
//! - [`SequenceType::MaximalLength`]: deterministic m-sequence from a Galois
//!   LFSR with a primitive feedback polynomial; every pulse gets the same code

use std::str::FromStr;

use bitvec::prelude::*;
use rand::Rng;
use snafu::ensure;

use crate::error::{GenerationError, NoBitsSnafu, SequenceTooLongSnafu, TrainTooLongSnafu};
use crate::pulse_train::MAX_SAMPLES;

/// Largest supported LFSR order
pub const MAX_ORDER: u32 = 16;

/// Galois (right-shift) feedback masks giving maximal-length sequences,
/// indexed by register order minus 2
const GALOIS_TAPS: [u32; 15] = [
    0x3,    // 2
    0x6,    // 3
    0xC,    // 4
    0x14,   // 5
    0x30,   // 6
    0x60,   // 7
    0xB8,   // 8
    0x110,  // 9
    0x240,  // 10
    0x500,  // 11
    0x829,  // 12
    0x100D, // 13
    0x2015, // 14
    0x6000, // 15
    0xD008, // 16
];

/// How the chips of each BPSK pulse are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceType {
    #[default]
    Random,
    MaximalLength,
}

impl FromStr for SequenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(SequenceType::Random),
            "mls" | "maximal-length" | "m-sequence" => Ok(SequenceType::MaximalLength),
            other => Err(format!("unknown sequence type '{}'", other)),
        }
    }
}

/// Generate `num_bits` chips of the requested type
pub fn generate<R: Rng>(
    sequence_type: SequenceType,
    num_bits: usize,
    rng: &mut R,
) -> Result<BitVec, GenerationError> {
    ensure!(num_bits > 0, NoBitsSnafu);
    ensure!(
        num_bits <= MAX_SAMPLES,
        TrainTooLongSnafu {
            what: "chip sequence",
            max: MAX_SAMPLES
        }
    );

    match sequence_type {
        SequenceType::Random => Ok((0..num_bits).map(|_| rng.random::<bool>()).collect()),
        SequenceType::MaximalLength => maximal_length(num_bits),
    }
}

/// First `num_bits` chips of the shortest m-sequence at least that long
pub fn maximal_length(num_bits: usize) -> Result<BitVec, GenerationError> {
    ensure!(num_bits > 0, NoBitsSnafu);

    let max = (1usize << MAX_ORDER) - 1;
    ensure!(num_bits <= max, SequenceTooLongSnafu { num_bits, max });

    let order = (2..=MAX_ORDER)
        .find(|&n| (1usize << n) - 1 >= num_bits)
        .unwrap_or(MAX_ORDER);

    Ok(lfsr(order, num_bits))
}

/// Run an order-`order` Galois LFSR from seed 1 for `length` output bits
fn lfsr(order: u32, length: usize) -> BitVec {
    let taps = GALOIS_TAPS[(order - 2) as usize];
    let mut state = 1u32;

    let mut chips = BitVec::with_capacity(length);
    for _ in 0..length {
        let out = state & 1;
        chips.push(out != 0);
        state >>= 1;
        if out != 0 {
            state ^= taps;
        }
    }
    chips
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_sequence_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let chips = generate(SequenceType::Random, 100, &mut rng).unwrap();
        assert_eq!(chips.len(), 100);
        // 100 fair coin flips all landing the same way is not a realistic outcome
        assert!(chips.count_ones() > 0 && chips.count_zeros() > 0);
    }

    #[test]
    fn test_random_sequences_differ_between_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = generate(SequenceType::Random, 64, &mut rng).unwrap();
        let b = generate(SequenceType::Random, 64, &mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_bits_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate(SequenceType::Random, 0, &mut rng),
            Err(GenerationError::NoBits)
        );
        assert_eq!(maximal_length(0), Err(GenerationError::NoBits));
    }

    #[test]
    fn test_m_sequence_balance() {
        // A full period of an order-n m-sequence has 2^(n-1) ones
        for order in 2..=10u32 {
            let period = (1usize << order) - 1;
            let chips = maximal_length(period).unwrap();
            assert_eq!(chips.len(), period);
            assert_eq!(chips.count_ones(), 1 << (order - 1), "order {}", order);
        }
    }

    #[test]
    fn test_m_sequence_period() {
        for order in 3..=8u32 {
            let period = (1usize << order) - 1;
            let chips = lfsr(order, 2 * period);
            assert_eq!(chips[..period], chips[period..], "order {}", order);

            // No shorter period divides the sequence
            for p in (1..period).filter(|p| period % p == 0) {
                assert!(
                    (0..period).any(|i| chips[i] != chips[i + p]),
                    "order {} repeats after {}",
                    order,
                    p
                );
            }
        }
    }

    #[test]
    fn test_m_sequence_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = generate(SequenceType::MaximalLength, 13, &mut rng).unwrap();
        let b = generate(SequenceType::MaximalLength, 13, &mut rng).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 13);
    }

    #[test]
    fn test_m_sequence_too_long() {
        let max = (1usize << MAX_ORDER) - 1;
        assert!(maximal_length(max).is_ok());
        assert_eq!(
            maximal_length(max + 1),
            Err(GenerationError::SequenceTooLong { num_bits: max + 1, max })
        );
    }

    #[test]
    fn test_sequence_type_from_str() {
        assert_eq!("random".parse::<SequenceType>(), Ok(SequenceType::Random));
        assert_eq!("MLS".parse::<SequenceType>(), Ok(SequenceType::MaximalLength));
        assert!("gold".parse::<SequenceType>().is_err());
    }
}
