use crate::domain::ports::EntropySource;
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Draws from the operating system's random number generator.
///
/// Unpredictable to payers, which makes it the default outside of replays.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn value(&self) -> u64 {
        OsRng.next_u64()
    }
}

/// A seeded generator: the same seed replays the same selections.
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn value(&self) -> u64 {
        // The generator holds no invariant a panicking holder could break.
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_u64()
    }
}

/// Always yields the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedEntropy(u64);

impl FixedEntropy {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl EntropySource for FixedEntropy {
    fn value(&self) -> u64 {
        self.0
    }
}

/// Yields scripted values in order, cycling once exhausted.
///
/// Also counts how many values were drawn.
pub struct SequenceEntropy {
    values: Vec<u64>,
    cursor: AtomicUsize,
}

impl SequenceEntropy {
    pub fn new(values: Vec<u64>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn drawn(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl EntropySource for SequenceEntropy {
    fn value(&self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let position = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.values[position % self.values.len()]
    }
}
