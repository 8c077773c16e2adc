//! Proof-of-work puzzle binding each block's proof to its predecessor's.
//!
//! A candidate `p` solves the puzzle for a previous proof `q` when
//! `sha256("{q}{p}")`, hex encoded, starts with the difficulty prefix.
//! There is no shortcut: [`ProofOfWork::solve`] walks `0, 1, 2, ...` and
//! returns the smallest candidate that verifies.

use crate::constants::{DEFAULT_DIFFICULTY, HASH_HEX_SIZE};
use crate::error::{DifficultyError, MineError};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Hex prefix a proof digest has to start with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Difficulty(String);

impl Difficulty {
    pub fn new(prefix: impl Into<String>) -> Result<Self, DifficultyError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(DifficultyError::Empty);
        }
        if prefix.len() > HASH_HEX_SIZE {
            return Err(DifficultyError::TooLong(HASH_HEX_SIZE));
        }
        if !prefix.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(DifficultyError::NotHex(prefix));
        }
        Ok(Self(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_met_by(&self, digest_hex: &str) -> bool {
        digest_hex.starts_with(&self.0)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY.to_string())
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared flag a caller trips to stop an in-flight proof search.
///
/// Once set it stays set; clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: Difficulty,
}

impl ProofOfWork {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    /// Hex digest of the two proofs concatenated as decimal text.
    pub fn digest(previous_proof: u64, candidate: u64) -> String {
        let guess = format!("{previous_proof}{candidate}");
        hex::encode(Sha256::digest(guess.as_bytes()))
    }

    pub fn verify(&self, previous_proof: u64, candidate: u64) -> bool {
        self.difficulty
            .is_met_by(&Self::digest(previous_proof, candidate))
    }

    /// Smallest proof that verifies against `previous_proof`.
    pub fn solve(&self, previous_proof: u64, cancel: &CancelFlag) -> Result<u64, MineError> {
        for candidate in 0..=u64::MAX {
            if cancel.is_cancelled() {
                return Err(MineError::Cancelled);
            }
            if self.verify(previous_proof, candidate) {
                return Ok(candidate);
            }
        }
        Err(MineError::Exhausted)
    }

    /// Same answer as [`solve`](Self::solve), searched across rayon's thread pool.
    ///
    /// `find_first` keeps the minimal candidate even though later ranges may
    /// verify earlier in wall-clock time.
    pub fn solve_parallel(
        &self,
        previous_proof: u64,
        cancel: &CancelFlag,
    ) -> Result<u64, MineError> {
        let found = (0u64..u64::MAX)
            .into_par_iter()
            .find_first(|candidate| {
                cancel.is_cancelled() || self.verify(previous_proof, *candidate)
            });
        if cancel.is_cancelled() {
            return Err(MineError::Cancelled);
        }
        found.ok_or(MineError::Exhausted)
    }
}
