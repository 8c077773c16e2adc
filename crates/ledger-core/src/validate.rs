use crate::pow::ProofOfWork;
use crate::{hash_block, Block};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkFault {
    /// `previous_hash` does not match the hash of the preceding block.
    BrokenHashLink,
    /// The proof does not solve the puzzle posed by the preceding proof.
    BadProof,
}

/// First adjacent pair of a chain that fails validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidLink {
    /// Position in the chain (0-based) of the offending block.
    pub position: usize,
    pub fault: LinkFault,
}

impl fmt::Display for InvalidLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.fault {
            LinkFault::BrokenHashLink => "previous_hash mismatch",
            LinkFault::BadProof => "proof does not verify",
        };
        write!(f, "block at position {}: {what}", self.position)
    }
}

/// Checks hash links and proofs of arbitrary chains, local or from peers.
///
/// Genesis is taken as given; only pairs from the second block onward are checked.
#[derive(Clone, Debug, Default)]
pub struct ChainValidator {
    pow: ProofOfWork,
}

impl ChainValidator {
    pub fn new(pow: ProofOfWork) -> Self {
        Self { pow }
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn is_valid(&self, chain: &[Block]) -> bool {
        self.find_invalid_link(chain).is_none()
    }

    pub fn find_invalid_link(&self, chain: &[Block]) -> Option<InvalidLink> {
        chain
            .windows(2)
            .enumerate()
            .find_map(|(i, pair)| {
                let (previous, current) = (&pair[0], &pair[1]);
                let fault = if current.previous_hash != hash_block(previous) {
                    LinkFault::BrokenHashLink
                } else if !self.pow.verify(previous.proof, current.proof) {
                    LinkFault::BadProof
                } else {
                    return None;
                };
                Some(InvalidLink {
                    position: i + 1,
                    fault,
                })
            })
    }
}
