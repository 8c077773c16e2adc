//! Longest-valid-chain agreement between peers.
//!
//! A peer chain replaces ours only when it is strictly longer than every
//! chain seen so far in the pass (ours included) and passes validation.
//! Equal lengths never win, whatever their content.

use crate::error::PeerError;
use crate::validate::ChainValidator;
use crate::{Block, Ledger};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A chain as reported by a peer, together with the length it claims.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerChain {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl PeerChain {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.length == self.chain.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub replaced: bool,
    /// The ledger's chain after the pass.
    pub chain: Vec<Block>,
}

#[derive(Clone, Debug, Default)]
pub struct ConsensusResolver {
    validator: ChainValidator,
}

impl ConsensusResolver {
    pub fn new(validator: ChainValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &ChainValidator {
        &self.validator
    }

    /// Best strictly-longer valid chain among `peers`, if any.
    ///
    /// Every report is scanned; each adoption raises the bar for the ones
    /// after it, so among equally long winners the earliest one is kept.
    pub fn select<I>(&self, local_len: usize, peers: I) -> Option<PeerChain>
    where
        I: IntoIterator<Item = Result<PeerChain, PeerError>>,
    {
        let mut max_length = local_len;
        let mut best = None;

        for report in peers {
            let candidate = match report {
                Ok(candidate) => candidate,
                Err(err) => {
                    warn!(%err, "skipping peer");
                    continue;
                }
            };
            if !candidate.is_consistent() {
                warn!(
                    claimed = candidate.length,
                    actual = candidate.chain.len(),
                    "skipping peer chain whose length does not match its blocks"
                );
                continue;
            }
            if candidate.length <= max_length {
                debug!(length = candidate.length, max_length, "peer chain not longer");
                continue;
            }
            if let Some(link) = self.validator.find_invalid_link(&candidate.chain) {
                debug!(length = candidate.length, %link, "rejecting invalid peer chain");
                continue;
            }
            max_length = candidate.length;
            best = Some(candidate);
        }

        best
    }

    /// Runs [`select`](Self::select) against `ledger` and swaps in the winner.
    pub fn resolve<I>(&self, ledger: &Ledger, peers: I) -> Resolution
    where
        I: IntoIterator<Item = Result<PeerChain, PeerError>>,
    {
        let local_len = ledger.len();
        if let Some(candidate) = self.select(local_len, peers) {
            if ledger.replace_if_longer(candidate.chain.clone()) {
                info!(
                    old_length = local_len,
                    new_length = candidate.length,
                    "local chain replaced by longer peer chain"
                );
                return Resolution {
                    replaced: true,
                    chain: candidate.chain,
                };
            }
        }
        Resolution {
            replaced: false,
            chain: ledger.chain(),
        }
    }
}
