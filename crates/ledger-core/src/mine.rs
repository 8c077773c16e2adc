use crate::constants::{MINING_REWARD, REWARD_SENDER};
use crate::error::{LedgerError, MineError};
use crate::pow::{CancelFlag, ProofOfWork};
use crate::{Block, Ledger, Transaction};
use tracing::{debug, info};

/// Mines blocks for one node and pays that node the block reward.
#[derive(Clone, Debug)]
pub struct Miner {
    pow: ProofOfWork,
    node_id: String,
    parallel: bool,
}

impl Miner {
    pub fn new(pow: ProofOfWork, node_id: impl Into<String>) -> Self {
        Self {
            pow,
            node_id: node_id.into(),
            parallel: false,
        }
    }

    /// Search proofs across rayon's pool instead of on the calling thread.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn reward(&self) -> Transaction {
        Transaction::new(REWARD_SENDER, self.node_id.clone(), MINING_REWARD)
    }

    /// Solves the puzzle posed by the current tip and forges the next block.
    ///
    /// The search runs without holding the ledger lock. If the tip changes
    /// underneath it (a chain replacement or another miner), the search
    /// restarts against the new tip.
    pub fn mine(&self, ledger: &Ledger, cancel: &CancelFlag) -> Result<Block, MineError> {
        loop {
            let tip = ledger.tip()?;
            let previous_hash = tip.hash();
            let proof = if self.parallel {
                self.pow.solve_parallel(tip.proof, cancel)?
            } else {
                self.pow.solve(tip.proof, cancel)?
            };

            match ledger.forge_on(&previous_hash, proof, self.reward()) {
                Ok(block) => {
                    info!(
                        index = block.index,
                        proof,
                        previous_hash = %block.previous_hash,
                        "mined block"
                    );
                    return Ok(block);
                }
                Err(LedgerError::TipMoved { actual, .. }) => {
                    debug!(stale = %previous_hash, %actual, "tip moved during proof search; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::Difficulty;
    use crate::validate::ChainValidator;

    fn trivial() -> ProofOfWork {
        ProofOfWork::new(Difficulty::new("0").unwrap())
    }

    #[test]
    fn mine_pays_reward_and_extends_chain() {
        let ledger = Ledger::new();
        ledger.new_transaction("alice", "bob", 2);
        let miner = Miner::new(trivial(), "node-a");
        let block = miner.mine(&ledger, &CancelFlag::new()).unwrap();

        assert_eq!(block.index, 2);
        assert_eq!(
            block.transactions,
            vec![
                Transaction::new("alice", "bob", 2),
                Transaction::new("0", "node-a", 1)
            ]
        );
        assert!(ledger.pending().is_empty());
        assert!(ChainValidator::new(trivial()).is_valid(&ledger.chain()));
    }

    #[test]
    fn parallel_miner_finds_the_same_proof() {
        let serial = Ledger::new();
        let parallel = Ledger::new();
        let a = Miner::new(trivial(), "n").mine(&serial, &CancelFlag::new()).unwrap();
        let b = Miner::new(trivial(), "n")
            .parallel(true)
            .mine(&parallel, &CancelFlag::new())
            .unwrap();
        assert_eq!(a.proof, b.proof);
    }

    #[test]
    fn cancelled_mining_leaves_ledger_untouched() {
        let ledger = Ledger::new();
        ledger.new_transaction("alice", "bob", 2);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = Miner::new(ProofOfWork::default(), "n")
            .mine(&ledger, &cancel)
            .unwrap_err();
        assert_eq!(err, MineError::Cancelled);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending().len(), 1);
    }

    #[test]
    fn mining_an_empty_ledger_fails() {
        let ledger = Ledger::from_chain(vec![]);
        let err = Miner::new(trivial(), "n")
            .mine(&ledger, &CancelFlag::new())
            .unwrap_err();
        assert_eq!(err, MineError::Ledger(LedgerError::EmptyChain));
    }
}
