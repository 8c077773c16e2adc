use crate::constants::{GENESIS_INDEX, GENESIS_PREVIOUS_HASH, GENESIS_PROOF, GENESIS_TIMESTAMP};
use crate::error::LedgerError;
use crate::{hash_block, unix_now, Block, Hash, Transaction};
use parking_lot::RwLock;
use tracing::{debug, info};

/// The fixed first block every node starts from.
pub fn genesis_block() -> Block {
    Block {
        index: GENESIS_INDEX,
        timestamp: GENESIS_TIMESTAMP,
        transactions: vec![],
        proof: GENESIS_PROOF,
        previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl LedgerState {
    fn tip(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }

    /// Seals the whole pending pool into a new block on top of the chain.
    fn append(&mut self, proof: u64, previous_hash: Hash) -> Block {
        let block = Block {
            index: self.next_index(),
            timestamp: unix_now(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());
        block
    }
}

/// Local chain plus the pool of transactions waiting for a block.
///
/// Both live behind one lock: submitting, appending and replacing all
/// serialize against each other, and a replacement is never observed half done.
#[derive(Debug)]
pub struct Ledger {
    state: RwLock<LedgerState>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::from_chain(vec![genesis_block()])
    }

    /// Ledger over an existing chain. An empty chain is allowed but leaves
    /// [`tip`](Self::tip) failing until a block is appended with an explicit hash.
    pub fn from_chain(chain: Vec<Block>) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                chain,
                pending: Vec::new(),
            }),
        }
    }

    /// Buffers a transaction and returns the index of the block that will carry it.
    pub fn new_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> u64 {
        self.submit(Transaction::new(sender, recipient, amount))
    }

    pub fn submit(&self, tx: Transaction) -> u64 {
        let mut state = self.state.write();
        state.pending.push(tx);
        state.next_index()
    }

    /// Appends a block sealing the pending pool.
    ///
    /// `previous_hash` defaults to the hash of the current tip.
    pub fn mine_next_block(
        &self,
        proof: u64,
        previous_hash: Option<Hash>,
    ) -> Result<Block, LedgerError> {
        let mut state = self.state.write();
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => hash_block(state.tip()?),
        };
        let block = state.append(proof, previous_hash);
        info!(index = block.index, proof, "appended block");
        Ok(block)
    }

    /// Appends a block only if the tip still hashes to `expected_previous_hash`.
    ///
    /// `reward` joins the pool right before it is sealed, so it lands last in
    /// the block and never lingers if the tip has moved.
    pub fn forge_on(
        &self,
        expected_previous_hash: &str,
        proof: u64,
        reward: Transaction,
    ) -> Result<Block, LedgerError> {
        let mut state = self.state.write();
        let actual = hash_block(state.tip()?);
        if actual != expected_previous_hash {
            return Err(LedgerError::TipMoved {
                expected: expected_previous_hash.to_string(),
                actual,
            });
        }
        state.pending.push(reward);
        let block = state.append(proof, actual);
        info!(index = block.index, proof, "forged block");
        Ok(block)
    }

    pub fn tip(&self) -> Result<Block, LedgerError> {
        self.state.read().tip().cloned()
    }

    pub fn chain(&self) -> Vec<Block> {
        self.state.read().chain.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().chain.is_empty()
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.state.read().pending.clone()
    }

    /// Swaps in `chain` wholesale. The pending pool is left alone.
    pub fn replace_chain(&self, chain: Vec<Block>) {
        let mut state = self.state.write();
        debug!(old = state.chain.len(), new = chain.len(), "replacing chain");
        state.chain = chain;
    }

    /// Swaps in `chain` only if it is still strictly longer than ours.
    pub fn replace_if_longer(&self, chain: Vec<Block>) -> bool {
        let mut state = self.state.write();
        if chain.len() <= state.chain.len() {
            debug!(
                local = state.chain.len(),
                candidate = chain.len(),
                "candidate no longer longer than local chain"
            );
            return false;
        }
        state.chain = chain;
        true
    }
}
