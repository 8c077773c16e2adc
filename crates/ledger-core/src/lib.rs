use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod chain;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod mine;
pub mod pow;
pub mod validate;

pub use chain::{genesis_block, Ledger};
pub use consensus::{ConsensusResolver, PeerChain, Resolution};
pub use error::{DifficultyError, LedgerError, MineError, PeerError};
pub use mine::Miner;
pub use pow::{CancelFlag, Difficulty, ProofOfWork};
pub use validate::{ChainValidator, InvalidLink, LinkFault};

/// Lowercase hex SHA-256 digest, the form every block hash takes on the wire.
pub type Hash = String;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: Hash,
}

impl Block {
    pub fn hash(&self) -> Hash {
        hash_block(self)
    }
}

// Field order below is alphabetical on purpose: serde emits struct fields in
// declaration order, which makes the encoding key-sorted at every level.
#[derive(Serialize)]
struct CanonicalTransaction<'a> {
    amount: u64,
    recipient: &'a str,
    sender: &'a str,
}

#[derive(Serialize)]
struct CanonicalBlock<'a> {
    index: u64,
    previous_hash: &'a str,
    proof: u64,
    timestamp: f64,
    transactions: Vec<CanonicalTransaction<'a>>,
}

/// Compact, key-sorted JSON encoding of a block. This is the exact preimage
/// hashed by [`hash_block`].
pub fn canonical_bytes(block: &Block) -> Vec<u8> {
    let canonical = CanonicalBlock {
        index: block.index,
        previous_hash: &block.previous_hash,
        proof: block.proof,
        timestamp: block.timestamp,
        transactions: block
            .transactions
            .iter()
            .map(|tx| CanonicalTransaction {
                amount: tx.amount,
                recipient: &tx.recipient,
                sender: &tx.sender,
            })
            .collect(),
    };
    serde_json::to_vec(&canonical).expect("canonical block encoding has no fallible fields")
}

/// SHA-256 over [`canonical_bytes`], hex encoded.
pub fn hash_block(block: &Block) -> Hash {
    hex::encode(Sha256::digest(canonical_bytes(block)))
}

pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
