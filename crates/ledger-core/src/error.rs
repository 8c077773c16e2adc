use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger was built without a genesis block.
    #[error("ledger has no blocks; genesis was never initialised")]
    EmptyChain,
    #[error("chain tip moved while mining: expected {expected}, found {actual}")]
    TipMoved { expected: String, actual: String },
}

/// Why a peer's chain was left out of a resolution pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerError {
    #[error("peer {peer} is unavailable: {reason}")]
    Unavailable { peer: String, reason: String },
    #[error("peer {peer} returned a malformed chain: {reason}")]
    Malformed { peer: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MineError {
    #[error("proof search was cancelled")]
    Cancelled,
    #[error("proof space exhausted without a solution")]
    Exhausted,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("difficulty prefix must not be empty")]
    Empty,
    #[error("difficulty prefix is longer than a digest ({0} hex chars)")]
    TooLong(usize),
    #[error("difficulty prefix {0:?} is not lowercase hex")]
    NotHex(String),
}
