pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Hex prefix a proof digest must start with unless a node is configured otherwise.
pub const DEFAULT_DIFFICULTY: &str = "001";

pub const GENESIS_INDEX: u64 = 1;
pub const GENESIS_PROOF: u64 = 1000;
pub const GENESIS_TIMESTAMP: f64 = 0.0;
/// Stands in for the predecessor hash of the genesis block. Not a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Sender used for system-issued mining rewards.
pub const REWARD_SENDER: &str = "0";
pub const MINING_REWARD: u64 = 1;
