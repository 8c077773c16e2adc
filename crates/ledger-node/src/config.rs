use crate::constants::{DEFAULT_LISTEN, DEFAULT_PEER_TIMEOUT_SECS};
use clap::Parser;
use ledger_core::constants::DEFAULT_DIFFICULTY;
use ledger_core::Difficulty;
use std::{net::SocketAddr, time::Duration};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ledger-node")]
#[command(about = "Proof-of-work ledger node")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, env = "LEDGER_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Hex prefix a proof digest must start with
    #[arg(long, env = "LEDGER_DIFFICULTY", default_value = DEFAULT_DIFFICULTY)]
    pub difficulty: Difficulty,

    /// Peer to register at startup (repeatable, or comma separated in the env var)
    #[arg(long = "peer", env = "LEDGER_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Identifier credited with mining rewards; random when omitted
    #[arg(long, env = "LEDGER_NODE_ID")]
    pub node_id: Option<String>,

    /// Seconds to wait for a peer's chain before skipping it
    #[arg(long, env = "LEDGER_PEER_TIMEOUT_SECS", default_value_t = DEFAULT_PEER_TIMEOUT_SECS)]
    pub peer_timeout_secs: u64,

    /// Spread the proof search over all cores
    #[arg(long, env = "LEDGER_PARALLEL_MINING")]
    pub parallel_mining: bool,
}

#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub listen: SocketAddr,
    pub difficulty: Difficulty,
    pub peers: Vec<String>,
    pub node_id: String,
    pub peer_timeout: Duration,
    pub parallel_mining: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5000)),
            difficulty: Difficulty::default(),
            peers: Vec::new(),
            node_id: random_node_id(),
            peer_timeout: Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS),
            parallel_mining: false,
        }
    }
}

impl From<Args> for NodeConfig {
    fn from(args: Args) -> Self {
        Self {
            listen: args.listen,
            difficulty: args.difficulty,
            peers: args.peers,
            node_id: args.node_id.unwrap_or_else(random_node_id),
            peer_timeout: Duration::from_secs(args.peer_timeout_secs),
            parallel_mining: args.parallel_mining,
        }
    }
}

/// A v4 UUID with the dashes stripped.
pub fn random_node_id() -> String {
    Uuid::new_v4().simple().to_string()
}
