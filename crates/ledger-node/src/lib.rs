pub mod api;
pub mod client;
pub mod config;
mod constants;
pub mod peers;

use anyhow::Result;
use config::NodeConfig;
use ledger_core::{CancelFlag, ChainValidator, ConsensusResolver, Ledger, Miner, ProofOfWork};
use parking_lot::RwLock;
use peers::PeerSet;
use std::sync::Arc;
use tracing::info;

/// Everything a request handler needs. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub miner: Miner,
    pub resolver: ConsensusResolver,
    pub peers: Arc<RwLock<PeerSet>>,
    pub http: reqwest::Client,
    /// Tripped on shutdown to abort any proof search in flight.
    pub cancel: CancelFlag,
}

impl AppState {
    pub fn new(config: &NodeConfig) -> Result<Self> {
        let pow = ProofOfWork::new(config.difficulty.clone());
        let mut peers = PeerSet::new();
        for address in &config.peers {
            peers.register(address)?;
        }
        let http = reqwest::Client::builder()
            .timeout(config.peer_timeout)
            .build()?;

        info!(
            node_id = %config.node_id,
            difficulty = %config.difficulty,
            peers = peers.len(),
            "node state initialised"
        );

        Ok(Self {
            ledger: Arc::new(Ledger::new()),
            miner: Miner::new(pow.clone(), config.node_id.clone())
                .parallel(config.parallel_mining),
            resolver: ConsensusResolver::new(ChainValidator::new(pow)),
            peers: Arc::new(RwLock::new(peers)),
            http,
            cancel: CancelFlag::new(),
        })
    }
}
