use reqwest::Url;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeerAddressError {
    #[error("invalid peer address {0:?}")]
    Invalid(String),
}

/// Known peers, stored as `host[:port]` and iterated in sorted order.
#[derive(Clone, Debug, Default)]
pub struct PeerSet {
    nodes: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a peer given either as a URL (`http://10.0.0.5:5000/`) or as a
    /// bare `host:port`. Returns the normalised address.
    pub fn register(&mut self, address: &str) -> Result<String, PeerAddressError> {
        let netloc = netloc(address)?;
        self.nodes.insert(netloc.clone());
        Ok(netloc)
    }

    pub fn contains(&self, netloc: &str) -> bool {
        self.nodes.contains(netloc)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }
}

fn netloc(address: &str) -> Result<String, PeerAddressError> {
    let trimmed = address.trim();
    let invalid = || PeerAddressError::Invalid(address.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }
    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{trimmed}"))
    }
    .map_err(|_| invalid())?;

    let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
