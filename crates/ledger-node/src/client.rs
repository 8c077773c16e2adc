use crate::constants::CHAIN_PATH;
use ledger_core::{PeerChain, PeerError};
use reqwest::Client;
use tracing::debug;

/// Fetches one peer's chain. Transport and HTTP status failures are
/// `Unavailable`; a body that does not decode is `Malformed`.
pub async fn fetch_chain(http: &Client, peer: &str) -> Result<PeerChain, PeerError> {
    let unavailable = |err: reqwest::Error| PeerError::Unavailable {
        peer: peer.to_string(),
        reason: err.to_string(),
    };
    let url = format!("http://{peer}{CHAIN_PATH}");
    let body = http
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(unavailable)?
        .bytes()
        .await
        .map_err(unavailable)?;

    let reported: PeerChain =
        serde_json::from_slice(&body).map_err(|err| PeerError::Malformed {
            peer: peer.to_string(),
            reason: err.to_string(),
        })?;
    debug!(peer, length = reported.length, "fetched peer chain");
    Ok(reported)
}

/// Fetches every peer concurrently. Results come back in the order of `peers`
/// so a resolution pass over them is deterministic.
pub async fn fetch_all(http: &Client, peers: Vec<String>) -> Vec<Result<PeerChain, PeerError>> {
    let handles: Vec<_> = peers
        .into_iter()
        .map(|peer| {
            let http = http.clone();
            let task = tokio::spawn({
                let peer = peer.clone();
                async move { fetch_chain(&http, &peer).await }
            });
            (peer, task)
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (peer, task) in handles {
        reports.push(match task.await {
            Ok(report) => report,
            Err(err) => Err(PeerError::Unavailable {
                peer,
                reason: err.to_string(),
            }),
        });
    }
    reports
}
