// File: wearview-core/src/clients/mod.rs
//
// Typed clients for the two remote services the preview depends on: the
// peer (content/lambdas) service and the NFT/marketplace API. All calls
// go through a shared bounded-retry GET helper.

pub mod nft;
pub mod peer;

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use wearview_common::Error;
use wearview_common::models::{CatalogItem, PreviewOptions};

pub use nft::{Nft, NftClient, legacy_urn_from_image};
pub use peer::PeerClient;

/// Retry knobs applied to every remote call.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

pub(crate) fn build_http_client() -> Result<Client, Error> {
    let client = reqwest::ClientBuilder::new()
        .user_agent("wearview/0.1")
        .build()?;
    Ok(client)
}

/// GET a JSON document with bounded retry. Any transport error or
/// non-2xx status consumes an attempt; a 404 on the last attempt
/// surfaces as `NotFound` so callers can treat absence distinctly.
pub(crate) async fn get_json(client: &Client, policy: &FetchPolicy, url: &str) -> Result<Value, Error> {
    let mut last_error = Error::Transport("no attempts made".to_string());
    for attempt in 1..=policy.attempts {
        debug!("GET {url} (attempt {attempt}/{})", policy.attempts);
        match try_get_json(client, url).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < policy.attempts {
                    warn!("GET {url} failed => {e}; retrying in {:?}", policy.backoff);
                    last_error = e;
                    sleep(policy.backoff).await;
                } else {
                    last_error = e;
                }
            }
        }
    }
    match last_error {
        e @ Error::NotFound(_) => Err(e),
        e => Err(Error::Transport(format!(
            "GET {url} failed after {} attempts: {e}",
            policy.attempts
        ))),
    }
}

async fn try_get_json(client: &Client, url: &str) -> Result<Value, Error> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::NotFound(url.to_string()));
    }
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(Error::Transport(format!("HTTP {status} => {text}")));
    }
    let value = resp.json::<Value>().await?;
    Ok(value)
}

/// Both remote clients, constructed together from one options snapshot so
/// env selection and explicit URL overrides apply consistently.
pub struct Clients {
    pub peer: PeerClient,
    pub nft: NftClient,
    http_client: Client,
    policy: FetchPolicy,
}

impl Clients {
    pub fn from_options(options: &PreviewOptions, policy: FetchPolicy) -> Result<Self, Error> {
        Ok(Self {
            peer: PeerClient::new(&options.peer_url(), policy.clone())?,
            nft: NftClient::new(&options.nft_server_url(), policy.clone())?,
            http_client: build_http_client()?,
            policy,
        })
    }

    /// Fetch a full catalog item document from an arbitrary URL.
    pub async fn fetch_item_url(&self, url: &str) -> Result<CatalogItem, Error> {
        let value = get_json(&self.http_client, &self.policy, url).await?;
        let item: CatalogItem = serde_json::from_value(value)?;
        Ok(item)
    }

    /// Resolves the featured item named by a contract address plus either
    /// an item id or a token id.
    ///
    /// The token-id path looks up the owned NFT first to discover its item
    /// id; legacy (ethereum collections-v1) NFTs carry no item id, so their
    /// canonical URN is derived from the NFT's image path and fetched from
    /// the peer instead.
    pub async fn fetch_item_from_contract(
        &self,
        contract_address: &str,
        token_id: Option<&str>,
        item_id: Option<&str>,
    ) -> Result<CatalogItem, Error> {
        if let Some(item_id) = item_id {
            return self.nft.fetch_item(contract_address, item_id).await;
        }
        let Some(token_id) = token_id else {
            return Err(Error::Configuration(
                "You must provide either an item id or a token id".to_string(),
            ));
        };
        let nft = self.nft.fetch_nft(contract_address, token_id).await?;
        match nft.item_id {
            Some(item_id) => self.nft.fetch_item(contract_address, &item_id).await,
            None => {
                let urn = legacy_urn_from_image(&nft.image).ok_or_else(|| {
                    Error::Parse(format!("Could not derive a URN from image: {}", nft.image))
                })?;
                debug!("Legacy NFT {contract_address}/{token_id} resolved to {urn}");
                self.peer.fetch_wearable(&urn).await
            }
        }
    }
}
