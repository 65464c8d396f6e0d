// File: wearview-core/src/clients/peer.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use wearview_common::Error;
use wearview_common::models::{CatalogItem, Profile};

use crate::clients::{FetchPolicy, build_http_client, get_json};

/// Client for the peer content/lambdas service: wearable definitions and
/// avatar profiles.
pub struct PeerClient {
    base_url: String,
    http_client: Client,
    policy: FetchPolicy,
}

/// JSON shape for `GET /lambdas/collections/wearables`. Entries are kept
/// raw so one malformed item cannot sink the whole batch.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WearablesJson {
    wearables: Vec<Value>,
}

impl PeerClient {
    pub fn new(base_url: &str, policy: FetchPolicy) -> Result<Self, Error> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: build_http_client()?,
            policy,
        })
    }

    /// Fetch a batch of wearable/emote definitions in one request. URNs
    /// that the catalog does not know are silently absent from the result.
    pub async fn fetch_wearables(&self, urns: &[String]) -> Result<Vec<CatalogItem>, Error> {
        if urns.is_empty() {
            return Ok(vec![]);
        }
        let query = urns
            .iter()
            .map(|urn| format!("wearableId={}", urlencoding::encode(urn)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}/lambdas/collections/wearables?{}", self.base_url, query);
        let value = get_json(&self.http_client, &self.policy, &url).await?;
        let batch: WearablesJson = serde_json::from_value(value)?;

        let mut items = Vec::with_capacity(batch.wearables.len());
        for entry in batch.wearables {
            match serde_json::from_value::<CatalogItem>(entry) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping unparsable catalog entry => {e}"),
            }
        }
        Ok(items)
    }

    /// Fetch a single definition by URN; `NotFound` when the catalog has
    /// no entry for it.
    pub async fn fetch_wearable(&self, urn: &str) -> Result<CatalogItem, Error> {
        let items = self.fetch_wearables(&[urn.to_string()]).await?;
        items
            .into_iter()
            .find(|item| item.id() == urn)
            .ok_or_else(|| Error::NotFound(urn.to_string()))
    }

    /// Fetch a profile by address or name. `None` when the service has no
    /// profile for the id, or the profile carries no avatars.
    pub async fn fetch_profile(&self, id: &str) -> Result<Option<Profile>, Error> {
        let url = format!("{}/lambdas/profiles/{}", self.base_url, urlencoding::encode(id));
        let value = match get_json(&self.http_client, &self.policy, &url).await {
            Ok(value) => value,
            Err(Error::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let profile: Profile = serde_json::from_value(value)?;
        if profile.avatars.is_empty() {
            return Ok(None);
        }
        Ok(Some(profile))
    }
}
