// File: wearview-core/src/clients/nft.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use wearview_common::Error;
use wearview_common::models::CatalogItem;

use crate::clients::{FetchPolicy, build_http_client, get_json};

/// Client for the NFT/marketplace API: collection items and owned NFTs.
pub struct NftClient {
    base_url: String,
    http_client: Client,
    policy: FetchPolicy,
}

/// An owned token as returned by the NFT API. Modern collections carry
/// the item id; legacy ethereum collections only carry the image URL.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Nft {
    pub item_id: Option<String>,
    pub image: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ItemsJson {
    data: Vec<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct NftsJson {
    data: Vec<NftEntryJson>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct NftEntryJson {
    nft: Nft,
}

impl NftClient {
    pub fn new(base_url: &str, policy: FetchPolicy) -> Result<Self, Error> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: build_http_client()?,
            policy,
        })
    }

    /// Fetch a collection item by contract address and item id.
    pub async fn fetch_item(&self, contract_address: &str, item_id: &str) -> Result<CatalogItem, Error> {
        let url = format!(
            "{}/v1/items?contractAddress={}&itemId={}",
            self.base_url,
            urlencoding::encode(contract_address),
            urlencoding::encode(item_id)
        );
        let value = get_json(&self.http_client, &self.policy, &url).await?;
        let items: ItemsJson = serde_json::from_value(value)?;
        let entry = items.data.into_iter().next().ok_or_else(|| {
            Error::NotFound(format!("item {item_id} in contract {contract_address}"))
        })?;
        let item: CatalogItem = serde_json::from_value(entry)?;
        Ok(item)
    }

    /// Fetch an owned NFT by contract address and token id.
    pub async fn fetch_nft(&self, contract_address: &str, token_id: &str) -> Result<Nft, Error> {
        let url = format!(
            "{}/v1/nfts?contractAddress={}&tokenId={}",
            self.base_url,
            urlencoding::encode(contract_address),
            urlencoding::encode(token_id)
        );
        let value = get_json(&self.http_client, &self.policy, &url).await?;
        let nfts: NftsJson = serde_json::from_value(value)?;
        let entry = nfts.data.into_iter().next().ok_or_else(|| {
            Error::NotFound(format!("token {token_id} in contract {contract_address}"))
        })?;
        Ok(entry.nft)
    }
}

/// Derives the canonical collections-v1 URN of a legacy NFT from its
/// image URL path. The path embeds the collection and wearable names
/// between known fragments; anything else yields `None`.
pub fn legacy_urn_from_image(image: &str) -> Option<String> {
    let (_, after_collections) = image.split_once("/collections/")?;
    let (collection, after_wearables) = after_collections.split_once("/wearables/")?;
    let name = after_wearables.split('/').next()?;
    if collection.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!(
        "urn:decentraland:ethereum:collections-v1:{collection}:{name}"
    ))
}
