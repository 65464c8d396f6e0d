// File: wearview-core/src/resolver/mod.rs
//
// Configuration Resolver: orchestrates remote fetches and the slot
// engine to turn one options snapshot into one immutable PreviewConfig.

pub mod defaults;
pub mod slots;

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use tracing::{debug, warn};

use wearview_common::Error;
use wearview_common::models::color::{
    Color3, DEFAULT_EYE_COLOR, DEFAULT_HAIR_COLOR, DEFAULT_SKIN_COLOR, normalize_hex,
};
use wearview_common::models::preview::DEFAULT_GRADIENT;
use wearview_common::models::{
    Background, BodyShape, CatalogItem, PreviewConfig, PreviewEmote, PreviewOptions, PreviewType,
    Profile, WearableCategory, WearableDefinition,
};

use crate::cache::ProfileCache;
use crate::clients::{Clients, FetchPolicy};
use crate::options::DEFAULT_PROFILE;

pub use defaults::{REQUIRED_CATEGORIES, default_urn};
pub use slots::{BODY_PART_CATEGORIES, SlotMap, resolve_slots};

/// Builds `PreviewConfig` snapshots. Owns the profile memoization cache,
/// so isolated resolvers have isolated caches.
pub struct ConfigResolver {
    policy: FetchPolicy,
    profiles: ProfileCache,
}

impl ConfigResolver {
    pub fn new(policy: FetchPolicy) -> Self {
        Self {
            policy,
            profiles: ProfileCache::new(),
        }
    }

    /// The profile cache backing this resolver. Exposed for explicit
    /// resets; resolution itself manages it internally.
    pub fn profiles(&self) -> &ProfileCache {
        &self.profiles
    }

    /// Resolves `options` into a config snapshot. Side-effect-free apart
    /// from network fetches and the profile cache.
    pub async fn create_config(&self, options: &PreviewOptions) -> Result<PreviewConfig, Error> {
        let clients = Clients::from_options(options, self.policy.clone())?;

        // 1) The featured item and the profile resolve concurrently. A
        //    featured failure is fatal; a profile failure degrades to None
        //    inside the cache.
        let (featured, profile) = tokio::join!(
            self.resolve_featured(&clients, options),
            self.resolve_profile(&clients, options),
        );
        let featured = featured?;

        // 2) Body shape: explicit option > profile > featured hint > MALE.
        let body_shape = derive_body_shape(options, profile.as_deref(), featured.as_ref());

        // 3) The three avatar colors derive independently.
        let avatar = profile.as_deref().and_then(|p| p.avatar());
        let skin = derive_color(options.skin.as_deref(), avatar.map(|a| a.skin.color), DEFAULT_SKIN_COLOR);
        let hair = derive_color(options.hair.as_deref(), avatar.map(|a| a.hair.color), DEFAULT_HAIR_COLOR);
        let eyes = derive_color(options.eyes.as_deref(), avatar.map(|a| a.eyes.color), DEFAULT_EYE_COLOR);

        // 4) Render type: anything implying a full avatar forces the
        //    avatar pipeline; otherwise a lone featured item previews as
        //    itself (texture or mesh).
        let has_explicit_items = options.urns.as_ref().is_some_and(|v| !v.is_empty())
            || options.urls.as_ref().is_some_and(|v| !v.is_empty())
            || options.base64s.as_ref().is_some_and(|v| !v.is_empty());
        let profile_is_sentinel = options.profile.as_deref() == Some(DEFAULT_PROFILE);
        let featured_is_emote = featured.as_ref().is_some_and(|f| f.is_emote());
        let is_avatar =
            profile.is_some() || profile_is_sentinel || has_explicit_items || featured_is_emote;

        // 5) Avatar assembly (fetch, slot resolution, default backfill) or
        //    single-item preview.
        let (preview_type, wearables) = if is_avatar {
            let wearables = self
                .assemble_avatar(&clients, options, profile.as_deref(), featured.as_ref(), body_shape)
                .await?;
            (PreviewType::Avatar, wearables)
        } else {
            let preview_type = match featured.as_ref().and_then(|f| f.as_wearable()) {
                Some(wearable) => {
                    let rep = wearable
                        .representation_for(body_shape)
                        .or_else(|| wearable.data.representations.first())
                        .ok_or_else(|| Error::MissingRepresentation {
                            urn: wearable.id.clone(),
                            body_shape,
                        })?;
                    if rep.is_texture() {
                        PreviewType::Texture
                    } else {
                        PreviewType::Wearable
                    }
                }
                None => PreviewType::Wearable,
            };
            (preview_type, vec![])
        };

        // 6) Zoom: explicit option > avatar default > per-category
        //    heuristic for a single featured wearable.
        let zoom = match options.zoom {
            Some(zoom) => zoom,
            None if is_avatar => 1.75,
            None => match featured.as_ref().and_then(|f| f.as_wearable()).map(|w| w.category()) {
                Some(WearableCategory::UpperBody) => 2.0,
                Some(WearableCategory::Skin) => 1.75,
                _ => 1.25,
            },
        };

        // 7) Background: rarity gradient plus thumbnail when featured,
        //    fixed default gradient otherwise. Transparency suppresses the
        //    gradient.
        let transparent = options.transparent_background.unwrap_or(false);
        let (light, dark) = featured
            .as_ref()
            .and_then(|f| f.rarity())
            .map(|r| r.gradient())
            .unwrap_or(DEFAULT_GRADIENT);
        let color = options
            .background
            .as_deref()
            .and_then(normalize_hex)
            .unwrap_or_else(|| dark.to_string());
        let gradient = (!transparent).then(|| (light.to_string(), dark.to_string()));
        let image = featured.as_ref().and_then(|f| f.thumbnail()).map(String::from);
        let background = Background {
            color,
            gradient,
            image,
            transparent,
        };

        // 8) Assemble the immutable snapshot.
        let emote = options
            .emote
            .or(if is_avatar { Some(PreviewEmote::Idle) } else { None });
        Ok(PreviewConfig {
            wearables,
            item: featured,
            body_shape,
            skin,
            hair,
            eyes,
            preview_type,
            background,
            emote,
            camera: options.camera.unwrap_or_default(),
            projection: options.projection.unwrap_or_default(),
            zoom,
            offset_x: options.offset_x.unwrap_or(0.0),
            offset_y: options.offset_y.unwrap_or(0.0),
            offset_z: options.offset_z.unwrap_or(0.0),
        })
    }

    async fn resolve_featured(
        &self,
        clients: &Clients,
        options: &PreviewOptions,
    ) -> Result<Option<CatalogItem>, Error> {
        let Some(contract) = options.contract_address.as_deref() else {
            return Ok(None);
        };
        let item = clients
            .fetch_item_from_contract(contract, options.token_id.as_deref(), options.item_id.as_deref())
            .await?;
        Ok(Some(item))
    }

    /// The literal default-profile sentinel never hits the network; it
    /// means "random default body" and resolves through backfill alone.
    async fn resolve_profile(
        &self,
        clients: &Clients,
        options: &PreviewOptions,
    ) -> Option<Arc<Profile>> {
        let id = options.profile.as_deref()?;
        if id == DEFAULT_PROFILE {
            return None;
        }
        self.profiles
            .get_or_fetch(id, || clients.peer.fetch_profile(id))
            .await
    }

    /// Runs the avatar pipeline: merge profile URNs with explicit
    /// URN/URL/base64 inputs, fetch them, backfill required categories
    /// from the defaults table in one batch, and resolve slots.
    async fn assemble_avatar(
        &self,
        clients: &Clients,
        options: &PreviewOptions,
        profile: Option<&Profile>,
        featured: Option<&CatalogItem>,
        shape: BodyShape,
    ) -> Result<Vec<WearableDefinition>, Error> {
        // Profile wearables first, explicit overrides after; later
        // entries win their slots.
        let mut requested: Vec<String> = Vec::new();
        if let Some(avatar) = profile.and_then(|p| p.avatar()) {
            requested.extend(avatar.wearables.iter().cloned());
        }
        if let Some(urns) = &options.urns {
            requested.extend(urns.iter().cloned());
        }

        let fetched = clients.peer.fetch_wearables(&requested).await?;
        let by_id: HashMap<&str, &CatalogItem> =
            fetched.iter().map(|item| (item.id(), item)).collect();
        let mut candidates: Vec<CatalogItem> = Vec::new();
        for urn in &requested {
            match by_id.get(urn.as_str()) {
                Some(item) => candidates.push((*item).clone()),
                None => debug!("URN {urn} absent from catalog response"),
            }
        }

        if let Some(urls) = &options.urls {
            for url in urls {
                candidates.push(clients.fetch_item_url(url).await?);
            }
        }

        // Inline base64 definitions; a bad blob is skipped, not fatal.
        if let Some(base64s) = &options.base64s {
            for blob in base64s {
                match decode_base64_item(blob) {
                    Ok(item) => candidates.push(item),
                    Err(e) => warn!("Skipping undecodable base64 wearable => {e}"),
                }
            }
        }

        // Default-category backfill: one batched fetch for every required
        // category the merged candidate set leaves unoccupied. A default
        // the catalog cannot supply is fatal.
        let mut defaults_needed: Vec<(WearableCategory, String)> = Vec::new();
        for category in REQUIRED_CATEGORIES {
            let occupied = candidates
                .iter()
                .chain(featured)
                .filter_map(|c| c.as_wearable())
                .any(|w| w.category() == category && w.representation_for(shape).is_some());
            if !occupied {
                let urn = default_urn(shape, category).ok_or_else(|| {
                    Error::Configuration(format!("No default wearable for category {category}"))
                })?;
                defaults_needed.push((category, urn));
            }
        }
        if !defaults_needed.is_empty() {
            let urns: Vec<String> = defaults_needed.iter().map(|(_, urn)| urn.clone()).collect();
            debug!("Backfilling {} default categories", urns.len());
            let fetched = clients.peer.fetch_wearables(&urns).await?;
            for (category, urn) in &defaults_needed {
                let Some(item) = fetched.iter().find(|item| item.id() == urn) else {
                    return Err(Error::NotFound(format!(
                        "default wearable {urn} for category {category}"
                    )));
                };
                candidates.push(item.clone());
            }
        }

        let slots = resolve_slots(shape, &candidates, featured);
        Ok(slots.into_wearables())
    }
}

fn derive_body_shape(
    options: &PreviewOptions,
    profile: Option<&Profile>,
    featured: Option<&CatalogItem>,
) -> BodyShape {
    if let Some(shape) = options.body_shape {
        return shape;
    }
    if let Some(shape) = profile.and_then(|p| p.avatar()).and_then(|a| a.body_shape()) {
        return shape;
    }
    if let Some(shape) = featured
        .and_then(|f| f.as_wearable())
        .and_then(|w| w.first_supported_shape())
    {
        return shape;
    }
    BodyShape::Male
}

fn derive_color(explicit: Option<&str>, profile_color: Option<Color3>, fallback: &str) -> String {
    if let Some(hex) = explicit.and_then(normalize_hex) {
        return hex;
    }
    if let Some(color) = profile_color {
        return color.to_hex();
    }
    fallback.to_string()
}

fn decode_base64_item(blob: &str) -> Result<CatalogItem, Error> {
    let bytes = match STANDARD.decode(blob) {
        Ok(bytes) => bytes,
        Err(_) => URL_SAFE.decode(blob)?,
    };
    let item: CatalogItem = serde_json::from_slice(&bytes)?;
    Ok(item)
}
