// File: wearview-core/src/options/mod.rs
//
// Options/Override Merge Layer: a base options record parsed once from
// the URL query string, a live override record replaced wholesale on each
// update message, and the merged view of the two.

pub mod query;

use std::collections::HashSet;

use rand::Rng;

use wearview_common::models::PreviewOptions;

pub use query::{parse_query, parse_zoom};

/// Profile sentinel meaning "use a random default avatar".
pub const DEFAULT_PROFILE: &str = "default";

/// The peer service hosts this many numbered default profiles.
const DEFAULT_PROFILE_POOL: u32 = 160;

/// Option keys that override messages can carry, used for per-key source
/// tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    ContractAddress,
    TokenId,
    ItemId,
    Profile,
    Urns,
    Urls,
    Base64s,
    Skin,
    Hair,
    Eyes,
    BodyShape,
    Emote,
    Camera,
    Projection,
    Zoom,
    OffsetX,
    OffsetY,
    OffsetZ,
    Background,
    TransparentBackground,
    Env,
    PeerUrl,
    NftServerUrl,
}

fn draw_default_profile() -> String {
    let n = rand::rng().random_range(1..=DEFAULT_PROFILE_POOL);
    format!("{DEFAULT_PROFILE}{n}")
}

fn present_keys(options: &PreviewOptions) -> HashSet<OptionKey> {
    let mut keys = HashSet::new();
    macro_rules! track {
        ($field:ident, $key:ident) => {
            if options.$field.is_some() {
                keys.insert(OptionKey::$key);
            }
        };
    }
    track!(contract_address, ContractAddress);
    track!(token_id, TokenId);
    track!(item_id, ItemId);
    track!(profile, Profile);
    track!(urns, Urns);
    track!(urls, Urls);
    track!(base64s, Base64s);
    track!(skin, Skin);
    track!(hair, Hair);
    track!(eyes, Eyes);
    track!(body_shape, BodyShape);
    track!(emote, Emote);
    track!(camera, Camera);
    track!(projection, Projection);
    track!(zoom, Zoom);
    track!(offset_x, OffsetX);
    track!(offset_y, OffsetY);
    track!(offset_z, OffsetZ);
    track!(background, Background);
    track!(transparent_background, TransparentBackground);
    track!(env, Env);
    track!(peer_url, PeerUrl);
    track!(nft_server_url, NftServerUrl);
    keys
}

/// Overlays every set key of `overrides` onto `base`. Unset keys leave
/// the base value in place; there is no way to clear a base value.
fn merge(base: &PreviewOptions, overrides: &PreviewOptions) -> PreviewOptions {
    macro_rules! pick {
        ($field:ident) => {
            overrides.$field.clone().or_else(|| base.$field.clone())
        };
    }
    PreviewOptions {
        contract_address: pick!(contract_address),
        token_id: pick!(token_id),
        item_id: pick!(item_id),
        profile: pick!(profile),
        urns: pick!(urns),
        urls: pick!(urls),
        base64s: pick!(base64s),
        skin: pick!(skin),
        hair: pick!(hair),
        eyes: pick!(eyes),
        body_shape: overrides.body_shape.or(base.body_shape),
        emote: overrides.emote.or(base.emote),
        camera: overrides.camera.or(base.camera),
        projection: overrides.projection.or(base.projection),
        zoom: overrides.zoom.or(base.zoom),
        offset_x: overrides.offset_x.or(base.offset_x),
        offset_y: overrides.offset_y.or(base.offset_y),
        offset_z: overrides.offset_z.or(base.offset_z),
        background: pick!(background),
        transparent_background: overrides.transparent_background.or(base.transparent_background),
        env: overrides.env.or(base.env),
        peer_url: pick!(peer_url),
        nft_server_url: pick!(nft_server_url),
    }
}

/// Live options state for one preview session.
///
/// The base record is fixed at construction; each update message replaces
/// the override record wholesale. The "default" profile sentinel expands
/// to a randomly drawn numbered default profile, redrawn only when an
/// update explicitly re-sets the sentinel - a merely persisted sentinel
/// keeps the previous draw.
pub struct OptionsState {
    base: PreviewOptions,
    overrides: PreviewOptions,
    overridden: HashSet<OptionKey>,
    sticky_default_profile: Option<String>,
}

impl OptionsState {
    pub fn new(base: PreviewOptions) -> Self {
        let sticky_default_profile = if base.profile.as_deref() == Some(DEFAULT_PROFILE) {
            Some(draw_default_profile())
        } else {
            None
        };
        Self {
            base,
            overrides: PreviewOptions::default(),
            overridden: HashSet::new(),
            sticky_default_profile,
        }
    }

    pub fn from_query(query: &str) -> Self {
        Self::new(parse_query(query))
    }

    pub fn base(&self) -> &PreviewOptions {
        &self.base
    }

    /// Whether the current effective value of `key` came from an override
    /// message rather than the base options.
    pub fn is_overridden(&self, key: OptionKey) -> bool {
        self.overridden.contains(&key)
    }

    /// Replaces the override record wholesale with `update`.
    pub fn apply_update(&mut self, update: PreviewOptions) {
        // An explicit re-set of the sentinel draws a fresh numbered
        // profile; anything else keeps the previous draw.
        if update.profile.as_deref() == Some(DEFAULT_PROFILE) {
            self.sticky_default_profile = Some(draw_default_profile());
        }
        self.overridden = present_keys(&update);
        self.overrides = update;
    }

    /// The effective options: overrides overlaid on the base, with the
    /// profile sentinel expanded to the sticky numbered draw.
    pub fn merged(&self) -> PreviewOptions {
        let mut merged = merge(&self.base, &self.overrides);
        if merged.profile.as_deref() == Some(DEFAULT_PROFILE) {
            if let Some(sticky) = &self.sticky_default_profile {
                merged.profile = Some(sticky.clone());
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_replaces_overrides_wholesale() {
        let mut state = OptionsState::new(PreviewOptions {
            skin: Some("111111".to_string()),
            ..Default::default()
        });

        state.apply_update(PreviewOptions {
            skin: Some("222222".to_string()),
            ..Default::default()
        });
        assert_eq!(state.merged().skin.as_deref(), Some("222222"));
        assert!(state.is_overridden(OptionKey::Skin));

        // A second update without `skin` drops the previous override.
        state.apply_update(PreviewOptions {
            hair: Some("333333".to_string()),
            ..Default::default()
        });
        assert_eq!(state.merged().skin.as_deref(), Some("111111"));
        assert_eq!(state.merged().hair.as_deref(), Some("333333"));
        assert!(!state.is_overridden(OptionKey::Skin));
        assert!(state.is_overridden(OptionKey::Hair));
    }

    #[test]
    fn test_absent_override_never_clears() {
        let mut state = OptionsState::new(PreviewOptions {
            profile: Some("alice".to_string()),
            ..Default::default()
        });
        // JSON `null` and an absent key both deserialize to None, so
        // neither can clear the base value.
        let update: PreviewOptions = serde_json::from_str(r#"{"profile": null}"#).unwrap();
        state.apply_update(update);
        assert_eq!(state.merged().profile.as_deref(), Some("alice"));
        assert!(!state.is_overridden(OptionKey::Profile));
    }

    #[test]
    fn test_default_profile_drawn_once() {
        let state = OptionsState::new(PreviewOptions {
            profile: Some(DEFAULT_PROFILE.to_string()),
            ..Default::default()
        });
        let first = state.merged().profile.unwrap();
        let second = state.merged().profile.unwrap();
        assert_eq!(first, second);
        let n: u32 = first.strip_prefix(DEFAULT_PROFILE).unwrap().parse().unwrap();
        assert!((1..=DEFAULT_PROFILE_POOL).contains(&n));
    }

    #[test]
    fn test_persisted_sentinel_keeps_draw() {
        let mut state = OptionsState::new(PreviewOptions {
            profile: Some(DEFAULT_PROFILE.to_string()),
            ..Default::default()
        });
        let before = state.merged().profile.unwrap();
        // Updates that do not touch the profile keep the same draw.
        state.apply_update(PreviewOptions {
            hair: Some("ff0000".to_string()),
            ..Default::default()
        });
        assert_eq!(state.merged().profile.unwrap(), before);
    }

    #[test]
    fn test_explicit_sentinel_redraws() {
        let mut state = OptionsState::new(PreviewOptions {
            profile: Some(DEFAULT_PROFILE.to_string()),
            ..Default::default()
        });
        let before = state.merged().profile.unwrap();
        // Redraws are random; over 30 explicit re-sets at least one must
        // land on a different profile.
        let mut changed = false;
        for _ in 0..30 {
            state.apply_update(PreviewOptions {
                profile: Some(DEFAULT_PROFILE.to_string()),
                ..Default::default()
            });
            if state.merged().profile.unwrap() != before {
                changed = true;
                break;
            }
        }
        assert!(changed);
    }

    #[test]
    fn test_explicit_profile_override_wins() {
        let mut state = OptionsState::new(PreviewOptions {
            profile: Some(DEFAULT_PROFILE.to_string()),
            ..Default::default()
        });
        state.apply_update(PreviewOptions {
            profile: Some("0xbeef".to_string()),
            ..Default::default()
        });
        assert_eq!(state.merged().profile.as_deref(), Some("0xbeef"));
        assert!(state.is_overridden(OptionKey::Profile));
    }
}
