// File: wearview-common/src/models/wearable.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::category::{BodyShape, HideableCategory, WearableCategory};

/// Rarity tier of a collection item. Base-avatar wearables carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Unique,
    Exotic,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
            Rarity::Unique => "unique",
            Rarity::Exotic => "exotic",
        }
    }

    /// (light, dark) pair for the radial background gradient.
    pub fn gradient(&self) -> (&'static str, &'static str) {
        match self {
            Rarity::Common => ("#d4e0e0", "#abc1c1"),
            Rarity::Uncommon => ("#ff8563", "#ed6d4f"),
            Rarity::Rare => ("#3ad682", "#36cf75"),
            Rarity::Epic => ("#6397f2", "#3d85e6"),
            Rarity::Legendary => ("#b262ff", "#842dda"),
            Rarity::Mythic => ("#ff63e1", "#fb7de3"),
            Rarity::Unique => ("#ffe617", "#ffb626"),
            Rarity::Exotic => ("#d4ff2a", "#83eb19"),
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "common" => Ok(Rarity::Common),
            "uncommon" => Ok(Rarity::Uncommon),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            "mythic" => Ok(Rarity::Mythic),
            "unique" => Ok(Rarity::Unique),
            "exotic" => Ok(Rarity::Exotic),
            _ => Err(format!("Unknown rarity: {}", s)),
        }
    }
}

impl Serialize for Rarity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Rarity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationContent {
    pub key: String,
    pub url: String,
}

/// Body-shape-specific asset bundle of a wearable or emote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Representation {
    pub body_shapes: Vec<BodyShape>,
    pub main_file: String,
    #[serde(default)]
    pub contents: Vec<RepresentationContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub override_hides: Vec<HideableCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub override_replaces: Vec<HideableCategory>,
}

impl Representation {
    pub fn supports(&self, shape: BodyShape) -> bool {
        self.body_shapes.contains(&shape)
    }

    /// Image-only representations have no mesh to assemble.
    pub fn is_texture(&self) -> bool {
        self.main_file.ends_with(".png")
    }

    pub fn content_url(&self, key: &str) -> Option<&str> {
        self.contents
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WearableData {
    pub category: WearableCategory,
    #[serde(default)]
    pub hides: Vec<HideableCategory>,
    #[serde(default)]
    pub replaces: Vec<HideableCategory>,
    pub representations: Vec<Representation>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Catalog wearable as served by the lambdas collections endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearableDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    pub data: WearableData,
}

impl WearableDefinition {
    pub fn category(&self) -> WearableCategory {
        self.data.category
    }

    /// The representation applicable to `shape`, if the wearable carries one.
    pub fn representation_for(&self, shape: BodyShape) -> Option<&Representation> {
        self.data.representations.iter().find(|r| r.supports(shape))
    }

    /// First body shape the wearable supports, used as a body-shape hint
    /// when neither options nor profile pin one.
    pub fn first_supported_shape(&self) -> Option<BodyShape> {
        self.data
            .representations
            .first()
            .and_then(|r| r.body_shapes.first().copied())
    }

    /// Representation-level overrides win over the wearable-level list
    /// when present.
    pub fn hides_for<'a>(&'a self, representation: &'a Representation) -> &'a [HideableCategory] {
        if representation.override_hides.is_empty() {
            &self.data.hides
        } else {
            &representation.override_hides
        }
    }

    pub fn replaces_for<'a>(&'a self, representation: &'a Representation) -> &'a [HideableCategory] {
        if representation.override_replaces.is_empty() {
            &self.data.replaces
        } else {
            &representation.override_replaces
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoteData {
    #[serde(rename = "loop")]
    pub loops: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub representations: Vec<Representation>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Catalog emote. Same envelope as a wearable but carries animation
/// metadata instead of slot data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmoteDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    #[serde(rename = "emoteDataADR74")]
    pub emote_data: EmoteData,
}

impl EmoteDefinition {
    pub fn representation_for(&self, shape: BodyShape) -> Option<&Representation> {
        self.emote_data
            .representations
            .iter()
            .find(|r| r.supports(shape))
    }
}

/// A catalog entry is either a wearable or an emote. The variant is fixed
/// once at parse time by presence of the emote-data field.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItem {
    Wearable(WearableDefinition),
    Emote(EmoteDefinition),
}

impl CatalogItem {
    pub fn id(&self) -> &str {
        match self {
            CatalogItem::Wearable(w) => &w.id,
            CatalogItem::Emote(e) => &e.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogItem::Wearable(w) => &w.name,
            CatalogItem::Emote(e) => &e.name,
        }
    }

    pub fn thumbnail(&self) -> Option<&str> {
        match self {
            CatalogItem::Wearable(w) => w.thumbnail.as_deref(),
            CatalogItem::Emote(e) => e.thumbnail.as_deref(),
        }
    }

    pub fn rarity(&self) -> Option<Rarity> {
        match self {
            CatalogItem::Wearable(w) => w.rarity,
            CatalogItem::Emote(e) => e.rarity,
        }
    }

    pub fn is_emote(&self) -> bool {
        matches!(self, CatalogItem::Emote(_))
    }

    pub fn as_wearable(&self) -> Option<&WearableDefinition> {
        match self {
            CatalogItem::Wearable(w) => Some(w),
            CatalogItem::Emote(_) => None,
        }
    }

    pub fn as_emote(&self) -> Option<&EmoteDefinition> {
        match self {
            CatalogItem::Wearable(_) => None,
            CatalogItem::Emote(e) => Some(e),
        }
    }
}

impl Serialize for CatalogItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CatalogItem::Wearable(w) => w.serialize(serializer),
            CatalogItem::Emote(e) => e.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CatalogItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawItem {
            id: String,
            #[serde(default)]
            name: String,
            #[serde(default)]
            description: String,
            #[serde(default)]
            thumbnail: Option<String>,
            #[serde(default)]
            rarity: Option<Rarity>,
            #[serde(default)]
            data: Option<WearableData>,
            #[serde(rename = "emoteDataADR74", default)]
            emote_data: Option<EmoteData>,
        }

        let raw = RawItem::deserialize(deserializer)?;
        if let Some(emote_data) = raw.emote_data {
            return Ok(CatalogItem::Emote(EmoteDefinition {
                id: raw.id,
                name: raw.name,
                description: raw.description,
                thumbnail: raw.thumbnail,
                rarity: raw.rarity,
                emote_data,
            }));
        }
        let data = raw
            .data
            .ok_or_else(|| serde::de::Error::custom("catalog item has neither wearable nor emote data"))?;
        Ok(CatalogItem::Wearable(WearableDefinition {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            thumbnail: raw.thumbnail,
            rarity: raw.rarity,
            data,
        }))
    }
}
