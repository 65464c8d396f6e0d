// File: wearview-common/src/models/preview.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::category::BodyShape;
use crate::models::wearable::{CatalogItem, WearableDefinition};

/// Remote service environment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PreviewEnv {
    #[default]
    Prod,
    Dev,
}

impl PreviewEnv {
    pub fn peer_url(&self) -> &'static str {
        match self {
            PreviewEnv::Prod => "https://peer.decentraland.org",
            PreviewEnv::Dev => "https://peer.decentraland.zone",
        }
    }

    pub fn nft_server_url(&self) -> &'static str {
        match self {
            PreviewEnv::Prod => "https://nft-api.decentraland.org",
            PreviewEnv::Dev => "https://nft-api.decentraland.zone",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewEnv::Prod => "prod",
            PreviewEnv::Dev => "dev",
        }
    }
}

impl fmt::Display for PreviewEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreviewEnv {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prod" => Ok(PreviewEnv::Prod),
            "dev" => Ok(PreviewEnv::Dev),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

impl Serialize for PreviewEnv {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PreviewEnv {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PreviewCamera {
    #[default]
    Interactive,
    Static,
}

impl PreviewCamera {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewCamera::Interactive => "interactive",
            PreviewCamera::Static => "static",
        }
    }
}

impl fmt::Display for PreviewCamera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreviewCamera {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interactive" => Ok(PreviewCamera::Interactive),
            "static" => Ok(PreviewCamera::Static),
            _ => Err(format!("Unknown camera mode: {}", s)),
        }
    }
}

impl Serialize for PreviewCamera {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PreviewCamera {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PreviewProjection {
    #[default]
    Perspective,
    Orthographic,
}

impl PreviewProjection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewProjection::Perspective => "perspective",
            PreviewProjection::Orthographic => "orthographic",
        }
    }
}

impl fmt::Display for PreviewProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreviewProjection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "perspective" => Ok(PreviewProjection::Perspective),
            "orthographic" => Ok(PreviewProjection::Orthographic),
            _ => Err(format!("Unknown projection: {}", s)),
        }
    }
}

impl Serialize for PreviewProjection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PreviewProjection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Built-in emote clips selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewEmote {
    Idle,
    Clap,
    Dab,
    Dance,
    Fashion,
    Fashion2,
    Fashion3,
    Fashion4,
    Jump,
    Kiss,
    Money,
    Run,
    Walk,
}

impl PreviewEmote {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewEmote::Idle => "idle",
            PreviewEmote::Clap => "clap",
            PreviewEmote::Dab => "dab",
            PreviewEmote::Dance => "dance",
            PreviewEmote::Fashion => "fashion",
            PreviewEmote::Fashion2 => "fashion-2",
            PreviewEmote::Fashion3 => "fashion-3",
            PreviewEmote::Fashion4 => "fashion-4",
            PreviewEmote::Jump => "jump",
            PreviewEmote::Kiss => "kiss",
            PreviewEmote::Money => "money",
            PreviewEmote::Run => "run",
            PreviewEmote::Walk => "walk",
        }
    }

    /// Emotes that loop by default; the rest play once and end.
    pub fn loops(&self) -> bool {
        matches!(
            self,
            PreviewEmote::Idle | PreviewEmote::Money | PreviewEmote::Clap
        )
    }
}

impl fmt::Display for PreviewEmote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreviewEmote {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(PreviewEmote::Idle),
            "clap" => Ok(PreviewEmote::Clap),
            "dab" => Ok(PreviewEmote::Dab),
            "dance" => Ok(PreviewEmote::Dance),
            "fashion" => Ok(PreviewEmote::Fashion),
            "fashion-2" => Ok(PreviewEmote::Fashion2),
            "fashion-3" => Ok(PreviewEmote::Fashion3),
            "fashion-4" => Ok(PreviewEmote::Fashion4),
            "jump" => Ok(PreviewEmote::Jump),
            "kiss" => Ok(PreviewEmote::Kiss),
            "money" => Ok(PreviewEmote::Money),
            "run" => Ok(PreviewEmote::Run),
            "walk" => Ok(PreviewEmote::Walk),
            _ => Err(format!("Unknown emote: {}", s)),
        }
    }
}

impl Serialize for PreviewEmote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PreviewEmote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What kind of content the resolved preview shows. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewType {
    Texture,
    Wearable,
    Avatar,
}

impl PreviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewType::Texture => "texture",
            PreviewType::Wearable => "wearable",
            PreviewType::Avatar => "avatar",
        }
    }
}

impl fmt::Display for PreviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for PreviewType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PreviewType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "texture" => Ok(PreviewType::Texture),
            "wearable" => Ok(PreviewType::Wearable),
            "avatar" => Ok(PreviewType::Avatar),
            other => Err(serde::de::Error::custom(format!(
                "Unknown preview type: {}",
                other
            ))),
        }
    }
}

/// Raw input surface. Every field optional; absence means "use the
/// resolved default."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOptions {
    pub contract_address: Option<String>,
    pub token_id: Option<String>,
    pub item_id: Option<String>,
    pub profile: Option<String>,
    pub urns: Option<Vec<String>>,
    pub urls: Option<Vec<String>>,
    pub base64s: Option<Vec<String>>,
    pub skin: Option<String>,
    pub hair: Option<String>,
    pub eyes: Option<String>,
    pub body_shape: Option<BodyShape>,
    pub emote: Option<PreviewEmote>,
    pub camera: Option<PreviewCamera>,
    pub projection: Option<PreviewProjection>,
    pub zoom: Option<f64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub offset_z: Option<f64>,
    pub background: Option<String>,
    pub transparent_background: Option<bool>,
    pub env: Option<PreviewEnv>,
    pub peer_url: Option<String>,
    pub nft_server_url: Option<String>,
}

impl PreviewOptions {
    pub fn peer_url(&self) -> String {
        match &self.peer_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.env.unwrap_or_default().peer_url().to_string(),
        }
    }

    pub fn nft_server_url(&self) -> String {
        match &self.nft_server_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.env.unwrap_or_default().nft_server_url().to_string(),
        }
    }
}

/// Fallback gradient used when no featured wearable supplies a rarity.
pub const DEFAULT_GRADIENT: (&str, &str) = ("#676370", "#18141a");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub transparent: bool,
}

/// Fully resolved, immutable rendering instruction set. Superseded, never
/// mutated, when options change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewConfig {
    pub wearables: Vec<WearableDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<CatalogItem>,
    pub body_shape: BodyShape,
    pub skin: String,
    pub hair: String,
    pub eyes: String,
    #[serde(rename = "type")]
    pub preview_type: PreviewType,
    pub background: Background,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emote: Option<PreviewEmote>,
    pub camera: PreviewCamera,
    pub projection: PreviewProjection,
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_urls() {
        assert_eq!(PreviewEnv::Prod.peer_url(), "https://peer.decentraland.org");
        assert_eq!(
            PreviewEnv::Dev.nft_server_url(),
            "https://nft-api.decentraland.zone"
        );
    }

    #[test]
    fn test_options_url_overrides() {
        let mut options = PreviewOptions::default();
        assert_eq!(options.peer_url(), "https://peer.decentraland.org");
        options.env = Some(PreviewEnv::Dev);
        assert_eq!(options.peer_url(), "https://peer.decentraland.zone");
        options.peer_url = Some("http://localhost:7777/".to_string());
        assert_eq!(options.peer_url(), "http://localhost:7777");
    }

    #[test]
    fn test_emote_wire_names() {
        assert_eq!(PreviewEmote::Fashion2.as_str(), "fashion-2");
        assert_eq!("fashion-4".parse::<PreviewEmote>(), Ok(PreviewEmote::Fashion4));
        assert!(PreviewEmote::Idle.loops());
        assert!(!PreviewEmote::Dance.loops());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let json = r#"{
            "contractAddress": "0xabc",
            "itemId": "1",
            "bodyShape": "female",
            "transparentBackground": true,
            "offsetX": 0.5
        }"#;
        let options: PreviewOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.contract_address.as_deref(), Some("0xabc"));
        assert_eq!(options.body_shape, Some(BodyShape::Female));
        assert_eq!(options.transparent_background, Some(true));
        assert_eq!(options.offset_x, Some(0.5));
        assert!(options.urns.is_none());
    }
}
