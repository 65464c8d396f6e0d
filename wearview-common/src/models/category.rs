// File: wearview-common/src/models/category.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Slot categories a wearable can occupy. Exactly one wearable per category
/// survives slot resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WearableCategory {
    BodyShape,
    Earring,
    Eyebrows,
    Eyes,
    Eyewear,
    FacialHair,
    Feet,
    Hair,
    HandsWear,
    Hat,
    Helmet,
    LowerBody,
    Mask,
    Mouth,
    Skin,
    Tiara,
    TopHead,
    UpperBody,
}

impl WearableCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WearableCategory::BodyShape => "body_shape",
            WearableCategory::Earring => "earring",
            WearableCategory::Eyebrows => "eyebrows",
            WearableCategory::Eyes => "eyes",
            WearableCategory::Eyewear => "eyewear",
            WearableCategory::FacialHair => "facial_hair",
            WearableCategory::Feet => "feet",
            WearableCategory::Hair => "hair",
            WearableCategory::HandsWear => "hands_wear",
            WearableCategory::Hat => "hat",
            WearableCategory::Helmet => "helmet",
            WearableCategory::LowerBody => "lower_body",
            WearableCategory::Mask => "mask",
            WearableCategory::Mouth => "mouth",
            WearableCategory::Skin => "skin",
            WearableCategory::Tiara => "tiara",
            WearableCategory::TopHead => "top_head",
            WearableCategory::UpperBody => "upper_body",
        }
    }
}

impl fmt::Display for WearableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WearableCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body_shape" => Ok(WearableCategory::BodyShape),
            "earring" => Ok(WearableCategory::Earring),
            "eyebrows" => Ok(WearableCategory::Eyebrows),
            "eyes" => Ok(WearableCategory::Eyes),
            "eyewear" => Ok(WearableCategory::Eyewear),
            "facial_hair" => Ok(WearableCategory::FacialHair),
            "feet" => Ok(WearableCategory::Feet),
            "hair" => Ok(WearableCategory::Hair),
            "hands_wear" => Ok(WearableCategory::HandsWear),
            "hat" => Ok(WearableCategory::Hat),
            "helmet" => Ok(WearableCategory::Helmet),
            "lower_body" => Ok(WearableCategory::LowerBody),
            "mask" => Ok(WearableCategory::Mask),
            "mouth" => Ok(WearableCategory::Mouth),
            "skin" => Ok(WearableCategory::Skin),
            "tiara" => Ok(WearableCategory::Tiara),
            "top_head" => Ok(WearableCategory::TopHead),
            "upper_body" => Ok(WearableCategory::UpperBody),
            _ => Err(format!("Unknown wearable category: {}", s)),
        }
    }
}

impl Serialize for WearableCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WearableCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Entries of a `hides`/`replaces` list. These may name plain slot
/// categories or whole body zones ("head", "hands") that are not slots
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HideableCategory {
    Wearable(WearableCategory),
    Head,
    Hands,
}

impl HideableCategory {
    /// The slot category this entry removes, if it maps to one.
    pub fn as_slot(&self) -> Option<WearableCategory> {
        match self {
            HideableCategory::Wearable(category) => Some(*category),
            HideableCategory::Head | HideableCategory::Hands => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HideableCategory::Wearable(category) => category.as_str(),
            HideableCategory::Head => "head",
            HideableCategory::Hands => "hands",
        }
    }
}

impl fmt::Display for HideableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HideableCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "head" => Ok(HideableCategory::Head),
            "hands" => Ok(HideableCategory::Hands),
            other => other.parse().map(HideableCategory::Wearable),
        }
    }
}

impl Serialize for HideableCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HideableCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// MALE/FEMALE skeletal variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BodyShape {
    #[default]
    Male,
    Female,
}

impl BodyShape {
    pub fn urn(&self) -> &'static str {
        match self {
            BodyShape::Male => "urn:decentraland:off-chain:base-avatars:BaseMale",
            BodyShape::Female => "urn:decentraland:off-chain:base-avatars:BaseFemale",
        }
    }

    /// Parses both the short query form ("male") and the full URN form.
    pub fn parse(s: &str) -> Option<BodyShape> {
        let lower = s.to_lowercase();
        if lower == "male" || lower.ends_with("basemale") {
            Some(BodyShape::Male)
        } else if lower == "female" || lower.ends_with("basefemale") {
            Some(BodyShape::Female)
        } else {
            None
        }
    }
}

impl fmt::Display for BodyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyShape::Male => write!(f, "male"),
            BodyShape::Female => write!(f, "female"),
        }
    }
}

impl Serialize for BodyShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.urn())
    }
}

impl<'de> Deserialize<'de> for BodyShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BodyShape::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Unknown body shape: {}", s)))
    }
}
