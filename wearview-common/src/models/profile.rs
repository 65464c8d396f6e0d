// File: wearview-common/src/models/profile.rs

use serde::{Deserialize, Serialize};

use crate::models::category::BodyShape;
use crate::models::color::WrappedColor;

/// Avatar snapshot URLs served alongside a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Snapshots {
    #[serde(default)]
    pub face256: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Saved avatar configuration inside a profile entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AvatarInfo {
    /// Raw body-shape URN as stored upstream. Parsed lazily so an
    /// unrecognized value degrades instead of failing the whole profile.
    #[serde(default)]
    pub body_shape: String,
    #[serde(default)]
    pub wearables: Vec<String>,
    #[serde(default)]
    pub eyes: WrappedColor,
    #[serde(default)]
    pub hair: WrappedColor,
    #[serde(default)]
    pub skin: WrappedColor,
    #[serde(default)]
    pub snapshots: Option<Snapshots>,
}

impl AvatarInfo {
    pub fn body_shape(&self) -> Option<BodyShape> {
        BodyShape::parse(&self.body_shape)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAvatar {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub eth_address: Option<String>,
    pub avatar: AvatarInfo,
}

/// A user's saved profile as returned by the lambdas profile endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    #[serde(default)]
    pub avatars: Vec<ProfileAvatar>,
}

impl Profile {
    /// The first avatar entry. Upstream serves at most one per profile
    /// in practice, but the schema allows a list.
    pub fn avatar(&self) -> Option<&AvatarInfo> {
        self.avatars.first().map(|a| &a.avatar)
    }
}
