// File: wearview-core/src/resolver/defaults.rs
//
// Static default-wearable table used to backfill empty required slots
// when assembling a full avatar.

use wearview_common::models::{BodyShape, WearableCategory};

const BASE_AVATAR_PREFIX: &str = "urn:decentraland:off-chain:base-avatars:";

/// Categories that must be occupied for a full avatar to render. The set
/// is currently identical for both body shapes.
pub const REQUIRED_CATEGORIES: [WearableCategory; 7] = [
    WearableCategory::Eyebrows,
    WearableCategory::Mouth,
    WearableCategory::Eyes,
    WearableCategory::Hair,
    WearableCategory::UpperBody,
    WearableCategory::LowerBody,
    WearableCategory::Feet,
];

/// Default base-avatar URN for a category+shape pair. `None` for
/// categories that have no default (not every slot is required).
pub fn default_urn(shape: BodyShape, category: WearableCategory) -> Option<String> {
    let name = match (shape, category) {
        (BodyShape::Male, WearableCategory::Eyebrows) => "eyebrows_00",
        (BodyShape::Male, WearableCategory::Mouth) => "mouth_00",
        (BodyShape::Male, WearableCategory::Eyes) => "eyes_00",
        (BodyShape::Male, WearableCategory::Hair) => "casual_hair_01",
        (BodyShape::Male, WearableCategory::UpperBody) => "green_hoodie",
        (BodyShape::Male, WearableCategory::LowerBody) => "brown_pants",
        (BodyShape::Male, WearableCategory::Feet) => "sneakers",
        (BodyShape::Female, WearableCategory::Eyebrows) => "f_eyebrows_00",
        (BodyShape::Female, WearableCategory::Mouth) => "f_mouth_00",
        (BodyShape::Female, WearableCategory::Eyes) => "f_eyes_00",
        (BodyShape::Female, WearableCategory::Hair) => "standard_hair",
        (BodyShape::Female, WearableCategory::UpperBody) => "f_sweater",
        (BodyShape::Female, WearableCategory::LowerBody) => "f_jeans",
        (BodyShape::Female, WearableCategory::Feet) => "bun_shoes",
        _ => return None,
    };
    Some(format!("{BASE_AVATAR_PREFIX}{name}"))
}
