// File: wearview-common/src/models/mod.rs

pub mod category;
pub mod color;
pub mod preview;
pub mod profile;
pub mod wearable;

pub use category::{BodyShape, HideableCategory, WearableCategory};
pub use color::{Color3, WrappedColor};
pub use preview::{
    Background, PreviewCamera, PreviewConfig, PreviewEmote, PreviewEnv, PreviewOptions,
    PreviewProjection, PreviewType,
};
pub use profile::{AvatarInfo, Profile, ProfileAvatar, Snapshots};
pub use wearable::{
    CatalogItem, EmoteData, EmoteDefinition, Rarity, Representation, RepresentationContent,
    WearableData, WearableDefinition,
};
