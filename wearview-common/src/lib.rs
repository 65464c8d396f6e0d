// File: wearview-common/src/lib.rs
//
// Shared data model and error taxonomy for the wearview workspace.

pub mod error;
pub mod models;

pub use error::Error;
