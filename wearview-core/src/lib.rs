// src/lib.rs

pub mod bridge;
pub mod cache;
pub mod clients;
pub mod emote;
pub mod options;
pub mod renderer;
pub mod resolver;
pub mod session;

pub use resolver::ConfigResolver;
pub use session::PreviewSession;
pub use wearview_common::Error;
