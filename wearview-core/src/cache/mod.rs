// File: wearview-core/src/cache/mod.rs

pub mod profile_cache;

pub use profile_cache::ProfileCache;
