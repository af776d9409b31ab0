//! Gazeta Core Library
//!
//! Domain logic for the Gazeta news archive toolchain: sharded hot/archive
//! storage, retention rotation, manifest/summary generation, and tiered
//! item resolution.

pub mod config;
pub mod error;
pub mod item;
pub mod logging;
pub mod manifest;
pub mod resolver;
pub mod rotation;
pub mod scope;
pub mod seen;
pub mod shard;
pub mod store;
pub mod summary;
