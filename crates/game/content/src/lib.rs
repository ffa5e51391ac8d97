//! Data-driven content definitions and loaders.
//!
//! This crate provides loaders for the RON/TOML data files a game server
//! reads at startup:
//! - Attribute registry (RON)
//! - Ability catalog (RON)
//! - Server configuration (TOML)
//!
//! Loaded content is immutable for the lifetime of the process and shared by
//! every character.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{AbilityLoader, AttributeLoader, ConfigLoader, ContentFactory, LoadResult};
