//! Attribute system.
//!
//! ```text
//! [ AttributeRegistry ]   process-wide catalog (scope, modifiability, derivation)
//!      ↓
//! [ AttributeStore ]      per-entity base + modified values
//!      ↓
//! [ ModifierStack ]       equipment / status contributions on top of the derivation
//! ```
//!
//! Base values are persisted and player controlled; modified values are
//! derived and recomputed eagerly whenever a base they depend on changes, so
//! reads on the sync path are plain lookups.

pub mod modifier;
pub mod registry;
pub mod store;

pub use modifier::{Modifier, ModifierSource, ModifierStack};
pub use registry::{
    AttributeBounds, AttributeId, AttributeInfo, AttributeRegistry, AttributeScopes, Derivation,
    DerivationTerm, RegistryError,
};
pub use store::{AttributeRecord, AttributeStore};
