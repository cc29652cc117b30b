//! SlateBlock Core Library
//!
//! Shared types and contracts for the SlateBlock content blocker: the
//! normalized rule data model produced by the compiler, the cosmetic rule
//! store consumed by the page-side injector, and the mutation contract of
//! the declarative matching backend.
//!
//! # Modules
//!
//! - `types`: network rule data model and serialization
//! - `domain`: syntactic domain validation
//! - `cosmetic`: cosmetic (CSS hiding) rule store and lookup
//! - `backend`: backend trait, errors, in-memory reference backend

pub mod backend;
pub mod cosmetic;
pub mod domain;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendError, MemoryBackend, RuleBackend};
pub use cosmetic::{CssRule, CssRuleStore, GLOBAL_DOMAIN};
pub use domain::is_valid_domain;
pub use types::{
    DomainType, NetworkRule, ResourceTypes, RuleAction, RuleId, PRIORITY_BLOCK,
    PRIORITY_EXCEPTION, PRIORITY_IMPORTANT,
};
