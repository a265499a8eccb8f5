//! recall-core: Shared types, settings, and transport DTOs for the recall
//! graph service.
//!
//! This crate provides the foundational pieces used across all recall
//! components:
//! - Graph domain types (EntityNode, EntityEdge, EpisodicNode)
//! - The FactResult transport DTO
//! - Environment-derived service settings

pub mod dto;
pub mod settings;
pub mod types;

pub use dto::FactResult;
pub use settings::Settings;
pub use types::{EntityEdge, EntityNode, EpisodeType, EpisodicNode};
