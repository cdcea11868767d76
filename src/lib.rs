pub mod compatibility;
pub mod config;
pub mod embedding;
pub mod exchange;
pub mod graph;
pub mod hierarchy;
pub mod models;
pub mod ranking;
pub mod recommender;

pub use config::RecommendationConfig;
pub use hierarchy::{Hierarchy, HierarchyStore};
pub use models::{HAS_VALUE, HierarchyKind, HierarchyNode, HierarchyRow, OWL_THING, Triple};
pub use recommender::{
    RecommendationEngine, RecommendationEngineBuilder, RecommendationError, Recommendations,
};
