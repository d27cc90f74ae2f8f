//! Articular core
//!
//! Dual-indexed entity component store:
//! - Primary System -> Entity -> Component index
//! - Entity -> System -> Component cache kept in step with it
//! - Data pipes for cross-system handoff
//! - Update dispatch contracts for the host loop

pub mod config;
pub mod ecs;

pub use config::WorldConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
