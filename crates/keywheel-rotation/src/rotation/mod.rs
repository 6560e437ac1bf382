//! The rotation engine: eligibility, orchestration, registry, strategies

pub mod eligibility;
pub mod registry;
pub mod rotator;
pub mod strategies;

pub use eligibility::{should_rotate, Candidacy, SkipReason};
pub use registry::StrategyRegistry;
pub use rotator::{initialize, rotate, RotationStrategy};
