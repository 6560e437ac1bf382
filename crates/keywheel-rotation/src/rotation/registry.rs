//! Strategy registry and driver surface
//!
//! The driver builds one registry per process, resolves each configured
//! resource to its strategy by tag, and calls `initialize` or `rotate`.
//! A lookup miss is a per-resource skip, not a fatal error.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

use crate::core::{
    CancellationToken, Clock, OperationContext, ResourceConfig, RotationFlags, RotationResult,
    SystemClock,
};

use super::rotator::{self, RotationStrategy};

/// Name-to-strategy mapping consulted for each configured resource
pub struct StrategyRegistry {
    strategies: DashMap<&'static str, Arc<dyn RotationStrategy>>,
    clock: Arc<dyn Clock>,
}

impl StrategyRegistry {
    /// Create an empty registry on the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty registry with an injected clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            strategies: DashMap::new(),
            clock,
        }
    }

    /// Register a strategy under its own tag; re-registration overwrites
    pub fn register(&self, strategy: Arc<dyn RotationStrategy>) {
        self.strategies.insert(strategy.strategy_type(), strategy);
    }

    /// Get a strategy by tag
    pub fn get(&self, strategy_type: &str) -> Option<Arc<dyn RotationStrategy>> {
        self.strategies
            .get(strategy_type)
            .map(|entry| entry.clone())
    }

    /// Check if a tag is registered
    pub fn has_type(&self, strategy_type: &str) -> bool {
        self.strategies.contains_key(strategy_type)
    }

    /// List all registered tags
    pub fn list_types(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|entry| *entry.key()).collect()
    }

    /// Initialize the secret for one resource
    pub async fn initialize(
        &self,
        resource: &ResourceConfig,
        context: &OperationContext,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> RotationResult {
        match self.get(&resource.strategy_type) {
            Some(strategy) => {
                rotator::initialize(
                    strategy.as_ref(),
                    resource,
                    context,
                    flags,
                    self.clock.as_ref(),
                    token,
                )
                .await
            }
            None => self.unknown_strategy(resource),
        }
    }

    /// Rotate the secret for one resource
    pub async fn rotate(
        &self,
        resource: &ResourceConfig,
        context: &OperationContext,
        flags: &RotationFlags,
        token: &CancellationToken,
    ) -> RotationResult {
        match self.get(&resource.strategy_type) {
            Some(strategy) => {
                rotator::rotate(
                    strategy.as_ref(),
                    resource,
                    context,
                    flags,
                    self.clock.as_ref(),
                    token,
                )
                .await
            }
            None => self.unknown_strategy(resource),
        }
    }

    fn unknown_strategy(&self, resource: &ResourceConfig) -> RotationResult {
        warn!(
            resource = %resource.name,
            strategy = %resource.strategy_type,
            "No rotation strategy registered for tag"
        );
        RotationResult::not_rotated(
            &resource.name,
            format!(
                "no rotation strategy registered for '{}'",
                resource.strategy_type
            ),
        )
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
