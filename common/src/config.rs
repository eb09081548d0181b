use std::str::FromStr;

use crate::{InferenceStrategy, SafeCellPolicy};

/// A selector key that matched nothing in its registry.
///
/// Never fatal: whoever resolves the key substitutes the default and keeps this
/// value around so the substitution can be reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} '{name}' not found, defaulting to {fallback}")]
pub struct UnknownKey {
    pub kind: &'static str,
    pub name: String,
    pub fallback: &'static str,
}

/// The outcome of resolving a key: the selected value, and the fallback taken if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub fallback: Option<UnknownKey>,
}

impl<T> Resolved<T>
where
    T: FromStr<Err = UnknownKey> + Default,
{
    pub fn resolve(name: &str) -> Self {
        match name.parse() {
            Ok(value) => Resolved {
                value,
                fallback: None,
            },
            Err(unknown) => {
                log::warn!("{unknown}");
                Resolved {
                    value: T::default(),
                    fallback: Some(unknown),
                }
            }
        }
    }
}

/// Everything a [`Solver`](crate::Solver) needs at construction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SolverConfig {
    /// Side length of the square board.
    pub grid_size: usize,
    pub strategy: InferenceStrategy,
    pub policy: SafeCellPolicy,
    /// Seeds the random safe-cell policy and the random fallback move.
    /// `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::new(16)
    }
}

impl SolverConfig {
    pub fn new(grid_size: usize) -> Self {
        SolverConfig {
            grid_size,
            strategy: InferenceStrategy::default(),
            policy: SafeCellPolicy::default(),
            seed: None,
        }
    }

    /// Builds a configuration from registry keys, returning any fallbacks taken.
    pub fn from_keys(grid_size: usize, strategy: &str, policy: &str) -> (Self, Vec<UnknownKey>) {
        let strategy = Resolved::<InferenceStrategy>::resolve(strategy);
        let policy = Resolved::<SafeCellPolicy>::resolve(policy);

        let config = SolverConfig::new(grid_size)
            .with_strategy(strategy.value)
            .with_policy(policy.value);
        let fallbacks = strategy.fallback.into_iter().chain(policy.fallback).collect();

        (config, fallbacks)
    }

    pub fn with_strategy(mut self, strategy: InferenceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_policy(mut self, policy: SafeCellPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_resolve_without_fallback() {
        let (config, fallbacks) = SolverConfig::from_keys(8, "bfs", "Last In, First Out");
        assert!(fallbacks.is_empty());
        assert_eq!(config.grid_size, 8);
        assert_eq!(config.strategy, InferenceStrategy::BreadthFirst);
        assert_eq!(config.policy, SafeCellPolicy::Lifo);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_unknown_keys_fall_back_and_are_reported() {
        let (config, fallbacks) = SolverConfig::from_keys(8, "quantum", "Zigzag");
        assert_eq!(config.strategy, InferenceStrategy::Exhaustive);
        assert_eq!(config.policy, SafeCellPolicy::Fifo);

        assert_eq!(fallbacks.len(), 2);
        assert_eq!(fallbacks[0].name, "quantum");
        assert_eq!(fallbacks[0].fallback, "brute_force");
        assert_eq!(fallbacks[1].name, "Zigzag");
        assert_eq!(fallbacks[1].fallback, "First In, First Out");
        assert_eq!(
            fallbacks[0].to_string(),
            "inference strategy 'quantum' not found, defaulting to brute_force"
        );
    }

    #[test]
    fn test_resolved_reports_single_fallback() {
        let resolved = Resolved::<InferenceStrategy>::resolve("dfs");
        assert_eq!(resolved.value, InferenceStrategy::DepthFirst);
        assert!(resolved.fallback.is_none());

        let resolved = Resolved::<SafeCellPolicy>::resolve("");
        assert_eq!(resolved.value, SafeCellPolicy::Fifo);
        assert!(resolved.fallback.is_some());
    }
}
