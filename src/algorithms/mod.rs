//! The algorithm interface and the compile-time registry of algorithms.
//!
//! Polymorphism without inheritance (spec.md §9): `AlgorithmState` is a
//! tagged variant rather than a trait object, so the `Runner` can match on
//! it directly without dynamic dispatch or an open class hierarchy.

pub mod adaptive;
pub mod aimd;
pub mod fixed;

use crate::config::Config;
use crate::decision::Decision;
use crate::sample::Sample;

use adaptive::AdaptiveState;
use aimd::AimdState;
use fixed::FixedState;

/// Owned, mutable state for whichever algorithm the `Runner` selected.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmState {
    Adaptive(AdaptiveState),
    Aimd(AimdState),
    Fixed(FixedState),
}

impl AlgorithmState {
    pub fn init(kind: &'static str, config: &Config) -> AlgorithmState {
        match kind {
            "aimd" => AlgorithmState::Aimd(AimdState::init(config)),
            "fixed" => AlgorithmState::Fixed(FixedState::init(config)),
            _ => AlgorithmState::Adaptive(AdaptiveState::init(config)),
        }
    }

    pub fn step(&mut self, config: &Config, sample: &Sample) -> Decision {
        match self {
            AlgorithmState::Adaptive(state) => state.step(config, sample),
            AlgorithmState::Aimd(state) => state.step(config, sample),
            AlgorithmState::Fixed(state) => state.step(sample),
        }
    }
}

/// One entry in the algorithm registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Registry of all available algorithms, first entry is the default.
/// New algorithms are registered here, nowhere else.
const REGISTRY: &[AlgorithmInfo] = &[
    AlgorithmInfo {
        name: "adaptive",
        description: "Multi-threshold buffer/RTT/loss heuristic with graduated responses",
    },
    AlgorithmInfo {
        name: "aimd",
        description: "Additive Increase Multiplicative Decrease (TCP-style)",
    },
    AlgorithmInfo {
        name: "fixed",
        description: "Constant bitrate, no adaptation",
    },
];

/// The default algorithm: the first registry entry (must be `adaptive`).
pub fn default_algorithm() -> AlgorithmInfo {
    REGISTRY[0]
}

/// Case-sensitive exact-match lookup by name.
pub fn find(name: &str) -> Option<AlgorithmInfo> {
    REGISTRY.iter().copied().find(|a| a.name == name)
}

/// All registered algorithms, in registry order.
pub fn list() -> &'static [AlgorithmInfo] {
    REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_adaptive() {
        assert_eq!(default_algorithm().name, "adaptive");
    }

    #[test]
    fn find_is_case_sensitive_exact_match() {
        assert!(find("Adaptive").is_none());
        assert!(find("adaptive").is_some());
        assert!(find("nonexistent").is_none());
    }

    #[test]
    fn list_enumerates_all_three() {
        let names: Vec<_> = list().iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["adaptive", "aimd", "fixed"]);
    }
}
