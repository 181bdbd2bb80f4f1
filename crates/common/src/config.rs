//! Configuration structs for engine timing and fallbacks.

use serde::{Deserialize, Serialize};

use crate::types::Span;

/// Top-level engine configuration.
///
/// All delays are in host ticks (one tick is roughly one redraw, about
/// 16 ms). The defaults reproduce the timing the engine was tuned
/// against; hosts with slower loops can stretch them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Coalescing window for rapid union-value changes.
    pub debounce_ticks: u64,
    /// Delay before reacting to node add/remove churn with a range
    /// recomputation.
    pub settle_delay_ticks: u64,
    /// Delay between mutating host flags and requesting the follow-up
    /// solve.
    pub apply_delay_ticks: u64,
    /// Budget after which a stuck propagation guard is forcibly reset.
    pub watchdog_budget_ticks: u64,
    /// Lifetime of transient user-visible warnings.
    pub warning_ticks: u64,
    /// Cap on settle rounds when driving the task queue to a fixed point.
    pub max_settle_rounds: u32,
    /// Interval assumed when a label is malformed or absent.
    pub default_range: Span,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ticks: 1,
            settle_delay_ticks: 5,
            apply_delay_ticks: 1,
            watchdog_budget_ticks: 64,
            warning_ticks: 90,
            max_settle_rounds: 32,
            default_range: Span::new(0.0, 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_host_loop_shaped() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.debounce_ticks, 1);
        assert!(cfg.watchdog_budget_ticks > cfg.apply_delay_ticks);
        assert_eq!(cfg.default_range, Span::new(0.0, 100.0));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"debounce_ticks": 3}"#).unwrap();
        assert_eq!(cfg.debounce_ticks, 3);
        assert_eq!(
            cfg.settle_delay_ticks,
            EngineConfig::default().settle_delay_ticks
        );
    }
}
