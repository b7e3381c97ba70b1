//! Fan-out configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the fan-out orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Delay between two task spawns (milliseconds).
    /// This is the only throttle when `max_in_flight` is 0.
    #[serde(default = "default_spawn_delay")]
    pub spawn_delay_ms: u64,

    /// Maximum concurrent lookups (0 = unlimited).
    /// When the limit is reached, spawning waits until a task finishes.
    #[serde(default)]
    pub max_in_flight: usize,

    /// Per-lead timeout covering both tracking requests (seconds, 0 = none).
    /// A lead that exceeds it aborts the run like a transport failure.
    #[serde(default)]
    pub task_timeout_secs: u64,

    /// Capacity of the result channel between tasks and the collector.
    #[serde(default = "default_report_buffer")]
    pub report_buffer: usize,
}

fn default_spawn_delay() -> u64 {
    100
}

fn default_report_buffer() -> usize {
    1000
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            spawn_delay_ms: default_spawn_delay(),
            max_in_flight: 0,
            task_timeout_secs: 0,
            report_buffer: default_report_buffer(),
        }
    }
}
