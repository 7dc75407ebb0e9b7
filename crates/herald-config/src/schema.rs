use herald_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main Herald configuration
///
/// Configuration is loaded from (in priority order):
/// 1. `herald.jsonc` - JSON with comments
/// 2. `herald.json` - Standard JSON
/// 3. `herald.yml` / `herald.yaml` - YAML format
///
/// Also checks hidden variants (`.herald.*`) and `~/.config/herald/` for global config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeraldConfig {
    /// Log level and output format
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Order demo wiring used by the `herald` binary
    #[serde(default)]
    pub demo: DemoSettings,
}

// ============================================================================
// Demo Configuration
// ============================================================================

/// Order demo settings
///
/// # Example
///
/// ```yaml
/// demo:
///   event_key: order.created
///   settle_secs: 4
///   delays:
///     printing_ms: 1000
///     email_ms: 2000
///     notification_ms: 3000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSettings {
    /// Key the order subscribers are registered under (default: order.created)
    #[serde(default = "default_event_key")]
    pub event_key: String,

    /// Seconds to wait after publishing so handlers can finish (default: 4)
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Simulated latency of each order subscriber
    #[serde(default)]
    pub delays: SubscriberDelays,
}

impl DemoSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            event_key: default_event_key(),
            settle_secs: default_settle_secs(),
            delays: SubscriberDelays::default(),
        }
    }
}

fn default_event_key() -> String {
    "order.created".to_string()
}

fn default_settle_secs() -> u64 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberDelays {
    #[serde(default = "default_printing_ms")]
    pub printing_ms: u64,

    #[serde(default = "default_email_ms")]
    pub email_ms: u64,

    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
}

impl Default for SubscriberDelays {
    fn default() -> Self {
        Self {
            printing_ms: default_printing_ms(),
            email_ms: default_email_ms(),
            notification_ms: default_notification_ms(),
        }
    }
}

fn default_printing_ms() -> u64 {
    1000
}

fn default_email_ms() -> u64 {
    2000
}

fn default_notification_ms() -> u64 {
    3000
}
