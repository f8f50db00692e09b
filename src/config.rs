use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
const ENV_PREFIX: &str = "ORDERDESK";

/// Dashboard session settings
///
/// Layered: built-in defaults, then an optional TOML file, then
/// `ORDERDESK_*` environment variables (e.g. `ORDERDESK_DEBOUNCE_MS=250`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    pub trader_id: String,
    pub debounce_ms: u64,
    pub refresh_interval_secs: u64,
    pub log_filter: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            trader_id: "default".to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            log_filter: "orderdesk=info".to_string(),
        }
    }
}

impl DeskConfig {
    /// Load configuration, reading `path` if it exists
    pub fn load(path: Option<&str>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("trader_id", defaults.trader_id)?
            .set_default("debounce_ms", defaults.debounce_ms)?
            .set_default("refresh_interval_secs", defaults.refresh_interval_secs)?
            .set_default("log_filter", defaults.log_filter)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let cfg: DeskConfig = settings.try_deserialize()?;

        tracing::debug!(
            trader_id = %cfg.trader_id,
            debounce_ms = cfg.debounce_ms,
            "Loaded dashboard configuration"
        );

        Ok(cfg)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DeskConfig::default();
        assert_eq!(cfg.debounce(), Duration::from_millis(500));
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("orderdesk-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("desk.toml");
        std::fs::write(&path, "trader_id = \"trader-7\"\ndebounce_ms = 250\n").unwrap();

        let cfg = DeskConfig::load(path.to_str()).unwrap();
        assert_eq!(cfg.trader_id, "trader-7");
        assert_eq!(cfg.debounce_ms, 250);
        assert_eq!(cfg.refresh_interval_secs, DEFAULT_REFRESH_INTERVAL_SECS);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = DeskConfig::load(Some("/nonexistent/orderdesk-config")).unwrap();
        assert_eq!(cfg.refresh_interval_secs, DEFAULT_REFRESH_INTERVAL_SECS);
    }
}
