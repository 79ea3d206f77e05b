use std::fs;
use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use anyhow::{bail, Context, Result};

/// Broker-wide knobs. Every bound here is enforced, nothing grows past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Slots in the inbound queue shared by all producers.
    pub queue_capacity: usize,

    /// How long `submit` waits for a free slot before giving up.
    pub submit_timeout_ms: u64,

    /// How long the dispatch loop waits on a single subscriber channel.
    pub delivery_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            submit_timeout_ms: 500,
            delivery_timeout_ms: 100,
        }
    }
}

impl BrokerConfig {

    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let cfg = match path {
            Some(p) => Self::read_from_file(p)?,
            None => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {:?}", path.as_ref()))?;
        let cfg: BrokerConfig = toml::from_str(&raw)
            .with_context(|| "parsing broker config TOML")?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            bail!("queue_capacity must be at least 1");
        }
        if self.submit_timeout_ms == 0 || self.delivery_timeout_ms == 0 {
            bail!("timeouts must be non-zero");
        }
        Ok(())
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}
