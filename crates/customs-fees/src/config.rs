use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uz_customs_fees::rates::CBU_USD_ENDPOINT;
use uz_customs_fees::validation::{check_bhm, check_exchange_rate, check_rate_ttl_minutes};
use uz_customs_fees::{DEFAULT_BHM, FALLBACK_USD_RATE};

const CONFIG_FILE: &str = "~/.customs-fees.json";
const LOG_FILE: &str = "~/.customs-fees.log";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeeConfig {
    pub bhm: f64,
    pub fallback_rate: f64,
    pub rate_ttl_minutes: i64,
    pub rate_endpoint: String,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            bhm: DEFAULT_BHM,
            fallback_rate: FALLBACK_USD_RATE,
            rate_ttl_minutes: 60,
            rate_endpoint: CBU_USD_ENDPOINT.to_string(),
        }
    }
}

impl FeeConfig {
    /// Rejects settings the calculators or the rate cache would refuse at run time.
    pub fn validate(&self) -> Result<()> {
        check_bhm(self.bhm)?;
        check_exchange_rate(self.fallback_rate).context("fallback_rate")?;
        check_rate_ttl_minutes(self.rate_ttl_minutes)?;
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(CONFIG_FILE).as_ref())
}

pub fn default_log_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(LOG_FILE).as_ref())
}

pub fn load_config(path: &Path) -> Result<FeeConfig> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: FeeConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    } else {
        Ok(FeeConfig::default())
    }
}

pub fn save_config(path: &Path, config: &FeeConfig) -> Result<()> {
    config.validate().context("Refusing to save config")?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}
