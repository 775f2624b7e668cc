//! lcx-dv specific configuration

use std::time::Duration;

use anyhow::{bail, Result};
use lcx_common::config::{resolve_setting, CompiledDefaults, TomlConfig};
use lcx_common::SkillAttribution;
use tracing::warn;

/// Base URL of the response store
pub const ENV_STORE_URL: &str = "LCX_STORE_URL";
/// Refresh interval in milliseconds
pub const ENV_REFRESH_MS: &str = "LCX_REFRESH_MS";
/// Per-request timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "LCX_TIMEOUT_MS";
/// `every` or `primary`
pub const ENV_SKILL_ATTRIBUTION: &str = "LCX_SKILL_ATTRIBUTION";

/// Command-line values; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct DashboardOverrides {
    pub store_url: Option<String>,
    pub refresh_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub skill_attribution: Option<SkillAttribution>,
}

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub store_url: String,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub skill_attribution: SkillAttribution,
}

impl DashboardConfig {
    /// Resolve every setting: CLI, environment, TOML, compiled default
    pub fn resolve(overrides: DashboardOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();
        let section = &toml.dashboard;

        let store_url = resolve_setting(
            overrides.store_url,
            ENV_STORE_URL,
            section.store_url.clone(),
            defaults.store_url,
        );
        let refresh_interval_ms = resolve_setting(
            overrides.refresh_interval_ms,
            ENV_REFRESH_MS,
            section.refresh_interval_ms,
            defaults.refresh_interval_ms,
        );
        let request_timeout_ms = resolve_setting(
            overrides.request_timeout_ms,
            ENV_TIMEOUT_MS,
            section.request_timeout_ms,
            defaults.request_timeout_ms,
        );
        let skill_attribution = resolve_setting(
            overrides.skill_attribution,
            ENV_SKILL_ATTRIBUTION,
            section.skill_attribution,
            SkillAttribution::default(),
        );

        if refresh_interval_ms == 0 {
            bail!("Refresh interval must be greater than zero");
        }
        if request_timeout_ms == 0 {
            bail!("Request timeout must be greater than zero");
        }
        if request_timeout_ms >= refresh_interval_ms {
            warn!(
                "Request timeout ({}ms) is not below the refresh interval ({}ms); \
                 slow fetches will be superseded before they complete",
                request_timeout_ms, refresh_interval_ms
            );
        }

        Ok(Self {
            store_url,
            refresh_interval: Duration::from_millis(refresh_interval_ms),
            request_timeout: Duration::from_millis(request_timeout_ms),
            skill_attribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcx_common::config::DashboardSection;

    #[test]
    fn test_cli_values_win_over_toml() {
        let toml = TomlConfig {
            dashboard: DashboardSection {
                store_url: Some("http://toml.local:3001".to_string()),
                refresh_interval_ms: Some(9000),
                request_timeout_ms: Some(8000),
                skill_attribution: Some(SkillAttribution::PrimarySkillOnly),
            },
            ..TomlConfig::default()
        };
        let overrides = DashboardOverrides {
            store_url: Some("http://cli.local:3001".to_string()),
            refresh_interval_ms: Some(1000),
            request_timeout_ms: Some(500),
            skill_attribution: Some(SkillAttribution::EveryListedSkill),
        };

        let config = DashboardConfig::resolve(overrides, &toml).unwrap();
        assert_eq!(config.store_url, "http://cli.local:3001");
        assert_eq!(config.refresh_interval, Duration::from_millis(1000));
        assert_eq!(config.request_timeout, Duration::from_millis(500));
        assert_eq!(config.skill_attribution, SkillAttribution::EveryListedSkill);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let overrides = DashboardOverrides {
            refresh_interval_ms: Some(0),
            ..DashboardOverrides::default()
        };
        assert!(DashboardConfig::resolve(overrides, &TomlConfig::default()).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let overrides = DashboardOverrides {
            request_timeout_ms: Some(0),
            ..DashboardOverrides::default()
        };
        assert!(DashboardConfig::resolve(overrides, &TomlConfig::default()).is_err());
    }
}
