use anyhow::{Context, Result};
use serde::Deserialize;

/// Result-size bounds for a dashboard report.
///
/// Stored as a JSON object on disk; any field may be omitted:
/// ```json
/// {
///   "river_limit": 20,
///   "trend_limit": 12,
///   "warning_limit": 20
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub river_limit: usize,
    pub method_limit: usize,
    pub trend_limit: usize,
    pub recent_limit: usize,
    pub warning_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            river_limit: 20,
            method_limit: 20,
            trend_limit: 12,
            recent_limit: 10,
            warning_limit: 20,
        }
    }
}

impl ReportConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("Invalid report config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Uses `path` if given, then `REPORT_CONFIG`, then the defaults.
    ///
    /// An explicit path that cannot be read is an error; the environment
    /// fallback is only consulted when no path was passed.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match std::env::var("REPORT_CONFIG") {
                Ok(p) if !p.trim().is_empty() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ReportConfig::from_json(r#"{ "warning_limit": 5 }"#).unwrap();
        assert_eq!(config.warning_limit, 5);
        assert_eq!(config.river_limit, 20);
        assert_eq!(config.trend_limit, 12);
    }

    #[test]
    fn test_invalid_config() {
        assert!(ReportConfig::from_json(r#"{ "warning_limit": -1 }"#).is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        assert!(ReportConfig::resolve(Some("/nonexistent/report.json")).is_err());
    }
}
