use crate::filter::{FilterMode, ModeKind};
use crate::models::DEFAULT_MIN_LINE_POINTS;
use log::warn;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Filter settings, loadable from JSON and overridable from the environment
///
/// ```json
/// { "mode": "adaptive", "adaptive_threshold": 0.2, "adaptive_radius": 12 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Which filter to run
    pub mode: ModeKind,
    /// Cutoff for the simple filter (0..=255)
    pub simple_threshold: i64,
    /// Fraction below the local mean for the adaptive filter
    pub adaptive_threshold: f64,
    /// Window half-size for the adaptive filter
    pub adaptive_radius: i64,
    /// Classify rows in parallel (adaptive only)
    pub parallel: bool,
    /// Points required before a line is fitted
    pub min_line_points: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: ModeKind::Adaptive,
            simple_threshold: 60,
            adaptive_threshold: 0.15,
            adaptive_radius: 8,
            parallel: false,
            min_line_points: DEFAULT_MIN_LINE_POINTS,
        }
    }
}

impl FilterConfig {
    /// Mode with its parameters filled in
    pub fn filter_mode(&self) -> FilterMode {
        match self.mode {
            ModeKind::Simple => FilterMode::Simple {
                threshold: self.simple_threshold,
            },
            ModeKind::Adaptive => FilterMode::Adaptive {
                threshold: self.adaptive_threshold,
                radius: self.adaptive_radius,
            },
        }
    }

    /// Apply `CRACKTHRESH_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Unparseable values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, "CRACKTHRESH_MODE", &mut self.mode);
        override_from(
            &lookup,
            "CRACKTHRESH_SIMPLE_THRESHOLD",
            &mut self.simple_threshold,
        );
        override_from(
            &lookup,
            "CRACKTHRESH_ADAPTIVE_THRESHOLD",
            &mut self.adaptive_threshold,
        );
        override_from(&lookup, "CRACKTHRESH_ADAPTIVE_RADIUS", &mut self.adaptive_radius);
        override_from(&lookup, "CRACKTHRESH_PARALLEL", &mut self.parallel);
        override_from(&lookup, "CRACKTHRESH_MIN_LINE_POINTS", &mut self.min_line_points);
        self
    }
}

fn override_from<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => warn!("ignoring {}={:?}: cannot parse", key, raw),
    }
}

/// Read a JSON config file. Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<FilterConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: FilterConfig =
            serde_json::from_str(r#"{ "mode": "simple", "simple_threshold": 42 }"#).unwrap();
        assert_eq!(cfg.mode, ModeKind::Simple);
        assert_eq!(cfg.filter_mode(), FilterMode::Simple { threshold: 42 });
        assert_eq!(cfg.adaptive_radius, FilterConfig::default().adaptive_radius);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CRACKTHRESH_MODE", "adaptive"),
            ("CRACKTHRESH_ADAPTIVE_RADIUS", "15"),
            ("CRACKTHRESH_ADAPTIVE_THRESHOLD", "not-a-number"),
            ("CRACKTHRESH_PARALLEL", "true"),
        ]
        .into_iter()
        .collect();

        let cfg = FilterConfig {
            mode: ModeKind::Simple,
            ..FilterConfig::default()
        }
        .with_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(
            cfg.filter_mode(),
            FilterMode::Adaptive {
                threshold: 0.15,
                radius: 15
            }
        );
        assert!(cfg.parallel);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/crackthresh.json")).unwrap_err();
        assert!(err.starts_with("Failed to read config"));
    }
}
