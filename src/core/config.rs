use crate::core::types::Settings;

// ---------------------------------------------------------------------------
// SweepConfig — file-based config loader (nestsweep.json) with env-var fallback
// ---------------------------------------------------------------------------

/// Top-level config loaded from `nestsweep.json`.
///
/// Every field is optional; resolution order is JSON field → env var →
/// built-in default (the original safe-limit constants).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct SweepConfig {
    /// Maximum unfollow actions per session. Default: 190.
    pub max_actions: Option<u32>,
    /// Minimum inter-action delay in ms. Default: 20000.
    pub min_delay_ms: Option<u64>,
    /// Maximum inter-action delay in ms. Default: 35000.
    pub max_delay_ms: Option<u64>,
    /// Confirmation-dialog wait timeout in ms. Default: 7000.
    pub confirm_timeout_ms: Option<u64>,
    /// Extra locale phrases marking a mutual relationship ("follows you"
    /// equivalents). Appended to the built-in table.
    #[serde(default)]
    pub extra_mutual_phrases: Vec<String>,
    /// Extra labels marking an active, reversible follow control
    /// ("following"/"unfollow" equivalents). Appended to the built-in table.
    #[serde(default)]
    pub extra_control_keywords: Vec<String>,
    /// Extra labels accepted on the confirmation control during the
    /// full-button-scan fallback. Appended to the built-in table.
    #[serde(default)]
    pub extra_confirm_keywords: Vec<String>,
}

impl SweepConfig {
    /// Max actions: JSON field → `NESTSWEEP_MAX_ACTIONS` env var → 190.
    pub fn resolve_max_actions(&self) -> u32 {
        if let Some(n) = self.max_actions {
            return n;
        }
        std::env::var("NESTSWEEP_MAX_ACTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(190)
    }

    /// Min delay: JSON field → `NESTSWEEP_MIN_DELAY_MS` env var → 20000.
    pub fn resolve_min_delay_ms(&self) -> u64 {
        if let Some(n) = self.min_delay_ms {
            return n;
        }
        std::env::var("NESTSWEEP_MIN_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20_000)
    }

    /// Max delay: JSON field → `NESTSWEEP_MAX_DELAY_MS` env var → 35000.
    pub fn resolve_max_delay_ms(&self) -> u64 {
        if let Some(n) = self.max_delay_ms {
            return n;
        }
        std::env::var("NESTSWEEP_MAX_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(35_000)
    }

    /// Confirmation timeout: JSON field → `NESTSWEEP_CONFIRM_TIMEOUT_MS` env
    /// var → 7000.
    pub fn resolve_confirm_timeout_ms(&self) -> u64 {
        if let Some(n) = self.confirm_timeout_ms {
            return n;
        }
        std::env::var("NESTSWEEP_CONFIRM_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7_000)
    }

    /// Resolved session limits as a [`Settings`] record.
    pub fn settings(&self) -> Settings {
        Settings {
            max_actions: self.resolve_max_actions(),
            min_delay_ms: self.resolve_min_delay_ms(),
            max_delay_ms: self.resolve_max_delay_ms(),
        }
    }
}

/// Load `nestsweep.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `NESTSWEEP_CONFIG` env var path
/// 2. `./nestsweep.json`  (process cwd)
/// 3. `../nestsweep.json` (one level up)
///
/// Missing file → `SweepConfig::default()` (silent, all env-var fallbacks
/// apply). Parse error → log a warning, return `SweepConfig::default()`.
pub fn load_config() -> SweepConfig {
    let candidates: Vec<std::path::PathBuf> = {
        let mut v = vec![
            std::path::PathBuf::from("nestsweep.json"),
            std::path::PathBuf::from("../nestsweep.json"),
        ];
        if let Ok(env_path) = std::env::var("NESTSWEEP_CONFIG") {
            v.insert(0, std::path::PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<SweepConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("nestsweep.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "nestsweep.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return SweepConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    SweepConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fields_take_precedence() {
        let cfg: SweepConfig = serde_json::from_str(
            r#"{ "max_actions": 50, "min_delay_ms": 1000, "max_delay_ms": 2000 }"#,
        )
        .unwrap();
        let s = cfg.settings();
        assert_eq!(s.max_actions, 50);
        assert_eq!(s.min_delay_ms, 1000);
        assert_eq!(s.max_delay_ms, 2000);
    }

    #[test]
    fn test_defaults_when_absent() {
        let cfg = SweepConfig::default();
        // Env vars are not set in the test environment, so the built-in
        // defaults apply.
        assert_eq!(cfg.resolve_confirm_timeout_ms(), 7_000);
        let s = cfg.settings();
        assert_eq!(s.max_actions, 190);
        assert_eq!(s.min_delay_ms, 20_000);
        assert_eq!(s.max_delay_ms, 35_000);
    }

    #[test]
    fn test_extra_keyword_tables_deserialize() {
        let cfg: SweepConfig = serde_json::from_str(
            r#"{ "extra_mutual_phrases": ["te sigue"], "extra_control_keywords": ["siguiendo"] }"#,
        )
        .unwrap();
        assert_eq!(cfg.extra_mutual_phrases, vec!["te sigue"]);
        assert_eq!(cfg.extra_control_keywords, vec!["siguiendo"]);
        assert!(cfg.extra_confirm_keywords.is_empty());
    }
}
