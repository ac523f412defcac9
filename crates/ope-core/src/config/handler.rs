use std::path::PathBuf;
use std::time::Duration;

use super::dispatch;

/// Runtime configuration for one handler process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Delay between the end of a dispatch and process exit.
    pub grace_period: Duration,
    /// Companion path that replaces bundle-relative resolution.
    pub companion_override: Option<PathBuf>,
}

impl HandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace period, capped at [`dispatch::MAX_GRACE_PERIOD_MS`].
    pub fn with_grace_millis(mut self, millis: u64) -> Self {
        self.grace_period = Duration::from_millis(millis.min(dispatch::MAX_GRACE_PERIOD_MS));
        self
    }

    pub fn with_companion_override(mut self, path: Option<PathBuf>) -> Self {
        // An empty value (e.g. `OPE_COMPANION=`) means "no override".
        self.companion_override = path.filter(|p| !p.as_os_str().is_empty());
        self
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            grace_period: dispatch::GRACE_PERIOD,
            companion_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_production_grace_period() {
        let config = HandlerConfig::default();
        assert_eq!(config.grace_period, Duration::from_millis(500));
        assert!(config.companion_override.is_none());
    }

    #[test]
    fn test_with_grace_millis() {
        let config = HandlerConfig::new().with_grace_millis(5);
        assert_eq!(config.grace_period, Duration::from_millis(5));
    }

    #[test]
    fn test_grace_millis_is_capped() {
        let config = HandlerConfig::new().with_grace_millis(u64::MAX);
        assert_eq!(config.grace_period, Duration::from_secs(10));
    }

    #[test]
    fn test_empty_companion_override_is_ignored() {
        let config = HandlerConfig::new().with_companion_override(Some(PathBuf::new()));
        assert!(config.companion_override.is_none());

        let config =
            HandlerConfig::new().with_companion_override(Some(PathBuf::from("/opt/ope/bin/ope")));
        assert_eq!(
            config.companion_override,
            Some(PathBuf::from("/opt/ope/bin/ope"))
        );
    }
}
