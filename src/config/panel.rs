use std::time::Duration;

use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;

/// Timing and log-window settings for the lifecycle controller.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Period between background log fetches while a container runs.
    pub poll_interval: Duration,
    /// Lines requested by each background poll.
    pub poll_tail: u32,
    /// Lines requested by the full-log view.
    pub modal_tail: u32,
    /// Delay before the panel returns to its idle placeholder after a delete.
    pub reset_delay: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            poll_tail: 20,
            modal_tail: 200,
            reset_delay: Duration::from_millis(3000),
        }
    }
}

impl PanelConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let poll_ms: u64 = parse_optional_env(
            "MINISHELL_POLL_INTERVAL_MS",
            defaults.poll_interval.as_millis() as u64,
        )?;
        if poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MINISHELL_POLL_INTERVAL_MS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let poll_tail = parse_optional_env("MINISHELL_POLL_TAIL", defaults.poll_tail)?;
        let modal_tail = parse_optional_env("MINISHELL_MODAL_TAIL", defaults.modal_tail)?;
        for (key, value) in [
            ("MINISHELL_POLL_TAIL", poll_tail),
            ("MINISHELL_MODAL_TAIL", modal_tail),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must request at least one line".to_string(),
                });
            }
        }

        let reset_ms: u64 = parse_optional_env(
            "MINISHELL_RESET_DELAY_MS",
            defaults.reset_delay.as_millis() as u64,
        )?;

        Ok(Self {
            poll_interval: Duration::from_millis(poll_ms),
            poll_tail,
            modal_tail,
            reset_delay: Duration::from_millis(reset_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    fn clear_panel_env() {
        // SAFETY: Only called under ENV_MUTEX in tests.
        unsafe {
            std::env::remove_var("MINISHELL_POLL_INTERVAL_MS");
            std::env::remove_var("MINISHELL_POLL_TAIL");
            std::env::remove_var("MINISHELL_MODAL_TAIL");
            std::env::remove_var("MINISHELL_RESET_DELAY_MS");
        }
    }

    #[test]
    fn defaults_match_panel_timings() {
        let config = PanelConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_tail, 20);
        assert_eq!(config.modal_tail, 200);
        assert_eq!(config.reset_delay, Duration::from_secs(3));
    }

    #[test]
    fn poll_interval_env_parsed() {
        let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        clear_panel_env();

        // SAFETY: Under ENV_MUTEX.
        unsafe {
            std::env::set_var("MINISHELL_POLL_INTERVAL_MS", "500");
        }

        let config = PanelConfig::resolve().expect("resolve should succeed");
        assert_eq!(config.poll_interval, Duration::from_millis(500));

        clear_panel_env();
    }

    #[test]
    fn zero_tail_rejected() {
        let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        clear_panel_env();

        // SAFETY: Under ENV_MUTEX.
        unsafe {
            std::env::set_var("MINISHELL_POLL_TAIL", "0");
        }

        let result = PanelConfig::resolve();
        assert!(result.is_err(), "a zero-line tail should be rejected");

        clear_panel_env();
    }

    #[test]
    fn garbage_interval_rejected() {
        let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        clear_panel_env();

        // SAFETY: Under ENV_MUTEX.
        unsafe {
            std::env::set_var("MINISHELL_POLL_INTERVAL_MS", "soon");
        }

        let result = PanelConfig::resolve();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        clear_panel_env();
    }
}
