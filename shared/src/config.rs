use crate::error::ConfigError;
use crate::board::check_dimensions;
use crate::{DEFAULT_COLUMNS, DEFAULT_ROWS};
use std::time::Duration;

/// Settings for one match, shared by the host and the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    pub columns: usize,
    pub rows: usize,
    /// How long to wait for the peer's move before forfeiting the match
    pub move_timeout: Option<Duration>,
    /// Pause after the match ends so the final board stays on screen
    pub grace_period: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            move_timeout: Some(Duration::from_secs(120)),
            grace_period: Duration::from_millis(3000),
        }
    }
}

impl MatchConfig {
    /// Build from command-line style values, where a zero timeout disables it
    pub fn from_args(
        columns: usize,
        rows: usize,
        move_timeout_secs: u64,
        grace_ms: u64,
    ) -> Result<Self, ConfigError> {
        let config = MatchConfig {
            columns,
            rows,
            move_timeout: (move_timeout_secs > 0).then(|| Duration::from_secs(move_timeout_secs)),
            grace_period: Duration::from_millis(grace_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimensions(self.columns, self.rows)?;
        if self.move_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Validation(
                "move_timeout must be > 0 when set".into(),
            ));
        }
        Ok(())
    }
}
