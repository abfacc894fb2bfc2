//! Configuration for the query-trace logger.

use std::time::Duration;

/// Slow-query threshold used when none is configured.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(2);

/// Configuration options for [`StructuredQueryLogger`](crate::StructuredQueryLogger).
///
/// # Example
///
/// ```rust
/// use structured_log_bridge::QueryLoggerConfig;
/// use std::time::Duration;
///
/// let config = QueryLoggerConfig::default()
///     .with_slow_threshold(Duration::from_millis(200));
/// assert_eq!(config.slow_threshold, Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLoggerConfig {
    /// Queries taking strictly longer than this are logged at WARN level as
    /// `SLOW QUERY`.
    /// Default: 2s
    pub slow_threshold: Duration,
}

impl Default for QueryLoggerConfig {
    fn default() -> Self {
        Self {
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
        }
    }
}

impl QueryLoggerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the threshold for slow query warnings.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Applies options in order. A later option overrides an earlier one.
    pub fn with_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = QueryLoggerOption>,
    {
        for option in options {
            option.apply(&mut self);
        }
        self
    }

    /// A configuration that flags anything slower than 100ms.
    pub fn development() -> Self {
        Self {
            slow_threshold: Duration::from_millis(100),
        }
    }

    /// A configuration that only flags queries slower than 5s.
    pub fn production() -> Self {
        Self {
            slow_threshold: Duration::from_secs(5),
        }
    }
}

/// A single construction-time override for [`QueryLoggerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryLoggerOption {
    /// Overrides [`QueryLoggerConfig::slow_threshold`].
    SlowThreshold(Duration),
}

impl QueryLoggerOption {
    fn apply(self, config: &mut QueryLoggerConfig) {
        match self {
            QueryLoggerOption::SlowThreshold(threshold) => config.slow_threshold = threshold,
        }
    }
}

/// Shorthand for [`QueryLoggerOption::SlowThreshold`].
pub fn with_slow_threshold(threshold: Duration) -> QueryLoggerOption {
    QueryLoggerOption::SlowThreshold(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold() {
        assert_eq!(QueryLoggerConfig::default().slow_threshold, Duration::from_secs(2));
        assert_eq!(QueryLoggerConfig::new(), QueryLoggerConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = QueryLoggerConfig::default().with_slow_threshold(Duration::from_millis(50));
        assert_eq!(config.slow_threshold, Duration::from_millis(50));
    }

    #[test]
    fn test_options_last_write_wins() {
        let config = QueryLoggerConfig::default().with_options([
            with_slow_threshold(Duration::from_secs(10)),
            with_slow_threshold(Duration::from_millis(300)),
        ]);
        assert_eq!(config.slow_threshold, Duration::from_millis(300));
    }

    #[test]
    fn test_no_options_keeps_default() {
        let config = QueryLoggerConfig::default().with_options(Vec::<QueryLoggerOption>::new());
        assert_eq!(config, QueryLoggerConfig::default());
    }

    #[test]
    fn test_presets() {
        assert!(
            QueryLoggerConfig::development().slow_threshold
                < QueryLoggerConfig::production().slow_threshold
        );
    }
}
