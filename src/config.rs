//! # Global runtime configuration.
//!
//! [`Config`] defines the controller's behavior: the status API port, the
//! apply retry budget, and the backoff base delay.
//!
//! Parsing a configuration file into this struct is the embedding
//! program's concern; the controller only consumes the resulting values.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use driftsync::Config;
//!
//! let mut cfg = Config::default();
//! cfg.port = 9090;
//! cfg.retries = 3;
//! cfg.backoff_base = Duration::from_millis(500);
//!
//! assert_eq!(cfg.retries, 3);
//! ```

use std::time::Duration;

/// Global configuration for the controller and the status API.
#[derive(Clone, Debug)]
pub struct Config {
    /// TCP port the read-only status API listens on.
    pub port: u16,
    /// Number of apply retries after the initial attempt (continuous mode).
    pub retries: u32,
    /// Base delay fed into the exponential retry backoff.
    pub backoff_base: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `port = 8558`
    /// - `retries = 2`
    /// - `backoff_base = 1s`
    fn default() -> Self {
        Self {
            port: 8558,
            retries: 2,
            backoff_base: Duration::from_secs(1),
        }
    }
}
