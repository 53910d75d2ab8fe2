//! # Connector Configuration
//!
//! Purpose: Carry the three host-supplied values (daemon socket, socket
//! argument spec, data file) plus the tunables of the session and the
//! stale-file retry loop.
//!
//! Every field has a default so a host only spells out what it changes:
//!
//! ```json
//! { "file": "mail", "socket_args": "ssh://vault,~/.ssh/id_ed25519" }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client label sent when allocating a daemon handle.
pub const DEFAULT_CLIENT_NAME: &str = "exim";

/// Remote lock acquisition timeout in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u32 = 100;

/// Pause between stale-file reopen attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Open+command cycles allowed per lookup before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Label used in diagnostics when no socket is configured.
pub const DEFAULT_SOCKET_LABEL: &str = "default socket";

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The document is not valid JSON or has mistyped fields.
    #[error("invalid connector configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Host-supplied connector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Daemon socket address; `None` selects the daemon's default socket.
    pub socket: Option<String>,
    /// Comma-separated positional connect arguments.
    pub socket_args: Option<String>,
    /// Data file opened for every lookup.
    pub file: Option<String>,
    /// Label sent when allocating a handle.
    pub client_name: String,
    /// Remote lock acquisition timeout, set once per session.
    pub lock_timeout_ms: u32,
    /// Stale-file retry policy.
    pub retry: RetryPolicy,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            socket: None,
            socket_args: None,
            file: None,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            retry: RetryPolicy::default(),
        }
    }
}

impl LookupConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Bounds and pacing of the stale-file reopen loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Pause before each reopen, in milliseconds.
    pub delay_ms: u64,
    /// Maximum open+command cycles per lookup; `0` never gives up.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Policy that keeps reopening until the file settles.
    pub const fn unbounded(delay_ms: u64) -> Self {
        RetryPolicy {
            delay_ms,
            max_attempts: 0,
        }
    }

    /// Returns the pause between attempts.
    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Returns true if another cycle may follow `attempts` finished ones.
    #[inline]
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_attempts == 0 || attempts < self.max_attempts
    }
}
