//! # Query Executor
//!
//! Purpose: Resolve one key against the configured data file over the cached
//! session, reopening the file while another client keeps saving it.
//!
//! ## Design Principles
//! 1. **Check Before Connect**: A missing data file is reported before the
//!    session manager is touched.
//! 2. **Reopen on Checksum**: The file is opened without a lock, so a save by
//!    another client invalidates it; that one code triggers open+GET again.
//! 3. **Bounded Patience**: The reopen loop is capped by [`RetryPolicy`].
//! 4. **Single Release**: The raw response is owned here and dropped exactly
//!    once, after escaping or on the error path.

use std::fmt;
use std::time::Duration;

use pwmd_common::{Daemon, DaemonHandle, LookupError, LookupResult, TransportResult};
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::escape::escape_value;
use crate::session::SessionManager;

/// Name of the data file parameter in error messages.
pub const FILE_PARAMETER: &str = "pwmd_file";

/// Successful lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupValue {
    /// Escaped value, safe for the host's string expansion.
    pub value: String,
    /// Whether the host may memoize this result.
    pub cacheable: bool,
}

/// Runs GET lookups with the stale-file retry protocol.
pub struct QueryExecutor {
    policy: RetryPolicy,
    sleep: Box<dyn Fn(Duration)>,
}

impl QueryExecutor {
    /// Creates an executor that blocks the thread between reopen attempts.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, std::thread::sleep)
    }

    /// Creates an executor with a custom pause function.
    pub fn with_sleeper(policy: RetryPolicy, sleep: impl Fn(Duration) + 'static) -> Self {
        QueryExecutor {
            policy,
            sleep: Box::new(sleep),
        }
    }

    /// Returns the retry policy.
    #[inline]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Looks up `key` in `file`, connecting through `sessions` if needed.
    ///
    /// # Errors
    /// - `MissingParameter` if `file` is empty (no session activity).
    /// - Session errors from [`SessionManager::ensure_session`].
    /// - `Daemon` for open/GET failures other than a stale file.
    /// - `StaleRetriesExhausted` once the retry budget is spent.
    /// - `EscapeAlloc` if the escaped value cannot be allocated.
    pub fn lookup<D: Daemon>(
        &self,
        sessions: &mut SessionManager<D>,
        file: &str,
        key: &str,
    ) -> LookupResult<LookupValue> {
        if file.is_empty() {
            return Err(LookupError::MissingParameter {
                name: FILE_PARAMETER,
            });
        }

        let handle = sessions.ensure_session()?;
        let raw = match self.fetch(handle, file, key) {
            Ok(raw) => raw,
            Err(err) => {
                if err.transport().is_some_and(|source| source.is_connection_lost()) {
                    sessions.discard(&err);
                }
                return Err(err);
            }
        };

        let value = escape_value(raw.as_ref()).inspect_err(|_| {
            debug!(file, "deferring due to allocation failure while escaping result");
        })?;
        drop(raw);

        Ok(LookupValue {
            value,
            cacheable: true,
        })
    }

    fn fetch<H: DaemonHandle>(&self, handle: &mut H, file: &str, key: &str) -> LookupResult<H::Response> {
        let command = GetCommand(key).to_string();
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            let source = match open_and_get(handle, file, &command) {
                Ok(raw) => {
                    debug!(file, attempts, "pwmd GET succeeded");
                    return Ok(raw);
                }
                Err(source) => source,
            };

            if !source.is_stale() {
                return Err(LookupError::Daemon { source });
            }
            if !self.policy.allows_another(attempts) {
                warn!(file, attempts, "data file kept changing, giving up");
                return Err(LookupError::StaleRetriesExhausted { attempts, source });
            }

            debug!(
                file,
                code = %source.code,
                description = %source.description,
                attempts,
                "pwmd reopening data file"
            );
            (self.sleep)(self.policy.delay());
        }
    }
}

impl fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn open_and_get<H: DaemonHandle>(handle: &mut H, file: &str, command: &str) -> TransportResult<H::Response> {
    handle.open(file)?;
    debug!(file, "opened pwmd file");
    handle.command(command)
}

/// `GET <key>` protocol command.
struct GetCommand<'a>(&'a str);

impl fmt::Display for GetCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.0)
    }
}
