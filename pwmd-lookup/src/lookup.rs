//! # Host Lookup Driver
//!
//! Purpose: Present the connector to the host's lookup framework as three
//! hooks: `open` at startup, `find` per query and `tidy` at shutdown.
//!
//! ## Design Principles
//! 1. **Composition Root**: `PwmdLookup` owns the session manager and query
//!    executor; there is no module-level connection.
//! 2. **Fail Early on Config**: Socket arguments are parsed and the transport
//!    library initialised in `open`, so bad configuration stops startup.
//! 3. **Facade Pattern**: Hosts never see handles or retry loops; they get a
//!    value with a cache flag or an error with a [`HostStatus`].
//!
//! [`HostStatus`]: pwmd_common::HostStatus

use std::time::Duration;

use pwmd_common::{ArgVector, Daemon, LookupError, LookupResult};
use tracing::debug;

use crate::config::LookupConfig;
use crate::query::{LookupValue, QueryExecutor};
use crate::session::{SessionManager, SessionSettings};

/// Query-style lookup backed by a secret-store daemon.
pub struct PwmdLookup<D: Daemon> {
    file: String,
    sessions: SessionManager<D>,
    executor: QueryExecutor,
}

impl<D: Daemon> PwmdLookup<D> {
    /// Initialisation hook.
    ///
    /// Initialises the transport library and parses the socket arguments. No
    /// connection is made until the first `find`.
    ///
    /// # Errors
    /// `Init` if the transport library fails, `TooManyArguments` if the socket
    /// argument spec does not fit the connect call.
    pub fn open(config: LookupConfig, daemon: D) -> LookupResult<Self> {
        daemon
            .init()
            .map_err(|source| LookupError::Init { source })?;

        let args = match config.socket_args.as_deref() {
            Some(spec) => ArgVector::parse(spec)?,
            None => ArgVector::new(),
        };
        debug!(args = args.len(), "parsed pwmd socket arguments");

        let settings = SessionSettings::from_config(&config, args);
        Ok(PwmdLookup {
            file: config.file.unwrap_or_default(),
            sessions: SessionManager::new(daemon, settings),
            executor: QueryExecutor::new(config.retry),
        })
    }

    /// Replaces the pause used between stale-file reopen attempts.
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + 'static) -> Self {
        self.executor = QueryExecutor::with_sleeper(*self.executor.policy(), sleep);
        self
    }

    /// Lookup hook: fetches and escapes the value stored under `key`.
    pub fn find(&mut self, key: &str) -> LookupResult<LookupValue> {
        self.executor.lookup(&mut self.sessions, &self.file, key)
    }

    /// Teardown hook. Safe to call any number of times.
    pub fn tidy(&mut self) {
        self.sessions.shutdown();
    }

    /// Returns the session manager for diagnostics.
    #[inline]
    pub fn sessions(&self) -> &SessionManager<D> {
        &self.sessions
    }

    /// Returns the configured data file.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }
}
