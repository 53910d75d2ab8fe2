//! # Session Manager
//!
//! Purpose: Own the one cached daemon connection, build it lazily on the first
//! query and tear it down on shutdown or when it becomes unusable.
//!
//! ## Design Principles
//! 1. **Single Owner**: The handle lives in exactly one `SessionManager`; a
//!    host that needs cross-thread access wraps the manager in its own lock.
//! 2. **Open Once, Reuse Many**: `ensure_session` returns the cached handle
//!    without another handshake.
//! 3. **Discard, Never Repair**: A handshake failure closes the partial handle;
//!    the next query starts from scratch.
//! 4. **No Lock on Open**: A long-lived connection must not hold the data file
//!    lock and starve clients that want to save.

use pwmd_common::{
    ArgVector, Daemon, DaemonHandle, HandleOption, LookupError, LookupResult,
};
use tracing::{debug, warn};

use crate::config::{LookupConfig, DEFAULT_SOCKET_LABEL};

/// Connection parameters applied on every handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Label sent when allocating a handle.
    pub client_name: String,
    /// Daemon socket; `None` selects the daemon default.
    pub endpoint: Option<String>,
    /// Positional connect arguments.
    pub args: ArgVector,
    /// Remote lock acquisition timeout in milliseconds.
    pub lock_timeout_ms: u32,
}

impl SessionSettings {
    /// Builds settings from the host configuration and parsed socket args.
    pub fn from_config(config: &LookupConfig, args: ArgVector) -> Self {
        SessionSettings {
            client_name: config.client_name.clone(),
            endpoint: config.socket.clone(),
            args,
            lock_timeout_ms: config.lock_timeout_ms,
        }
    }

    /// Returns the endpoint for diagnostics.
    pub fn endpoint_label(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_SOCKET_LABEL)
    }
}

/// Owner of the cached daemon session.
pub struct SessionManager<D: Daemon> {
    daemon: D,
    settings: SessionSettings,
    handle: Option<D::Handle>,
    connects: u64,
}

impl<D: Daemon> SessionManager<D> {
    /// Creates a manager with no live session.
    pub fn new(daemon: D, settings: SessionSettings) -> Self {
        SessionManager {
            daemon,
            settings,
            handle: None,
            connects: 0,
        }
    }

    /// Returns the live session, connecting first if there is none.
    ///
    /// # Errors
    /// Handle allocation, option and connect failures surface as resource
    /// errors; the partially built handle is closed before returning.
    pub fn ensure_session(&mut self) -> LookupResult<&mut D::Handle> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => {
                let handle = self.handshake()?;
                self.connects += 1;
                handle
            }
        };
        Ok(self.handle.insert(handle))
    }

    /// Closes the live session, if any.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
            debug!(endpoint = self.settings.endpoint_label(), "closed pwmd session");
        }
    }

    /// Drops a session the daemon has stopped answering on.
    pub(crate) fn discard(&mut self, reason: &LookupError) {
        if let Some(handle) = self.handle.take() {
            handle.close();
            warn!(
                endpoint = self.settings.endpoint_label(),
                error = %reason,
                "discarding pwmd session"
            );
        }
    }

    /// Returns true if a session is cached.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns the number of completed handshakes.
    #[inline]
    pub fn connects(&self) -> u64 {
        self.connects
    }

    /// Returns the connection parameters.
    #[inline]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn handshake(&self) -> LookupResult<D::Handle> {
        let mut handle = self
            .daemon
            .new_handle(&self.settings.client_name)
            .map_err(|source| {
                debug!(error = %source, "failed to obtain new pwmd handle");
                LookupError::NewHandle { source }
            })?;

        match self.configure(&mut handle) {
            Ok(()) => Ok(handle),
            Err(err) => {
                handle.close();
                Err(err)
            }
        }
    }

    fn configure(&self, handle: &mut D::Handle) -> LookupResult<()> {
        set_option(handle, HandleOption::LockOnOpen(false))?;

        let args = self.settings.args.connect_args();
        handle
            .connect(self.settings.endpoint.as_deref(), args)
            .map_err(|source| LookupError::Connect {
                endpoint: self.settings.endpoint_label().to_string(),
                args: self.settings.args.to_string(),
                source,
            })?;
        debug!(
            endpoint = self.settings.endpoint_label(),
            "connected to pwmd server"
        );

        set_option(handle, HandleOption::LockTimeout(self.settings.lock_timeout_ms))
    }
}

impl<D: Daemon> Drop for SessionManager<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn set_option<H: DaemonHandle>(handle: &mut H, option: HandleOption) -> LookupResult<()> {
    handle
        .set_option(option)
        .map_err(|source| LookupError::SetOption {
            option: option.name(),
            source,
        })
}
