//! # Transport Surface
//!
//! Purpose: Describe the command-level contract of the secret-store daemon
//! connection without implementing its wire protocol.
//!
//! ## Design Principles
//!
//! 1. **Ports, not Drivers**: `Daemon` and `DaemonHandle` are the only seams the
//!    connector talks through; a binding to the real client library lives with
//!    the host.
//! 2. **Fixed Arity at the Edge**: `connect` always receives all eight
//!    positional slots, mirroring the daemon's connect call.
//! 3. **Owned Responses**: command output is an associated type so a binding can
//!    hand back a daemon-allocated buffer and free it in its `Drop`.
//!
//! ## Error Codes
//!
//! Daemon errors are 32-bit values whose low 16 bits hold the error code and
//! whose high bits identify the error source. Only the code part is compared.
//!
//! ```text
//! +-----------------+-----------------+
//! | source: 16 bits | code: 16 bits   |
//! +-----------------+-----------------+
//! ```

use std::fmt;

use thiserror::Error;

use crate::args::ARG_MAX;

/// Raw 32-bit error value reported by the daemon transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    /// Data file checksum changed since it was opened (another client saved).
    pub const CHECKSUM: u16 = 10;

    /// Peer closed the connection.
    pub const EOF: u16 = 16383;

    const CODE_MASK: u32 = 0xFFFF;

    /// Wraps a raw error value.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ErrorCode(raw)
    }

    /// Returns the full value including the source bits.
    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Returns the code part with the source bits stripped.
    #[inline]
    pub const fn code(&self) -> u16 {
        (self.0 & Self::CODE_MASK) as u16
    }

    /// Returns true if the remote data file was modified after it was opened.
    #[inline]
    pub const fn is_checksum(&self) -> bool {
        self.code() == Self::CHECKSUM
    }

    /// Returns true if the daemon dropped the connection.
    #[inline]
    pub const fn is_eof(&self) -> bool {
        self.code() == Self::EOF
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure reported by a transport call, with the driver-native description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {description}")]
pub struct TransportError {
    /// Raw daemon error value.
    pub code: ErrorCode,
    /// Description text as produced by the daemon's error library.
    pub description: String,
}

impl TransportError {
    /// Builds an error from a raw code and description.
    pub fn new(code: u32, description: impl Into<String>) -> Self {
        TransportError {
            code: ErrorCode::new(code),
            description: description.into(),
        }
    }

    /// Returns true if the caller should reopen the data file and retry.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.code.is_checksum()
    }

    /// Returns true if the session can no longer be used.
    #[inline]
    pub fn is_connection_lost(&self) -> bool {
        self.code.is_eof()
    }
}

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Per-handle options the connector sets during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOption {
    /// Take the data file lock as part of `open`.
    LockOnOpen(bool),
    /// Milliseconds to wait for a remote lock before giving up.
    LockTimeout(u32),
}

impl HandleOption {
    /// Returns the option name used in diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            HandleOption::LockOnOpen(_) => "LOCK_ON_OPEN",
            HandleOption::LockTimeout(_) => "LOCK_TIMEOUT",
        }
    }
}

impl fmt::Display for HandleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleOption::LockOnOpen(enabled) => write!(f, "{}={}", self.name(), enabled),
            HandleOption::LockTimeout(ms) => write!(f, "{}={}", self.name(), ms),
        }
    }
}

/// Positional connect arguments at full arity; `None` selects the default.
pub type ConnectArgs<'a> = [Option<&'a str>; ARG_MAX];

/// Factory side of the transport: library setup and handle allocation.
pub trait Daemon {
    /// Connection handle produced by this transport.
    type Handle: DaemonHandle;

    /// One-time library initialisation, run when the connector is opened.
    fn init(&self) -> TransportResult<()> {
        Ok(())
    }

    /// Allocates an unconnected handle labelled with `client_name`.
    fn new_handle(&self, client_name: &str) -> TransportResult<Self::Handle>;
}

/// A single daemon connection.
pub trait DaemonHandle {
    /// Raw command output. Released when dropped.
    ///
    /// The daemon hands back bytes; the binding owns decoding them as UTF-8
    /// (and rejecting or replacing invalid sequences) before escaping sees
    /// the text.
    type Response: AsRef<str>;

    /// Sets a handle option.
    fn set_option(&mut self, option: HandleOption) -> TransportResult<()>;

    /// Performs the connect handshake. `endpoint` of `None` selects the
    /// daemon's default socket.
    fn connect(&mut self, endpoint: Option<&str>, args: ConnectArgs<'_>) -> TransportResult<()>;

    /// Opens a data file on the connected session.
    fn open(&mut self, file: &str) -> TransportResult<()>;

    /// Issues a protocol command against the open data file.
    fn command(&mut self, command: &str) -> TransportResult<Self::Response>;

    /// Closes the connection and releases the handle.
    fn close(self);
}
