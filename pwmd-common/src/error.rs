//! # Error Taxonomy
//!
//! Every failure the connector reports to its host is a [`LookupError`]. Each
//! variant belongs to one [`ErrorClass`], and the class decides the host
//! verdict: configuration problems are permanent, everything else is worth
//! retrying later.
//!
//! Daemon codes and descriptions are kept verbatim inside the variants so the
//! host log shows what the daemon said.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::protocol::{ErrorCode, TransportError};

/// Result type for connector operations.
pub type LookupResult<T> = Result<T, LookupError>;

/// Coarse classification of a [`LookupError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The connector is misconfigured; retrying cannot help.
    Config,
    /// A session or buffer could not be set up; try again later.
    Resource,
    /// The daemon rejected an open or command.
    Protocol,
}

impl ErrorClass {
    /// Returns true if the caller may re-invoke the lookup later.
    #[inline]
    pub const fn is_retryable(self) -> bool {
        !matches!(self, ErrorClass::Config)
    }

    /// Returns the verdict to hand back to the host.
    #[inline]
    pub const fn status(self) -> HostStatus {
        if self.is_retryable() {
            HostStatus::Defer
        } else {
            HostStatus::Fail
        }
    }
}

/// Verdict reported to the host's lookup framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostStatus {
    /// Temporarily unavailable, try later.
    Defer,
    /// Permanently misconfigured.
    Fail,
}

/// Errors surfaced by the connector.
#[derive(Debug, Error)]
pub enum LookupError {
    /// A required configuration value is absent or empty.
    #[error("required parameter {name} is not set")]
    MissingParameter { name: &'static str },

    /// The socket argument spec has more segments than connect slots.
    #[error("too many parameters to connect (max={max})")]
    TooManyArguments { max: usize },

    /// The transport library refused to initialise.
    #[error("error initializing transport: {source}")]
    Init { source: TransportError },

    /// A new session handle could not be allocated.
    #[error("new handle: {source}")]
    NewHandle { source: TransportError },

    /// Setting a handle option failed during the handshake.
    #[error("error while setting {option}: {source}")]
    SetOption {
        option: &'static str,
        source: TransportError,
    },

    /// The connect handshake failed.
    #[error("connect to {endpoint}: {source} ({args})")]
    Connect {
        endpoint: String,
        args: String,
        source: TransportError,
    },

    /// The escape buffer could not be reserved.
    #[error("failed to reserve {len} bytes while escaping command result")]
    EscapeAlloc {
        len: usize,
        #[source]
        source: Option<TryReserveError>,
    },

    /// Open or command failed with a non-stale daemon error.
    #[error("deferring due to daemon error {source}")]
    Daemon { source: TransportError },

    /// The data file kept changing for the whole retry budget.
    #[error("data file still modified after {attempts} attempts: {source}")]
    StaleRetriesExhausted {
        attempts: u32,
        source: TransportError,
    },
}

impl LookupError {
    /// Returns the class this error belongs to.
    pub const fn class(&self) -> ErrorClass {
        match self {
            LookupError::MissingParameter { .. }
            | LookupError::TooManyArguments { .. }
            | LookupError::Init { .. } => ErrorClass::Config,
            LookupError::NewHandle { .. }
            | LookupError::SetOption { .. }
            | LookupError::Connect { .. }
            | LookupError::EscapeAlloc { .. } => ErrorClass::Resource,
            LookupError::Daemon { .. } | LookupError::StaleRetriesExhausted { .. } => {
                ErrorClass::Protocol
            }
        }
    }

    /// Returns the verdict to hand back to the host.
    #[inline]
    pub const fn status(&self) -> HostStatus {
        self.class().status()
    }

    /// Returns true if the caller may re-invoke the lookup later.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        self.class().is_retryable()
    }

    /// Returns the daemon error code, if the failure came from the transport.
    pub fn code(&self) -> Option<ErrorCode> {
        self.transport().map(|err| err.code)
    }

    /// Returns the underlying transport error, if any.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            LookupError::Init { source }
            | LookupError::NewHandle { source }
            | LookupError::SetOption { source, .. }
            | LookupError::Connect { source, .. }
            | LookupError::Daemon { source }
            | LookupError::StaleRetriesExhausted { source, .. } => Some(source),
            LookupError::MissingParameter { .. }
            | LookupError::TooManyArguments { .. }
            | LookupError::EscapeAlloc { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daemon_err() -> TransportError {
        TransportError::new(536870969, "Not found")
    }

    #[test]
    fn test_config_errors_fail() {
        let missing = LookupError::MissingParameter { name: "pwmd_file" };
        assert_eq!(missing.class(), ErrorClass::Config);
        assert_eq!(missing.status(), HostStatus::Fail);
        assert!(!missing.is_retryable());

        let too_many = LookupError::TooManyArguments { max: 8 };
        assert_eq!(too_many.status(), HostStatus::Fail);

        let init = LookupError::Init { source: daemon_err() };
        assert_eq!(init.status(), HostStatus::Fail);
    }

    #[test]
    fn test_resource_and_protocol_errors_defer() {
        let errors = [
            LookupError::NewHandle { source: daemon_err() },
            LookupError::SetOption {
                option: "LOCK_TIMEOUT",
                source: daemon_err(),
            },
            LookupError::Connect {
                endpoint: "default socket".to_string(),
                args: String::new(),
                source: daemon_err(),
            },
            LookupError::EscapeAlloc {
                len: usize::MAX,
                source: None,
            },
            LookupError::Daemon { source: daemon_err() },
            LookupError::StaleRetriesExhausted {
                attempts: 3,
                source: daemon_err(),
            },
        ];

        for err in errors {
            assert!(err.is_retryable(), "{err} should be retryable");
            assert_eq!(err.status(), HostStatus::Defer);
        }
    }

    #[test]
    fn test_messages_keep_daemon_text() {
        let err = LookupError::Daemon { source: daemon_err() };
        assert_eq!(err.to_string(), "deferring due to daemon error 536870969: Not found");
        assert_eq!(err.code(), Some(ErrorCode::new(536870969)));

        let missing = LookupError::MissingParameter { name: "pwmd_file" };
        assert_eq!(missing.to_string(), "required parameter pwmd_file is not set");
        assert!(missing.code().is_none());
    }
}
