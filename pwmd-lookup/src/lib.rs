//! # pwmd Lookup Connector
//!
//! Purpose: Fetch single secret values from a pwmd-style secret-store daemon on
//! behalf of a query-driven host, one synchronous lookup at a time.
//!
//! ## Design Principles
//! 1. **One Session**: A single cached connection is reused by every query and
//!    rebuilt only after it is torn down.
//! 2. **Transport as a Port**: The daemon connection is reached through the
//!    `Daemon`/`DaemonHandle` traits from `pwmd-common`.
//! 3. **Classified Failures**: Every error maps to defer (try later) or fail
//!    (misconfigured) for the host.
//! 4. **Expansion-Safe Output**: Returned values have `$` and `\` escaped.

mod config;
mod escape;
mod lookup;
mod query;
mod session;

pub use config::{
    ConfigLoadError, LookupConfig, RetryPolicy, DEFAULT_CLIENT_NAME, DEFAULT_LOCK_TIMEOUT_MS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_SOCKET_LABEL,
};
pub use escape::escape_value;
pub use lookup::PwmdLookup;
pub use query::{LookupValue, QueryExecutor, FILE_PARAMETER};
pub use session::{SessionManager, SessionSettings};

pub use pwmd_common::{
    ArgVector, ConnectArgs, Daemon, DaemonHandle, ErrorClass, ErrorCode, HandleOption, HostStatus,
    LookupError, LookupResult, TransportError, TransportResult, ARG_MAX,
};
