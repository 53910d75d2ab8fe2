// pwmd-common - Shared types for the pwmd lookup connector
//
// This crate defines the socket argument vector, the error taxonomy and the
// command-level surface of the daemon transport.

pub mod args;
pub mod error;
pub mod protocol;

// Re-export for convenience
pub use args::*;
pub use error::*;
pub use protocol::*;
