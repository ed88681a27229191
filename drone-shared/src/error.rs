//! Error type for the shared substrate.

use thiserror::Error;

/// Errors raised by `drone-shared` itself. Actor-loop-level policy (retry,
/// reconnect, abort) lives in the `drone` binary; this type only names the
/// conditions that policy reacts to.
#[derive(Debug, Error)]
pub enum SharedError {
    #[error("invalid IPv4 address {0:?}")]
    InvalidAddress(String),

    #[error("port {0} is not a valid 16-bit port number")]
    InvalidPort(String),

    #[error("expected {expected} CLI arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("datagram payload of {len} bytes does not match Action wire size")]
    MalformedCommand { len: usize },

    #[error("attempted to reinitialize synchronization primitives without stopping every actor first")]
    ResetWithoutQuiesce,
}
