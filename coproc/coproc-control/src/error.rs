//! Failure taxonomy of the control engine.
//!
//! Every fatal condition is a typed variant returned to the immediate
//! caller; nothing is swallowed. The only deliberately ignored conditions
//! are the two soft dispatch cases (unknown management tag, unknown OS-log
//! chatter), which are logged and never reach this type.

use coproc_shmem::ShmemError;
use coproc_wire::{DataEndpoint, PROTOCOL_VERSION_MAX, PROTOCOL_VERSION_MIN};

/// Firmware behavior outside its documented contract.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    /// A buffer request with a zero size field; always an error.
    #[error("zero-size buffer request on {0}")]
    ZeroSizeBuffer(DataEndpoint),

    /// A buffer request for an endpoint whose buffer is already assigned.
    /// Assignment happens at most once per session; this is not a refresh.
    #[error("buffer on {0} requested twice")]
    BufferReassigned(DataEndpoint),
}

/// Anything the boot handshake, dispatcher, or power control can fail with.
///
/// `E` is the transport's error type; transport failures (including receive
/// timeouts) are propagated verbatim and never retried by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<E> {
    /// The mailbox transport failed; carries the transport's own error.
    #[error("mailbox transport failed")]
    Transport(E),

    /// The firmware's advertised version window does not overlap the
    /// window this engine supports. Requires a firmware or host update.
    #[error(
        "firmware offers protocol versions {min}..={max}, host supports {}..={}",
        PROTOCOL_VERSION_MIN,
        PROTOCOL_VERSION_MAX
    )]
    UnsupportedVersion {
        /// Lowest version the firmware offered.
        min: u16,
        /// Highest version the firmware offered.
        max: u16,
    },

    /// A message that does not belong at the current protocol step.
    #[error("unexpected message {payload:#018x} on endpoint {endpoint:#x}")]
    UnexpectedMessage {
        /// Endpoint the message arrived on.
        endpoint: u32,
        /// Raw payload word.
        payload: u64,
    },

    /// A message on an endpoint the dispatcher does not know; indicates a
    /// discovery/startup mismatch.
    #[error("message on unknown endpoint {0:#x}")]
    UnexpectedEndpoint(u32),

    /// See [`ProtocolViolation`].
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// Backing memory for a shared buffer could not be obtained. Session
    /// state is intact; the caller may resume polling.
    #[error("buffer allocation failed: {0}")]
    OutOfMemory(#[from] ShmemError),

    /// The injected [`CancelToken`](crate::CancelToken) fired between
    /// dispatch steps.
    #[error("operation cancelled")]
    Cancelled,
}
