//! Mailbox message value: one 64-bit payload word plus its endpoint.

use crate::endpoint;

/// One mailbox transfer.
///
/// Messages are transient: constructed, sent, or received-and-decoded
/// immediately. The payload's type tag is only meaningful relative to the
/// endpoint the message was received on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Message {
    /// Tagged payload word; decode with the layout types in this crate.
    pub payload: u64,
    /// Endpoint the message belongs to.
    pub endpoint: u32,
}

impl Message {
    /// Construct a message for an arbitrary endpoint.
    #[inline]
    #[must_use]
    pub const fn new(payload: u64, endpoint: u32) -> Self {
        Self { payload, endpoint }
    }

    /// Construct a message on the management endpoint.
    #[inline]
    #[must_use]
    pub const fn mgmt(payload: u64) -> Self {
        Self::new(payload, endpoint::MGMT)
    }
}
