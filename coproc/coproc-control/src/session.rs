//! The long-lived control session.

use core::time::Duration;

use coproc_shmem::SharedBuffer;
use coproc_wire::{DataEndpoint, Message, PowerState};

use crate::buffers::BufferAssignment;
use crate::error::Error;
use crate::shmem::ShmemAlloc;
use crate::transport::Mailbox;

/// One control session with a mailbox-attached coprocessor.
///
/// The session borrows the transport for the coprocessor's whole lifecycle
/// and owns all protocol state: the per-endpoint buffer table and the two
/// tracked power states. State changes only as a declared side effect of
/// [`boot`](Self::boot), [`poll`](Self::poll), and the power operations;
/// external code gets read-only access.
///
/// Dropping the session releases every buffer it produced: collaborator
/// buffers through [`ShmemAlloc::teardown`], self-allocated buffers through
/// the global allocator. Externally mapped buffers belong to the firmware
/// and are never touched.
pub struct Session<'a, M: Mailbox> {
    mbox: &'a mut M,
    shmem: Option<&'a mut dyn ShmemAlloc>,
    pub(crate) buffers: [Option<BufferAssignment>; DataEndpoint::COUNT],
    pub(crate) iop_power: PowerState,
    pub(crate) ap_power: PowerState,
}

impl<'a, M: Mailbox> Session<'a, M> {
    /// Create a session using the default buffer policy: 16 KiB-aligned
    /// heap allocations whose host addresses double as device addresses.
    ///
    /// Only valid on platforms with a flat, identity-mapped bus view; use
    /// [`with_shmem`](Self::with_shmem) everywhere else.
    #[must_use]
    pub fn new(mbox: &'a mut M) -> Self {
        Self {
            mbox,
            shmem: None,
            buffers: [None, None, None, None],
            iop_power: PowerState::Off,
            ap_power: PowerState::Off,
        }
    }

    /// Create a session whose buffers are mapped by `shmem`.
    #[must_use]
    pub fn with_shmem(mbox: &'a mut M, shmem: &'a mut dyn ShmemAlloc) -> Self {
        Self {
            mbox,
            shmem: Some(shmem),
            buffers: [None, None, None, None],
            iop_power: PowerState::Off,
            ap_power: PowerState::Off,
        }
    }

    /// Coprocessor power state as last reported by the firmware.
    #[inline]
    #[must_use]
    pub const fn iop_power(&self) -> PowerState {
        self.iop_power
    }

    /// Host-visible power state as last reported by the firmware.
    #[inline]
    #[must_use]
    pub const fn ap_power(&self) -> PowerState {
        self.ap_power
    }

    /// `true` once the boot handshake reached its terminal state.
    #[inline]
    #[must_use]
    pub fn is_booted(&self) -> bool {
        self.iop_power == PowerState::On
    }

    /// The buffer assigned to `endpoint`, if the firmware requested one.
    ///
    /// The crashlog buffer in particular is what the owner reads after the
    /// coprocessor panics.
    #[must_use]
    pub fn buffer(&self, endpoint: DataEndpoint) -> Option<&SharedBuffer> {
        self.buffers[endpoint.index()]
            .as_ref()
            .map(BufferAssignment::shared)
    }

    pub(crate) fn send(&mut self, message: Message) -> Result<(), Error<M::Error>> {
        self.mbox.send(message).map_err(Error::Transport)
    }

    pub(crate) fn recv(&mut self, timeout: Duration) -> Result<Message, Error<M::Error>> {
        self.mbox.recv(timeout).map_err(Error::Transport)
    }

    pub(crate) fn shmem(&mut self) -> Option<&mut (dyn ShmemAlloc + 'a)> {
        self.shmem.as_deref_mut()
    }
}

impl<M: Mailbox> Drop for Session<'_, M> {
    fn drop(&mut self) {
        for endpoint in DataEndpoint::ALL {
            let Some(assignment) = self.buffers[endpoint.index()].take() else {
                continue;
            };
            // Heap regions free themselves; external mappings are not ours.
            if assignment.is_collaborator_owned() {
                if let Some(shmem) = self.shmem.as_deref_mut() {
                    shmem.teardown(endpoint, assignment.shared());
                }
            }
        }
    }
}
