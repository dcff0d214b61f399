//! Shared-buffer requests and the per-endpoint buffer table.
//!
//! The firmware asks for one buffer per data endpoint, at most once per
//! session. A request either carries a device address (the firmware mapped
//! the buffer itself) or asks the host to provide memory, in which case the
//! configured [`ShmemAlloc`](crate::ShmemAlloc) collaborator — or, absent
//! one, a 16 KiB-aligned heap allocation — resolves it and the host replies
//! with the result.

use coproc_shmem::{HeapRegion, SharedBuffer};
use coproc_wire::buffer::{BufferRequest, OsLogPayload};
use coproc_wire::{DataEndpoint, Message};

use crate::error::{Error, ProtocolViolation};
use crate::session::Session;
use crate::transport::Mailbox;

/// Where an assigned buffer's memory came from; decides who releases it.
#[derive(Debug)]
enum Origin {
    /// Address supplied by the firmware; never touched by the host.
    External,
    /// Produced by the mapping collaborator; released through it.
    Collaborator,
    /// Self-allocated heap memory; freed when the region drops.
    Heap(HeapRegion),
}

/// One row of the session's buffer table.
#[derive(Debug)]
pub(crate) struct BufferAssignment {
    shared: SharedBuffer,
    origin: Origin,
}

impl BufferAssignment {
    pub(crate) const fn shared(&self) -> &SharedBuffer {
        &self.shared
    }

    pub(crate) const fn is_collaborator_owned(&self) -> bool {
        matches!(self.origin, Origin::Collaborator)
    }
}

impl<M: Mailbox> Session<'_, M> {
    /// Service one buffer request for `endpoint`.
    ///
    /// `payload` is decoded with the layout matching the endpoint: the
    /// OS-log endpoint counts size in bytes and stores the address in 4 KiB
    /// pages; the other endpoints count size in 4 KiB units and carry the
    /// address raw.
    pub(crate) fn handle_buffer_request(
        &mut self,
        endpoint: DataEndpoint,
        payload: u64,
    ) -> Result<(), Error<M::Error>> {
        let (size, addr) = match endpoint {
            DataEndpoint::OsLog => {
                let p = OsLogPayload::from_bits(payload);
                (u64::from(p.size_bytes()), p.address())
            }
            _ => {
                let p = BufferRequest::from_bits(payload);
                (p.size_bytes(), p.address())
            }
        };

        if size == 0 {
            return Err(ProtocolViolation::ZeroSizeBuffer(endpoint).into());
        }
        if self.buffers[endpoint.index()].is_some() {
            return Err(ProtocolViolation::BufferReassigned(endpoint).into());
        }

        // The firmware mapped the buffer itself; it already knows the
        // address, so no reply goes out.
        if !addr.is_null() {
            log::debug!("{endpoint}: firmware-mapped buffer of {size:#x} bytes at {addr}");
            self.buffers[endpoint.index()] = Some(BufferAssignment {
                shared: SharedBuffer { dva: addr, size },
                origin: Origin::External,
            });
            return Ok(());
        }

        let (shared, origin) = match self.shmem() {
            Some(shmem) => (shmem.setup(endpoint, size)?, Origin::Collaborator),
            None => {
                let region = HeapRegion::alloc_zeroed(size)?;
                let shared = SharedBuffer {
                    dva: region.device_addr(),
                    size,
                };
                (shared, Origin::Heap(region))
            }
        };
        log::debug!("{endpoint}: assigned {:#x} bytes at {}", shared.size, shared.dva);

        let reply = match endpoint {
            DataEndpoint::OsLog => OsLogPayload::buffer_reply(shared).into_bits(),
            _ => BufferRequest::reply(shared).into_bits(),
        };
        self.buffers[endpoint.index()] = Some(BufferAssignment { shared, origin });
        self.send(Message::new(reply, endpoint.endpoint()))
    }
}
