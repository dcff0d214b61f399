//! Shared-memory mapping collaborator.

use coproc_shmem::{SharedBuffer, ShmemError};
use coproc_wire::DataEndpoint;

/// Platform hook that maps shared buffers for the coprocessor.
///
/// Injected at [`Session`](crate::Session) construction on platforms where
/// host memory is not identity-mapped into the device's bus view (IOMMU,
/// offset windows). When absent, the session falls back to plain 16 KiB-
/// aligned heap allocations and hands their host addresses to the device —
/// valid only on flat-mapped platforms.
///
/// Every buffer produced by [`setup`](Self::setup) is returned through
/// [`teardown`](Self::teardown) when the session is dropped, regardless of
/// how the session ended.
pub trait ShmemAlloc {
    /// Obtain a device-visible buffer of at least `size` bytes for
    /// `endpoint`.
    ///
    /// # Errors
    /// [`ShmemError`] when the mapping cannot be established.
    fn setup(&mut self, endpoint: DataEndpoint, size: u64) -> Result<SharedBuffer, ShmemError>;

    /// Release a buffer previously produced by [`setup`](Self::setup).
    fn teardown(&mut self, endpoint: DataEndpoint, buffer: &SharedBuffer);
}
