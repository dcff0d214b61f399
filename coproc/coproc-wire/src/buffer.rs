//! # Buffer-Request Payload Layouts
//!
//! The firmware asks the host for a shared buffer with one message per data
//! endpoint. Two layouts exist on the wire:
//!
//! - the **generic** layout (crashlog, syslog, ioreport): size in 4 KiB
//!   units in bits `[51:44]`, raw device address in bits `[41:0]`, type tag
//!   in the common `[59:52]` position;
//! - the **OS-log** layout: its own tag space in bits `[63:56]`, size in
//!   bytes in `[55:36]`, and the device address as a count of 4 KiB pages in
//!   `[35:0]`.
//!
//! Both layouts are used for the request and for the host's reply; the reply
//! carries the resolved size and address in the same fields. The accessors
//! below perform the unit conversions exactly — 4 KiB size units on the
//! generic layout, 4 KiB address pages on the OS-log layout — so callers
//! only ever see byte sizes and [`DeviceAddr`] values.

use crate::mgmt::MgmtType;
use bitfield_struct::bitfield;
use coproc_shmem::{DeviceAddr, PAGE_SHIFT, SharedBuffer};

/// Buffer-request type tag in the generic (`[59:52]`) tag space.
pub const BUFFER_REQUEST: u8 = 0x1;

/// Buffer-request type tag in the OS-log (`[63:56]`) tag space.
pub const OSLOG_BUFFER_REQUEST: u8 = 0x1;

/// Generic buffer-request payload (crashlog, syslog, ioreport endpoints).
#[bitfield(u64)]
pub struct BufferRequest {
    #[bits(42)]
    addr_raw: u64,

    #[bits(2)]
    _pad0: u8,

    #[bits(8)]
    size_pages: u8,

    /// Message type tag (generic tag space).
    #[bits(8)]
    pub msg_type: u8,

    #[bits(4)]
    _pad1: u8,
}

impl BufferRequest {
    /// Requested (or resolved) buffer size in bytes.
    #[inline]
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        (self.size_pages() as u64) << PAGE_SHIFT
    }

    /// Device address carried in the request; null when the firmware wants
    /// the host to allocate.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> DeviceAddr {
        DeviceAddr::new(self.addr_raw())
    }

    /// Replace the size field (stored in 4 KiB units).
    #[inline]
    #[must_use]
    pub const fn with_size_bytes(self, bytes: u64) -> Self {
        self.with_size_pages((bytes >> PAGE_SHIFT) as u8)
    }

    /// Replace the address field; bits above the 42-bit wire width are
    /// discarded.
    #[inline]
    #[must_use]
    pub const fn with_address(self, addr: DeviceAddr) -> Self {
        self.with_addr_raw(addr.as_u64() & ((1 << 42) - 1))
    }

    /// Build the host's reply announcing a resolved buffer.
    #[inline]
    #[must_use]
    pub const fn reply(buffer: SharedBuffer) -> Self {
        Self::new()
            .with_address(buffer.dva)
            .with_size_bytes(buffer.size)
            .with_msg_type(BUFFER_REQUEST)
    }
}

/// OS-log endpoint payload; note the distinct tag position.
#[bitfield(u64)]
pub struct OsLogPayload {
    #[bits(36)]
    addr_pages: u64,

    /// Buffer size in bytes.
    #[bits(20)]
    pub size_bytes: u32,

    /// Message type tag (OS-log tag space, bits `[63:56]`).
    #[bits(8)]
    pub msg_type: u8,
}

impl OsLogPayload {
    /// Device address carried in the payload (stored as 4 KiB pages).
    #[inline]
    #[must_use]
    pub const fn address(&self) -> DeviceAddr {
        DeviceAddr::from_pages_4k(self.addr_pages())
    }

    /// Replace the address field (stored as 4 KiB pages).
    ///
    /// The address must be 4 KiB-aligned; low bits cannot be represented on
    /// the wire, and bits above the 36-bit page field are discarded.
    #[inline]
    #[must_use]
    pub const fn with_address(self, addr: DeviceAddr) -> Self {
        debug_assert!(addr.is_aligned(1 << PAGE_SHIFT));
        self.with_addr_pages(addr.pages_4k() & ((1 << 36) - 1))
    }

    /// Build the host's reply announcing a resolved buffer.
    #[inline]
    #[must_use]
    pub const fn buffer_reply(buffer: SharedBuffer) -> Self {
        Self::new()
            .with_address(buffer.dva)
            .with_size_bytes((buffer.size as u32) & 0xF_FFFF)
            .with_msg_type(OSLOG_BUFFER_REQUEST)
    }
}
