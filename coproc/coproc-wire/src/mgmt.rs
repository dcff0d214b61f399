//! # Management-Endpoint Payload Layouts
//!
//! Wire layouts for the messages carried on the management endpoint: the
//! version handshake, the paged endpoint map, endpoint start requests, and
//! power-state control.
//!
//! All management payloads share one classification field, the 8-bit type
//! tag in bits `[59:52]`, modeled by [`MgmtHeader`]. The remaining bits are
//! layout-specific:
//!
//! | Bits | Hello | EndpointMap | EndpointMap ack | StartEndpoint | power messages |
//! |------|-------|-------------|-----------------|---------------|----------------|
//! | 0 | min version | bitmap | "more" flag | — | power state |
//! | 1 | min version | bitmap | — | start flag (always set) | power state |
//! | 2–15 | min version | bitmap | — | — | power state |
//! | 16–31 | max version | bitmap | — | — | — |
//! | 32–34 | — | base page | base page | target endpoint | — |
//! | 35–39 | — | — | — | target endpoint | — |
//! | 51 | — | "last page" flag | "last page" flag | — | — |
//! | 52–59 | type tag | type tag | type tag | type tag | type tag |

use bitfield_struct::bitfield;
use core::fmt;

/// Management message type tags (bits `[59:52]` of the payload).
///
/// The endpoint-map acknowledgement shares [`MgmtType::EndpointMap`]'s tag;
/// direction disambiguates it.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MgmtType {
    /// Firmware announces its supported protocol version window.
    Hello = 0x1,
    /// Host accepts a negotiated version.
    HelloReply = 0x2,
    /// Host asks the firmware to start an endpoint.
    StartEndpoint = 0x5,
    /// Host requests a coprocessor power state.
    SetIopPowerState = 0x6,
    /// Firmware acknowledges a coprocessor power-state change.
    SetIopPowerStateAck = 0x7,
    /// One page of the firmware's endpoint bitmap (and the host's ack).
    EndpointMap = 0x8,
    /// Host-visible power state, in either direction.
    SetApPowerState = 0xb,
}

impl MgmtType {
    /// The wire tag value.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Classify a received tag; `None` for tags this engine does not know.
    #[inline]
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x1 => Some(Self::Hello),
            0x2 => Some(Self::HelloReply),
            0x5 => Some(Self::StartEndpoint),
            0x6 => Some(Self::SetIopPowerState),
            0x7 => Some(Self::SetIopPowerStateAck),
            0x8 => Some(Self::EndpointMap),
            0xb => Some(Self::SetApPowerState),
            _ => None,
        }
    }
}

/// Coprocessor / host power state as carried in the 16-bit wire field.
///
/// Only the four named states are ever compared against; any other value the
/// firmware reports is preserved opaquely in [`PowerState::Other`] and
/// round-trips without loss. Always construct from the wire via
/// [`PowerState::from_raw`] so named values never hide inside `Other`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PowerState {
    /// Fully off (0x00).
    Off,
    /// Sleeping (0x01).
    Sleep,
    /// Quiesced (0x10).
    Quiesced,
    /// Running (0x20).
    On,
    /// Any vendor-defined value; compared only for equality.
    Other(u16),
}

impl PowerState {
    /// Decode a wire value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0x00 => Self::Off,
            0x01 => Self::Sleep,
            0x10 => Self::Quiesced,
            0x20 => Self::On,
            other => Self::Other(other),
        }
    }

    /// Encode for the wire.
    #[inline]
    #[must_use]
    pub const fn into_raw(self) -> u16 {
        match self {
            Self::Off => 0x00,
            Self::Sleep => 0x01,
            Self::Quiesced => 0x10,
            Self::On => 0x20,
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Sleep => f.write_str("sleep"),
            Self::Quiesced => f.write_str("quiesced"),
            Self::On => f.write_str("on"),
            Self::Other(raw) => write!(f, "{raw:#x}"),
        }
    }
}

/// Classification view of any management-style payload: just the type tag.
#[bitfield(u64)]
pub struct MgmtHeader {
    #[bits(52)]
    _pad0: u64,

    /// Message type tag (bits `[59:52]`).
    #[bits(8)]
    pub msg_type: u8,

    #[bits(4)]
    _pad1: u8,
}

/// Version handshake payload (`Hello` from the firmware, `HelloReply` back).
///
/// The reply carries the negotiated version in both fields.
#[bitfield(u64)]
pub struct HelloPayload {
    /// Lowest protocol version the sender supports.
    pub min_version: u16,

    /// Highest protocol version the sender supports.
    pub max_version: u16,

    #[bits(20)]
    _pad0: u32,

    /// Message type tag.
    #[bits(8)]
    pub msg_type: u8,

    #[bits(4)]
    _pad1: u8,
}

impl HelloPayload {
    /// Build the host's `HelloReply` accepting `version`.
    #[inline]
    #[must_use]
    pub const fn reply(version: u16) -> Self {
        Self::new()
            .with_min_version(version)
            .with_max_version(version)
            .with_msg_type(MgmtType::HelloReply.tag())
    }
}

/// Power-state payload, shared by `SetIopPowerState`, its ack, and
/// `SetApPowerState` in both directions.
#[bitfield(u64)]
pub struct PowerStatePayload {
    #[bits(16)]
    state_raw: u16,

    #[bits(36)]
    _pad0: u64,

    /// Message type tag.
    #[bits(8)]
    pub msg_type: u8,

    #[bits(4)]
    _pad1: u8,
}

impl PowerStatePayload {
    /// The carried power state.
    #[inline]
    #[must_use]
    pub const fn power_state(&self) -> PowerState {
        PowerState::from_raw(self.state_raw())
    }

    /// Replace the carried power state.
    #[inline]
    #[must_use]
    pub const fn with_power_state(self, state: PowerState) -> Self {
        self.with_state_raw(state.into_raw())
    }

    /// Request a coprocessor power state.
    #[inline]
    #[must_use]
    pub const fn set_iop(state: PowerState) -> Self {
        Self::new()
            .with_state_raw(state.into_raw())
            .with_msg_type(MgmtType::SetIopPowerState.tag())
    }

    /// Request a host-visible power state.
    #[inline]
    #[must_use]
    pub const fn set_ap(state: PowerState) -> Self {
        Self::new()
            .with_state_raw(state.into_raw())
            .with_msg_type(MgmtType::SetApPowerState.tag())
    }
}

/// One page of the firmware's endpoint bitmap.
///
/// Endpoint `base * 32 + i` exists for every set bit `i`. The final page
/// carries the "last page" flag.
#[bitfield(u64)]
pub struct EpMapPayload {
    /// 32 endpoint-presence bits for this page.
    pub bitmap: u32,

    /// Page index (endpoint numbers start at `base * 32`).
    #[bits(3)]
    pub base: u8,

    #[bits(16)]
    _pad0: u32,

    /// Set on the final page.
    pub last: bool,

    /// Message type tag.
    #[bits(8)]
    pub msg_type: u8,

    #[bits(4)]
    _pad1: u8,
}

/// Host acknowledgement for one endpoint-map page.
///
/// Carries the acknowledged base and exactly one of the "more" / "last"
/// flags, depending on whether the inbound page was the final one.
#[bitfield(u64)]
pub struct EpMapAck {
    /// More pages expected.
    pub more: bool,

    #[bits(31)]
    _pad0: u32,

    /// Base of the acknowledged page.
    #[bits(3)]
    pub base: u8,

    #[bits(16)]
    _pad1: u32,

    /// The acknowledged page was the final one.
    pub last: bool,

    /// Message type tag.
    #[bits(8)]
    pub msg_type: u8,

    #[bits(4)]
    _pad2: u8,
}

impl EpMapAck {
    /// Acknowledge the page at `base`; `last` mirrors the inbound flag.
    #[inline]
    #[must_use]
    pub const fn ack(base: u8, last: bool) -> Self {
        Self::new()
            .with_base(base)
            .with_last(last)
            .with_more(!last)
            .with_msg_type(MgmtType::EndpointMap.tag())
    }
}

/// Host request to start one endpoint.
#[bitfield(u64)]
pub struct StartEpPayload {
    #[bits(1)]
    _pad0: u8,

    /// Always set on a start request.
    pub start: bool,

    #[bits(30)]
    _pad1: u32,

    /// Endpoint to start.
    pub endpoint: u8,

    #[bits(12)]
    _pad2: u16,

    /// Message type tag.
    #[bits(8)]
    pub msg_type: u8,

    #[bits(4)]
    _pad3: u8,
}

impl StartEpPayload {
    /// Build a start request for `endpoint`.
    #[inline]
    #[must_use]
    pub const fn start_request(endpoint: u8) -> Self {
        Self::new()
            .with_start(true)
            .with_endpoint(endpoint)
            .with_msg_type(MgmtType::StartEndpoint.tag())
    }
}
