//! # Coprocessor Mailbox Wire Format
//!
//! Bit-exact, stateless encode/decode for the two-word messages exchanged
//! with the coprocessor firmware over the hardware mailbox.
//!
//! ## Overview
//!
//! Every mailbox transfer is a [`Message`]: a 64-bit payload word plus a
//! 32-bit endpoint number. The payload is a tagged union of sub-fields whose
//! meaning depends on the endpoint the message was received on — the same bit
//! pattern decodes differently on the management endpoint and on the OS-log
//! endpoint. Each distinct layout is modeled as its own `#[bitfield(u64)]`
//! type with typed accessors, so protocol code never masks or shifts by hand:
//!
//! | Layout | Endpoint | Module |
//! |--------|----------|--------|
//! | [`MgmtHeader`] | management (classification only) | [`mgmt`] |
//! | [`HelloPayload`], [`PowerStatePayload`], [`EpMapPayload`], [`EpMapAck`], [`StartEpPayload`] | management | [`mgmt`] |
//! | [`BufferRequest`] | crashlog / syslog / ioreport | [`buffer`] |
//! | [`OsLogPayload`] | oslog (its own tag space) | [`buffer`] |
//!
//! ## Scope
//!
//! This crate is pure data: no I/O, no state, no failure modes. Values that
//! do not fit a field are truncated to the field width, exactly as the wire
//! would truncate them.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::cast_possible_truncation)]

pub mod buffer;
pub mod endpoint;
pub mod mgmt;
mod message;

pub use crate::buffer::{BufferRequest, OsLogPayload};
pub use crate::endpoint::DataEndpoint;
pub use crate::message::Message;
pub use crate::mgmt::{
    EpMapAck, EpMapPayload, HelloPayload, MgmtHeader, MgmtType, PowerState, PowerStatePayload,
    StartEpPayload,
};

/// Lowest protocol version this engine can negotiate.
pub const PROTOCOL_VERSION_MIN: u16 = 11;

/// Highest protocol version this engine can negotiate.
pub const PROTOCOL_VERSION_MAX: u16 = 12;
