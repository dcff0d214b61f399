//! # Coprocessor Boot & Runtime Control
//!
//! The protocol engine that brings a mailbox-attached coprocessor up and
//! keeps it serviced: wake, protocol version negotiation, endpoint discovery
//! and start, firmware-initiated shared-buffer requests, and power-state
//! transitions.
//!
//! ## Overview
//!
//! Everything revolves around one long-lived [`Session`] that borrows the
//! mailbox transport (and, optionally, a shared-memory mapping collaborator)
//! for the coprocessor's whole lifecycle:
//!
//! ```text
//!          ┌──────────────────────────────────────────┐
//!          │                 Session                  │
//!          ├──────────────────────────────────────────┤
//!  boot()  │ wake → hello → endpoint map → start →    │
//!          │ settle (poll until coprocessor is ON)    │
//!  poll()  │ one receive: buffer requests, endpoint   │
//!          │ acks, power-state tracking               │
//!  power   │ set_ap_power() / shutdown()              │
//!          └──────┬──────────────────────┬────────────┘
//!                 │ Mailbox              │ ShmemAlloc (optional)
//!                 ▼                      ▼
//!          hardware mailbox      buffer mapping policy
//! ```
//!
//! The design is single-threaded and caller-driven: nothing runs in the
//! background, and the only blocking points are the transport's send and
//! timeout-bounded receive. Loops that drive [`Session::poll`] repeatedly
//! (boot settle, power transitions) consult a [`CancelToken`] between steps;
//! [`Never`] reproduces the classic unbounded behavior.
//!
//! ## Logging
//!
//! The engine logs through the [`log`] facade and never installs a logger;
//! the owning firmware decides where the output goes.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod buffers;
mod dispatch;
mod error;
mod handshake;
mod power;
mod session;
mod shmem;
mod transport;

pub use crate::error::{Error, ProtocolViolation};
pub use crate::handshake::HANDSHAKE_TIMEOUT;
pub use crate::session::Session;
pub use crate::shmem::ShmemAlloc;
pub use crate::transport::{CancelToken, Mailbox, Never};

pub use coproc_shmem::{DeviceAddr, SharedBuffer, ShmemError};
pub use coproc_wire::{DataEndpoint, Message, PowerState};
