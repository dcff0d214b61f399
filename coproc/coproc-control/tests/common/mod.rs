//! Scripted in-memory mailbox and message builders shared by the
//! integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use coproc_control::{Mailbox, Message, PowerState};
use coproc_shmem::{DeviceAddr, SharedBuffer, ShmemError};
use coproc_wire::buffer::{BufferRequest, OsLogPayload};
use coproc_wire::mgmt::{
    EpMapAck, EpMapPayload, HelloPayload, MgmtType, PowerStatePayload, StartEpPayload,
};
use coproc_wire::{DataEndpoint, endpoint};

/// Transport error of the scripted mailbox; `Timeout` is the
/// distinguishable receive-timeout variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MockError {
    Timeout,
    Down,
}

/// One scripted interaction, in strict order.
#[derive(Debug)]
pub enum Step {
    /// The next receive yields this message.
    Recv(Message),
    /// The next receive fails with this error.
    RecvErr(MockError),
    /// The next send must be exactly this message.
    ExpectSend(Message),
    /// The next send must target this endpoint; the message is recorded in
    /// [`ScriptMailbox::sent`] for inspection.
    CaptureSend(u32),
}

/// A mailbox that replays a fixed script and asserts every outbound
/// message against it.
pub struct ScriptMailbox {
    steps: VecDeque<Step>,
    pub sent: Vec<Message>,
}

impl ScriptMailbox {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            sent: Vec::new(),
        }
    }

    /// Assert the whole script was consumed.
    pub fn assert_done(&self) {
        assert!(
            self.steps.is_empty(),
            "script not fully consumed: {:?}",
            self.steps
        );
    }
}

impl Mailbox for ScriptMailbox {
    type Error = MockError;

    fn send(&mut self, message: Message) -> Result<(), MockError> {
        match self.steps.pop_front() {
            Some(Step::ExpectSend(expected)) => {
                assert_eq!(message, expected, "outbound message mismatch");
                Ok(())
            }
            Some(Step::CaptureSend(endpoint)) => {
                assert_eq!(message.endpoint, endpoint, "outbound endpoint mismatch");
                self.sent.push(message);
                Ok(())
            }
            other => panic!("unscripted send of {message:?} (next step: {other:?})"),
        }
    }

    fn recv(&mut self, _timeout: Duration) -> Result<Message, MockError> {
        match self.steps.pop_front() {
            Some(Step::Recv(message)) => Ok(message),
            Some(Step::RecvErr(e)) => Err(e),
            other => panic!("unscripted recv (next step: {other:?})"),
        }
    }
}

/// A mapping collaborator that hands out a fixed device address and records
/// every call.
pub struct FixedShmem {
    pub base: u64,
    pub setups: Vec<(DataEndpoint, u64)>,
    pub teardowns: Vec<(DataEndpoint, SharedBuffer)>,
}

impl FixedShmem {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            setups: Vec::new(),
            teardowns: Vec::new(),
        }
    }
}

impl coproc_control::ShmemAlloc for FixedShmem {
    fn setup(&mut self, endpoint: DataEndpoint, size: u64) -> Result<SharedBuffer, ShmemError> {
        self.setups.push((endpoint, size));
        Ok(SharedBuffer {
            dva: DeviceAddr::new(self.base),
            size,
        })
    }

    fn teardown(&mut self, endpoint: DataEndpoint, buffer: &SharedBuffer) {
        self.teardowns.push((endpoint, *buffer));
    }
}

/// A collaborator whose mappings always fail.
pub struct BrokenShmem;

impl coproc_control::ShmemAlloc for BrokenShmem {
    fn setup(&mut self, _endpoint: DataEndpoint, size: u64) -> Result<SharedBuffer, ShmemError> {
        Err(ShmemError { requested: size })
    }

    fn teardown(&mut self, _endpoint: DataEndpoint, _buffer: &SharedBuffer) {}
}

// Outbound messages the engine is expected to produce.

pub fn wake() -> Message {
    Message::mgmt(PowerStatePayload::set_iop(PowerState::On).into_bits())
}

pub fn hello_reply(version: u16) -> Message {
    Message::mgmt(HelloPayload::reply(version).into_bits())
}

pub fn epmap_ack(base: u8, last: bool) -> Message {
    Message::mgmt(EpMapAck::ack(base, last).into_bits())
}

pub fn start_ep(ep: u8) -> Message {
    Message::mgmt(StartEpPayload::start_request(ep).into_bits())
}

pub fn set_iop(state: PowerState) -> Message {
    Message::mgmt(PowerStatePayload::set_iop(state).into_bits())
}

pub fn set_ap(state: PowerState) -> Message {
    Message::mgmt(PowerStatePayload::set_ap(state).into_bits())
}

// Inbound messages the scripted firmware produces.

pub fn hello(min: u16, max: u16) -> Message {
    Message::mgmt(
        HelloPayload::new()
            .with_min_version(min)
            .with_max_version(max)
            .with_msg_type(MgmtType::Hello.tag())
            .into_bits(),
    )
}

pub fn epmap_page(base: u8, bitmap: u32, last: bool) -> Message {
    Message::mgmt(
        EpMapPayload::new()
            .with_bitmap(bitmap)
            .with_base(base)
            .with_last(last)
            .with_msg_type(MgmtType::EndpointMap.tag())
            .into_bits(),
    )
}

pub fn iop_ack(state: PowerState) -> Message {
    Message::mgmt(
        PowerStatePayload::new()
            .with_power_state(state)
            .with_msg_type(MgmtType::SetIopPowerStateAck.tag())
            .into_bits(),
    )
}

pub fn ap_state(state: PowerState) -> Message {
    Message::mgmt(
        PowerStatePayload::new()
            .with_power_state(state)
            .with_msg_type(MgmtType::SetApPowerState.tag())
            .into_bits(),
    )
}

pub fn buffer_request(ep: DataEndpoint, size_bytes: u64, addr: DeviceAddr) -> Message {
    assert_ne!(ep, DataEndpoint::OsLog, "use oslog_buffer_request");
    Message::new(
        BufferRequest::new()
            .with_size_bytes(size_bytes)
            .with_address(addr)
            .with_msg_type(coproc_wire::buffer::BUFFER_REQUEST)
            .into_bits(),
        ep.endpoint(),
    )
}

pub fn oslog_buffer_request(size_bytes: u32, addr: DeviceAddr) -> Message {
    Message::new(
        OsLogPayload::new()
            .with_size_bytes(size_bytes)
            .with_address(addr)
            .with_msg_type(coproc_wire::buffer::OSLOG_BUFFER_REQUEST)
            .into_bits(),
        endpoint::OSLOG,
    )
}

/// Per-step timeout used by the steady-state tests; the scripted mailbox
/// never actually blocks.
pub const STEP: Duration = Duration::from_millis(100);
