//! Steady-state message dispatch: one receive, one reaction.

use core::time::Duration;

use coproc_wire::buffer::{BUFFER_REQUEST, OSLOG_BUFFER_REQUEST};
use coproc_wire::mgmt::{MgmtHeader, MgmtType, PowerStatePayload};
use coproc_wire::{DataEndpoint, Message, OsLogPayload, endpoint};

use crate::error::Error;
use crate::session::Session;
use crate::transport::Mailbox;

// Firmware chatter on the data endpoints during startup. The two ioreport
// codes are vendor-defined and expect the message echoed back verbatim, as
// does each syslog record; the syslog init notice expects nothing.
const SYSLOG_LOG: u8 = 0x5;
const SYSLOG_INIT: u8 = 0x8;
const IOREPORT_ECHO_A: u8 = 0x8;
const IOREPORT_ECHO_B: u8 = 0xc;

impl<M: Mailbox> Session<'_, M> {
    /// Run one dispatch step: block-receive with `timeout`, classify, react.
    ///
    /// Transport errors (including the timeout) propagate unchanged. Unknown
    /// management tags and OS-log chatter are logged and ignored; a message
    /// on an endpoint the engine does not know is a hard error, as is any
    /// recognized endpoint speaking outside its vocabulary.
    ///
    /// # Errors
    /// [`Error::Transport`], [`Error::UnexpectedEndpoint`],
    /// [`Error::UnexpectedMessage`], or any buffer-handling failure.
    pub fn poll(&mut self, timeout: Duration) -> Result<(), Error<M::Error>> {
        let message = self.recv(timeout)?;
        match message.endpoint {
            endpoint::MGMT => {
                self.handle_mgmt(message);
                Ok(())
            }
            _ => match DataEndpoint::from_endpoint(message.endpoint) {
                Some(DataEndpoint::OsLog) => self.handle_oslog(message),
                Some(data) => self.handle_data(data, message),
                None => Err(Error::UnexpectedEndpoint(message.endpoint)),
            },
        }
    }

    /// Management traffic: power-state tracking; everything else is soft.
    fn handle_mgmt(&mut self, message: Message) {
        let tag = MgmtHeader::from_bits(message.payload).msg_type();
        match MgmtType::from_tag(tag) {
            Some(MgmtType::SetIopPowerStateAck) => {
                self.iop_power = PowerStatePayload::from_bits(message.payload).power_state();
                log::debug!("coprocessor power state now {}", self.iop_power);
            }
            Some(MgmtType::SetApPowerState) => {
                self.ap_power = PowerStatePayload::from_bits(message.payload).power_state();
                log::debug!("host power state now {}", self.ap_power);
            }
            _ => {
                log::warn!("ignoring management message {:#018x}", message.payload);
            }
        }
    }

    /// OS-log traffic: buffer requests handled, everything else is chatter.
    fn handle_oslog(&mut self, message: Message) -> Result<(), Error<M::Error>> {
        let tag = OsLogPayload::from_bits(message.payload).msg_type();
        if tag == OSLOG_BUFFER_REQUEST {
            self.handle_buffer_request(DataEndpoint::OsLog, message.payload)
        } else {
            log::debug!("ignoring oslog message {:#018x}", message.payload);
            Ok(())
        }
    }

    /// Crashlog / syslog / ioreport traffic.
    fn handle_data(
        &mut self,
        data: DataEndpoint,
        message: Message,
    ) -> Result<(), Error<M::Error>> {
        let tag = MgmtHeader::from_bits(message.payload).msg_type();
        match (data, tag) {
            (_, BUFFER_REQUEST) => self.handle_buffer_request(data, message.payload),
            (DataEndpoint::IoReport, IOREPORT_ECHO_A | IOREPORT_ECHO_B)
            | (DataEndpoint::Syslog, SYSLOG_LOG) => self.send(message),
            (DataEndpoint::Syslog, SYSLOG_INIT) => Ok(()),
            _ => Err(Error::UnexpectedMessage {
                endpoint: message.endpoint,
                payload: message.payload,
            }),
        }
    }
}
