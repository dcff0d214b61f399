//! # Boot Handshake
//!
//! Strictly sequential bring-up of the coprocessor:
//!
//! 1. **Wake** — request coprocessor power state ON.
//! 2. **Hello** — receive the firmware's version window, negotiate, reply.
//! 3. **Endpoint map** — receive and acknowledge bitmap pages until the
//!    last one, collecting the endpoints the firmware exposes.
//! 4. **Endpoint start** — fire-and-forget start requests for everything
//!    discovered, minus the endpoints the host deliberately leaves alone.
//! 5. **Settle** — poll the dispatcher until the firmware reports the
//!    coprocessor ON.
//!
//! Each receive is bounded by [`HANDSHAKE_TIMEOUT`]; any error aborts the
//! handshake, and the owner must not treat the coprocessor as usable.

use core::time::Duration;

use coproc_wire::mgmt::{
    EpMapAck, EpMapPayload, HelloPayload, MgmtType, PowerStatePayload, StartEpPayload,
};
use coproc_wire::{
    Message, PROTOCOL_VERSION_MAX, PROTOCOL_VERSION_MIN, PowerState, endpoint,
};

use crate::error::Error;
use crate::session::Session;
use crate::transport::{CancelToken, Mailbox};

/// Per-receive timeout of every handshake step.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound on discoverable endpoints: 8 bitmap pages of 32 bits.
const MAX_ENDPOINTS: usize = 256;

/// Endpoints the host never starts: management is implicit, syslog is too
/// chatty to service this early, debug and trace are development-only.
fn should_start(ep: u8) -> bool {
    !matches!(
        u32::from(ep),
        endpoint::MGMT | endpoint::SYSLOG | endpoint::DEBUG | endpoint::TRACE
    )
}

impl<M: Mailbox> Session<'_, M> {
    /// Run the full boot handshake to its terminal state (coprocessor ON).
    ///
    /// `cancel` is consulted between settle-phase dispatch steps; pass
    /// [`Never`](crate::Never) to wait indefinitely.
    ///
    /// # Errors
    /// [`Error::Transport`] for mailbox failures,
    /// [`Error::UnsupportedVersion`] when the version windows do not
    /// overlap, [`Error::UnexpectedMessage`] for out-of-sequence traffic,
    /// plus anything the settle-phase dispatcher can return.
    pub fn boot<C: CancelToken>(&mut self, cancel: &C) -> Result<(), Error<M::Error>> {
        log::debug!("waking coprocessor");
        self.send(Message::mgmt(
            PowerStatePayload::set_iop(PowerState::On).into_bits(),
        ))?;

        self.negotiate_version()?;

        let mut endpoints = [0_u8; MAX_ENDPOINTS];
        let count = self.exchange_endpoint_map(&mut endpoints)?;
        self.start_endpoints(&endpoints[..count])?;

        self.settle(cancel)
    }

    /// Hello / HelloReply exchange.
    ///
    /// Accepts iff the firmware's window overlaps 11..=12 (both bounds
    /// checked independently) and answers with `min(12, remote_max)`.
    fn negotiate_version(&mut self) -> Result<(), Error<M::Error>> {
        let message = self.recv(HANDSHAKE_TIMEOUT)?;
        let hello = HelloPayload::from_bits(message.payload);
        if message.endpoint != endpoint::MGMT
            || MgmtType::from_tag(hello.msg_type()) != Some(MgmtType::Hello)
        {
            log::warn!("expected hello, got {:#018x}", message.payload);
            return Err(Error::UnexpectedMessage {
                endpoint: message.endpoint,
                payload: message.payload,
            });
        }

        let (min, max) = (hello.min_version(), hello.max_version());
        if min > PROTOCOL_VERSION_MAX || max < PROTOCOL_VERSION_MIN {
            log::warn!("firmware versions {min}..={max} unsupported");
            return Err(Error::UnsupportedVersion { min, max });
        }

        let want = PROTOCOL_VERSION_MAX.min(max);
        log::debug!("negotiated protocol version {want} (firmware offers {min}..={max})");
        self.send(Message::mgmt(HelloPayload::reply(want).into_bits()))
    }

    /// Receive and acknowledge bitmap pages until the last one; returns how
    /// many endpoints were discovered.
    fn exchange_endpoint_map(
        &mut self,
        endpoints: &mut [u8; MAX_ENDPOINTS],
    ) -> Result<usize, Error<M::Error>> {
        let mut count = 0;
        loop {
            let message = self.recv(HANDSHAKE_TIMEOUT)?;
            let page = EpMapPayload::from_bits(message.payload);
            if message.endpoint != endpoint::MGMT
                || MgmtType::from_tag(page.msg_type()) != Some(MgmtType::EndpointMap)
            {
                log::warn!("expected endpoint map, got {:#018x}", message.payload);
                return Err(Error::UnexpectedMessage {
                    endpoint: message.endpoint,
                    payload: message.payload,
                });
            }

            for bit in 0..32 {
                if page.bitmap() & (1 << bit) != 0 && count < MAX_ENDPOINTS {
                    endpoints[count] = page.base() * 32 + bit;
                    count += 1;
                }
            }

            self.send(Message::mgmt(
                EpMapAck::ack(page.base(), page.last()).into_bits(),
            ))?;
            if page.last() {
                log::debug!("firmware exposes {count} endpoints");
                return Ok(count);
            }
        }
    }

    /// Fire-and-forget start requests; no individual replies are awaited.
    fn start_endpoints(&mut self, endpoints: &[u8]) -> Result<(), Error<M::Error>> {
        for &ep in endpoints.iter().filter(|&&ep| should_start(ep)) {
            log::debug!("starting endpoint {ep:#x}");
            self.send(Message::mgmt(StartEpPayload::start_request(ep).into_bits()))?;
        }
        Ok(())
    }

    /// Poll until the firmware reports the coprocessor ON.
    fn settle<C: CancelToken>(&mut self, cancel: &C) -> Result<(), Error<M::Error>> {
        self.iop_power = PowerState::Sleep;
        self.ap_power = PowerState::Quiesced;
        while !self.is_booted() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.poll(HANDSHAKE_TIMEOUT)?;
        }
        log::debug!("coprocessor is on");
        Ok(())
    }
}
