//! Power-state transitions.
//!
//! Both operations send one management request and then drive the
//! dispatcher until the firmware reports the requested state. They have no
//! overall deadline of their own: each iteration blocks for at most
//! `timeout`, and the injected [`CancelToken`] is the way out of an
//! unresponsive coprocessor.

use core::time::Duration;

use coproc_wire::mgmt::PowerStatePayload;
use coproc_wire::{Message, PowerState};

use crate::error::Error;
use crate::session::Session;
use crate::transport::{CancelToken, Mailbox};

impl<M: Mailbox> Session<'_, M> {
    /// Drive the host-visible power state to `target`.
    ///
    /// A no-op when the tracked state already matches; otherwise polls the
    /// dispatcher (one receive of at most `timeout` per step) until the
    /// firmware reports `target`.
    ///
    /// # Errors
    /// Any dispatcher error, or [`Error::Cancelled`] from the token.
    pub fn set_ap_power<C: CancelToken>(
        &mut self,
        target: PowerState,
        timeout: Duration,
        cancel: &C,
    ) -> Result<(), Error<M::Error>> {
        if self.ap_power == target {
            return Ok(());
        }
        log::debug!("requesting host power state {target}");
        self.send(Message::mgmt(PowerStatePayload::set_ap(target).into_bits()))?;
        while self.ap_power != target {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.poll(timeout)?;
        }
        Ok(())
    }

    /// Shut the coprocessor down to `target`, quiescing the host-visible
    /// state first if it is not already quiesced.
    ///
    /// # Errors
    /// Any dispatcher error, or [`Error::Cancelled`] from the token.
    pub fn shutdown<C: CancelToken>(
        &mut self,
        target: PowerState,
        timeout: Duration,
        cancel: &C,
    ) -> Result<(), Error<M::Error>> {
        if self.ap_power != PowerState::Quiesced {
            self.set_ap_power(PowerState::Quiesced, timeout, cancel)?;
        }
        log::debug!("requesting coprocessor power state {target}");
        self.send(Message::mgmt(PowerStatePayload::set_iop(target).into_bits()))?;
        while self.iop_power != target {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.poll(timeout)?;
        }
        Ok(())
    }
}
