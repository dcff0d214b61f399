//! Collaborator seams: the mailbox transport and the cancellation token.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use coproc_wire::Message;

/// The hardware mailbox as the engine sees it: atomic send and
/// timeout-bounded receive of one [`Message`].
///
/// The engine requires in-order, duplication-free delivery per direction and
/// propagates every transport error verbatim without retrying. The error
/// type must let callers tell a receive timeout apart from other failures;
/// the engine itself never needs to.
pub trait Mailbox {
    /// Transport failure type. A timeout on receive must be a
    /// distinguishable value of this type.
    type Error;

    /// Send one message. Expected to complete quickly.
    ///
    /// # Errors
    /// Any transport failure.
    fn send(&mut self, message: Message) -> Result<(), Self::Error>;

    /// Block until a message arrives or `timeout` elapses.
    ///
    /// # Errors
    /// Any transport failure, including the timeout.
    fn recv(&mut self, timeout: Duration) -> Result<Message, Self::Error>;
}

/// Cooperative cancellation for loops that poll the dispatcher repeatedly.
///
/// Consulted between dispatch steps only; checking the token never changes
/// wire behavior. A receive already in flight is not interrupted.
pub trait CancelToken {
    /// `true` once the surrounding operation should stop.
    fn is_cancelled(&self) -> bool;
}

/// A token that never cancels: poll loops run until their condition holds,
/// bounded only by the per-step receive timeout.
#[derive(Debug, Copy, Clone, Default)]
pub struct Never;

impl CancelToken for Never {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A shared flag usable from an interrupt handler or another task.
impl CancelToken for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}
