//! Power-control transitions and cancellation.

mod common;

use std::sync::atomic::AtomicBool;

use common::{STEP, ScriptMailbox, Step, ap_state, iop_ack, set_ap, set_iop};
use coproc_control::{Error, Message, Never, PowerState, Session};
use coproc_wire::endpoint;

#[test]
fn set_ap_power_is_a_noop_when_already_there() {
    // fresh sessions track both states as OFF
    let mut mbox = ScriptMailbox::new(vec![]);

    let mut session = Session::new(&mut mbox);
    session
        .set_ap_power(PowerState::Off, STEP, &Never)
        .expect("no-op");

    drop(session);
    mbox.assert_done();
}

#[test]
fn set_ap_power_polls_until_the_state_is_reported() {
    let mut mbox = ScriptMailbox::new(vec![
        Step::ExpectSend(set_ap(PowerState::On)),
        Step::Recv(ap_state(PowerState::On)),
    ]);

    let mut session = Session::new(&mut mbox);
    session
        .set_ap_power(PowerState::On, STEP, &Never)
        .expect("transition");
    assert_eq!(session.ap_power(), PowerState::On);

    drop(session);
    mbox.assert_done();
}

#[test]
fn shutdown_quiesces_the_host_first() {
    let mut mbox = ScriptMailbox::new(vec![
        Step::ExpectSend(set_ap(PowerState::Quiesced)),
        Step::Recv(ap_state(PowerState::Quiesced)),
        Step::ExpectSend(set_iop(PowerState::Sleep)),
        Step::Recv(iop_ack(PowerState::Sleep)),
    ]);

    let mut session = Session::new(&mut mbox);
    session
        .shutdown(PowerState::Sleep, STEP, &Never)
        .expect("shutdown");
    assert_eq!(session.ap_power(), PowerState::Quiesced);
    assert_eq!(session.iop_power(), PowerState::Sleep);

    drop(session);
    mbox.assert_done();
}

#[test]
fn shutdown_skips_the_quiesce_when_already_quiesced() {
    let mut mbox = ScriptMailbox::new(vec![
        Step::Recv(ap_state(PowerState::Quiesced)),
        Step::ExpectSend(set_iop(PowerState::Sleep)),
        Step::Recv(iop_ack(PowerState::Sleep)),
    ]);

    let mut session = Session::new(&mut mbox);
    session.poll(STEP).expect("quiesce notice");
    session
        .shutdown(PowerState::Sleep, STEP, &Never)
        .expect("shutdown");
    assert_eq!(session.iop_power(), PowerState::Sleep);

    drop(session);
    mbox.assert_done();
}

#[test]
fn power_loop_services_unrelated_traffic() {
    // A syslog record arrives while waiting for the AP state; the loop
    // echoes it and keeps going.
    let record = Message::new((0x5_u64 << 52) | 0x77, endpoint::SYSLOG);
    let mut mbox = ScriptMailbox::new(vec![
        Step::ExpectSend(set_ap(PowerState::On)),
        Step::Recv(record),
        Step::ExpectSend(record),
        Step::Recv(ap_state(PowerState::On)),
    ]);

    let mut session = Session::new(&mut mbox);
    session
        .set_ap_power(PowerState::On, STEP, &Never)
        .expect("transition");

    drop(session);
    mbox.assert_done();
}

#[test]
fn cancellation_stops_a_power_loop() {
    let mut mbox = ScriptMailbox::new(vec![Step::ExpectSend(set_ap(PowerState::On))]);

    let cancel = AtomicBool::new(true);
    let mut session = Session::new(&mut mbox);
    assert_eq!(
        session.set_ap_power(PowerState::On, STEP, &cancel),
        Err(Error::Cancelled)
    );

    drop(session);
    mbox.assert_done();
}

/// Token that allows a fixed number of dispatch steps before cancelling.
struct CancelAfter(std::cell::Cell<u32>);

impl coproc_control::CancelToken for CancelAfter {
    fn is_cancelled(&self) -> bool {
        let left = self.0.get();
        if left == 0 {
            return true;
        }
        self.0.set(left - 1);
        false
    }
}

#[test]
fn cancellation_is_checked_between_steps() {
    // The firmware never reaches the requested state; after one serviced
    // step the token fires and the loop stops without another receive.
    let mut mbox = ScriptMailbox::new(vec![
        Step::Recv(ap_state(PowerState::Quiesced)),
        Step::ExpectSend(set_iop(PowerState::Sleep)),
        Step::Recv(iop_ack(PowerState::On)),
    ]);

    let mut session = Session::new(&mut mbox);
    session.poll(STEP).expect("quiesce notice");

    let cancel = CancelAfter(std::cell::Cell::new(1));
    assert_eq!(
        session.shutdown(PowerState::Sleep, STEP, &cancel),
        Err(Error::Cancelled)
    );
    assert_eq!(session.iop_power(), PowerState::On);

    drop(session);
    mbox.assert_done();
}
