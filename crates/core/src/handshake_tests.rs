// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::net::Ipv4Addr;

fn door() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, 4001)
}

fn started() -> PendingRegistration {
    let (pending, effects) = PendingRegistration::new(door()).transition(HandshakeInput::Start);
    assert_eq!(
        effects,
        vec![HandshakeEffect::Send {
            door: door(),
            attempt: 1
        }]
    );
    pending
}

#[test]
fn start_sends_first_attempt() {
    let pending = started();
    assert_eq!(pending.attempts(), 1);
    assert!(!pending.is_settled());
}

#[test]
fn start_twice_does_not_resend() {
    let (pending, effects) = started().transition(HandshakeInput::Start);
    assert!(effects.is_empty());
    assert_eq!(pending.attempts(), 1);
}

#[test]
fn confirmation_after_two_resends_confirms_once() {
    let pending = started();
    let (pending, _) = pending.transition(HandshakeInput::Timeout);
    let (pending, effects) = pending.transition(HandshakeInput::Timeout);
    assert_eq!(
        effects,
        vec![HandshakeEffect::Send {
            door: door(),
            attempt: 3
        }]
    );

    let (pending, effects) = pending.transition(HandshakeInput::Confirmation(door()));
    assert_eq!(effects, vec![HandshakeEffect::Confirmed { door: door() }]);
    assert!(pending.is_confirmed());

    // A duplicate confirmation from an earlier send changes nothing
    let (pending, effects) = pending.transition(HandshakeInput::Confirmation(door()));
    assert!(effects.is_empty());
    assert!(pending.is_confirmed());
}

#[test]
fn gives_up_after_three_unconfirmed_attempts() {
    let mut pending = started();
    for _ in 0..2 {
        let (next, _) = pending.transition(HandshakeInput::Timeout);
        pending = next;
    }
    assert_eq!(pending.attempts(), MAX_ATTEMPTS);

    let (pending, effects) = pending.transition(HandshakeInput::Timeout);
    assert_eq!(
        effects,
        vec![HandshakeEffect::GiveUp {
            door: door(),
            attempts: 3
        }]
    );
    assert!(pending.is_settled());
    assert!(!pending.is_confirmed());

    // A confirmation after giving up is ignored
    let (pending, effects) = pending.transition(HandshakeInput::Confirmation(door()));
    assert!(effects.is_empty());
    assert!(!pending.is_confirmed());
}

#[test]
fn confirmation_for_other_endpoint_is_ignored() {
    let other = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 4002);
    let (pending, effects) = started().transition(HandshakeInput::Confirmation(other));
    assert!(effects.is_empty());
    assert!(!pending.is_settled());
}

#[test]
fn max_attempts_is_configurable() {
    let pending = PendingRegistration::new(door()).with_max_attempts(1);
    let (pending, _) = pending.transition(HandshakeInput::Start);
    let (pending, effects) = pending.transition(HandshakeInput::Timeout);
    assert!(matches!(effects[..], [HandshakeEffect::GiveUp { attempts: 1, .. }]));
    assert!(pending.is_settled() && !pending.is_confirmed());
}
