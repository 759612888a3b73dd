//! Wait-die scenarios.
//!
//! On a lock conflict the requester is compared with the oldest
//! conflicting holder: strictly older requesters wait, everyone else
//! dies on the spot. Ages are begin timestamps, so two transactions
//! begun on the same input line kill each other's requests.

use crate::test_utils::*;
use availdb::AbortReason;

#[test]
fn test_younger_writer_dies_against_older_holder() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[begin(2)]);
    line(&mut sim, &[w(1, 2, 10)]);
    let events = line(&mut sim, &[w(2, 2, 20)]);
    assert!(was_aborted(&events, t(2)));

    line(&mut sim, &[end(1)]);
    assert_eq!(settled_value(&mut sim, x(2)), 10);

    let report = state(&mut sim);
    assert_eq!(report.aborted.len(), 1);
    assert_eq!(
        report.aborted[0].reason,
        AbortReason::WaitDie { conflicting: t(1) }
    );
}

#[test]
fn test_older_writer_survives_and_waits() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[begin(2)]);
    line(&mut sim, &[w(2, 2, 22)]);
    let events = line(&mut sim, &[w(1, 2, 11)]);
    assert!(was_parked(&events, t(1)));
    assert!(!was_aborted(&events, t(1)));

    let report = state(&mut sim);
    assert!(report.aborted.is_empty());
    assert_eq!(report.parked.len(), 1);
    assert_eq!(report.parked[0].transaction(), t(1));
}

#[test]
fn test_younger_reader_dies_and_stays_dead() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[w(1, 2, 50)]);
    line(&mut sim, &[begin(2)]);
    let events = line(&mut sim, &[r(2, 2)]);
    assert!(was_aborted(&events, t(2)));

    // Operations of a dead transaction are dropped, not queued.
    let events = line(&mut sim, &[r(2, 4)]);
    assert!(events.is_empty());
    let events = line(&mut sim, &[end(2)]);
    assert!(events.is_empty());
}

#[test]
fn test_same_line_transactions_have_equal_age() {
    let mut sim = sim();
    line(&mut sim, &[begin(1), begin(2)]);
    line(&mut sim, &[w(1, 2, 10)]);
    // Equal age is not older, so the requester dies.
    let events = line(&mut sim, &[w(2, 2, 20)]);
    assert!(was_aborted(&events, t(2)));
}

#[test]
fn test_death_frees_the_victims_other_locks() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[begin(2)]);
    line(&mut sim, &[begin(3)]);
    line(&mut sim, &[w(2, 4, 2)]);
    line(&mut sim, &[w(3, 2, 3)]);
    // T3 attacks T2's lock, loses, and dies holding x2.
    let events = line(&mut sim, &[w(3, 4, 9)]);
    assert!(was_aborted(&events, t(3)));

    // x2 is free again for anyone.
    let events = line(&mut sim, &[w(1, 2, 1)]);
    assert!(!was_parked(&events, t(1)));
    line(&mut sim, &[end(1)]);
    line(&mut sim, &[end(2)]);
    assert_eq!(settled_value(&mut sim, x(2)), 1);
    assert_eq!(settled_value(&mut sim, x(4)), 2);
}
