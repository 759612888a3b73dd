//! Read-only transaction scenarios.
//!
//! A read-only transaction reads the last values committed before its
//! begin timestamp and never takes locks. Replicated copies marked
//! stale by a recovery are only usable when the staleness began at or
//! after the snapshot, so an old enough snapshot can still be served
//! from a recovered site.

use crate::test_utils::*;

#[test]
fn test_snapshot_isolated_from_later_commits() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[w(1, 2, 50)]);
    line(&mut sim, &[end(1)]);

    line(&mut sim, &[begin_ro(2)]);
    line(&mut sim, &[begin(3)]);
    line(&mut sim, &[w(3, 2, 60)]);
    line(&mut sim, &[end(3)]);

    // T2 keeps seeing the world as of its begin.
    let events = line(&mut sim, &[r(2, 2)]);
    assert_eq!(read_value(&events, t(2)), Some(50));
    let events = line(&mut sim, &[r(2, 4)]);
    assert_eq!(read_value(&events, t(2)), Some(40));
    line(&mut sim, &[end(2)]);
    assert_eq!(settled_value(&mut sim, x(2)), 60);
}

#[test]
fn test_readonly_ignores_write_locks() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[w(1, 2, 99)]);
    line(&mut sim, &[begin_ro(2)]);
    let events = line(&mut sim, &[r(2, 2)]);
    assert!(!was_parked(&events, t(2)));
    assert_eq!(read_value(&events, t(2)), Some(20));
}

#[test]
fn test_two_snapshots_straddle_a_commit() {
    let mut sim = sim();
    line(&mut sim, &[begin_ro(1)]);
    line(&mut sim, &[begin(2)]);
    line(&mut sim, &[w(2, 2, 42)]);
    line(&mut sim, &[end(2)]);
    line(&mut sim, &[begin_ro(3)]);

    let events = line(&mut sim, &[r(1, 2)]);
    assert_eq!(read_value(&events, t(1)), Some(20));
    let events = line(&mut sim, &[r(3, 2)]);
    assert_eq!(read_value(&events, t(3)), Some(42));
}

#[test]
fn test_snapshot_read_waits_out_home_site_failure() {
    let mut sim = sim();
    line(&mut sim, &[begin_ro(1)]);
    line(&mut sim, &[fail(4)]);
    let events = line(&mut sim, &[r(1, 3)]);
    assert!(was_parked(&events, t(1)));

    // x3 is unreplicated, so the recovered copy is current and the
    // parked snapshot read completes.
    let events = line(&mut sim, &[recover(4)]);
    assert_eq!(read_value(&events, t(1)), Some(30));
}

#[test]
fn test_snapshot_falls_back_to_another_replica() {
    let mut sim = sim();
    line(&mut sim, &[begin_ro(1)]);
    line(&mut sim, &[fail(1)]);
    let events = line(&mut sim, &[r(1, 2)]);
    assert_eq!(read_value(&events, t(1)), Some(20));
}

#[test]
fn test_recovered_copy_serves_snapshots_older_than_the_failure() {
    let mut sim = sim();
    line(&mut sim, &[begin_ro(1)]);
    line(&mut sim, &[fail(1)]);
    line(&mut sim, &[recover(1)]);
    // The copy at site 1 went stale after T1's begin, so T1's snapshot
    // is still served from it.
    let events = line(&mut sim, &[r(1, 2)]);
    assert_eq!(read_value(&events, t(1)), Some(20));
    match events.first() {
        Some(availdb::Event::ReadCompleted { site, .. }) => assert_eq!(*site, s(1)),
        other => panic!("expected a read completion, got {other:?}"),
    }
}
