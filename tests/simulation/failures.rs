//! Site failure and recovery scenarios.
//!
//! A failing site aborts every read-write transaction holding state
//! there and wipes its lock table. Recovery brings the site back with
//! every replicated copy marked stale until the next commit refreshes
//! it; unreplicated copies come back current.

use crate::test_utils::*;
use availdb::{AbortReason, Command, Event, Output, SiteStatus};

#[test]
fn test_failure_aborts_transactions_with_state_there() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[begin(2)]);
    // T1 locks x2 at every site; T2 only touches site 2.
    line(&mut sim, &[w(1, 2, 10)]);
    line(&mut sim, &[r(2, 1)]);

    let events = line(&mut sim, &[fail(3)]);
    assert!(was_aborted(&events, t(1)));
    assert!(!was_aborted(&events, t(2)));

    let report = state(&mut sim);
    assert_eq!(report.running, vec![t(2)]);
    assert_eq!(
        report.aborted[0].reason,
        AbortReason::SiteFailure { site: s(3) }
    );
}

#[test]
fn test_failure_of_holder_unblocks_waiter() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[begin(2)]);
    line(&mut sim, &[w(2, 2, 22)]);
    let events = line(&mut sim, &[w(1, 2, 11)]);
    assert!(was_parked(&events, t(1)));

    // Site 5's failure kills the holder; the parked write retries and
    // lands at the nine surviving sites.
    let events = line(&mut sim, &[fail(5)]);
    assert!(was_aborted(&events, t(2)));
    match events
        .iter()
        .find(|e| matches!(e, Event::WriteAccepted { .. }))
    {
        Some(Event::WriteAccepted { transaction, sites, .. }) => {
            assert_eq!(*transaction, t(1));
            assert_eq!(sites.len(), 9);
        }
        other => panic!("expected the parked write to land, got {other:?}"),
    }

    line(&mut sim, &[end(1)]);
    for (site, value) in copies(&mut sim, x(2)) {
        if site == s(5) {
            assert_eq!(value, 20);
        } else {
            assert_eq!(value, 11);
        }
    }
}

#[test]
fn test_write_to_failed_home_site_waits_for_recovery() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[fail(6)]);
    let events = line(&mut sim, &[w(1, 5, 55)]);
    assert!(was_parked(&events, t(1)));

    let events = line(&mut sim, &[recover(6)]);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::WriteAccepted { transaction, .. } if *transaction == t(1))));
    line(&mut sim, &[end(1)]);
    assert_eq!(copies(&mut sim, x(5)), vec![(s(6), 55)]);
}

#[test]
fn test_recovered_replica_serves_reads_only_after_refresh() {
    let mut sim = sim();
    // Leave site 2 as the only survivor; its recovered copy of x2 is
    // stale, so the read has nowhere to go.
    line(&mut sim, &[fail(2)]);
    line(&mut sim, &[recover(2)]);
    line(
        &mut sim,
        &[
            fail(1),
            fail(3),
            fail(4),
            fail(5),
            fail(6),
            fail(7),
            fail(8),
            fail(9),
            fail(10),
        ],
    );
    line(&mut sim, &[begin(1)]);
    let events = line(&mut sim, &[r(1, 2)]);
    assert!(was_parked(&events, t(1)));

    // An unreplicated variable at the same site reads fine.
    let events = line(&mut sim, &[r(1, 1)]);
    assert_eq!(read_value(&events, t(1)), Some(10));

    // A commit through the recovered site refreshes the copy and the
    // parked read completes against it.
    line(&mut sim, &[begin(2)]);
    line(&mut sim, &[w(2, 2, 222)]);
    let events = line(&mut sim, &[end(2)]);
    assert_eq!(read_value(&events, t(1)), Some(222));
}

#[test]
fn test_refailing_a_down_site_changes_nothing() {
    let mut sim = sim();
    let events = line(&mut sim, &[fail(3)]);
    assert_eq!(events.len(), 1);
    let events = line(&mut sim, &[fail(3)]);
    assert!(events.is_empty());

    let report = state(&mut sim);
    assert_eq!(report.sites[2], (s(3), SiteStatus::Down));
}

#[test]
fn test_restart_rebuilds_the_stock_cluster() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[w(1, 2, 99)]);
    line(&mut sim, &[end(1)]);
    line(&mut sim, &[fail(4)]);
    let results = sim.execute_batch(&[Command::Restart]);
    assert!(matches!(results[0], Ok(Output::Events(ref e)) if e.is_empty()));

    // Fresh clock, fresh sites, fresh data; only the restart line has
    // been consumed.
    assert_eq!(sim.clock(), 1);
    let report = state(&mut sim);
    assert!(report.sites.iter().all(|(_, s)| *s == SiteStatus::Up));
    assert!(report.committed.is_empty());
    assert_eq!(settled_value(&mut sim, x(2)), 20);
}
