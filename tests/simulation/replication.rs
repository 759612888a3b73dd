//! Replication and placement scenarios.
//!
//! Even-indexed variables live at every site; odd-indexed variables
//! live at the single site `1 + (index mod 10)`. Commits refresh every
//! Up copy and skip Down ones, which is where replica divergence
//! comes from.

use crate::test_utils::*;
use availdb::{Command, Output, SiteStatus};

#[test]
fn test_initial_values_follow_placement() {
    let mut sim = sim();
    // x2 is replicated everywhere, x1 lives only at site 2.
    assert_eq!(copies(&mut sim, x(2)).len(), 10);
    assert_eq!(settled_value(&mut sim, x(2)), 20);
    assert_eq!(copies(&mut sim, x(1)), vec![(s(2), 10)]);
    assert_eq!(copies(&mut sim, x(3)), vec![(s(4), 30)]);
}

#[test]
fn test_commit_reaches_every_up_site() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[w(1, 2, 50)]);
    line(&mut sim, &[end(1)]);

    let copies = copies(&mut sim, x(2));
    assert_eq!(copies.len(), 10);
    assert!(copies.iter().all(|(_, value)| *value == 50));
}

#[test]
fn test_down_site_keeps_stale_copy_until_next_commit() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    line(&mut sim, &[fail(2)]);
    line(&mut sim, &[w(1, 4, 44)]);
    line(&mut sim, &[end(1)]);

    for (site, value) in copies(&mut sim, x(4)) {
        if site == s(2) {
            assert_eq!(value, 40, "down site must keep its last committed value");
        } else {
            assert_eq!(value, 44);
        }
    }

    // The next commit after recovery refreshes the stale copy.
    line(&mut sim, &[recover(2)]);
    line(&mut sim, &[begin(2)]);
    line(&mut sim, &[w(2, 4, 55)]);
    line(&mut sim, &[end(2)]);
    assert_eq!(settled_value(&mut sim, x(4)), 55);
}

#[test]
fn test_unreplicated_write_touches_only_home_site() {
    let mut sim = sim();
    line(&mut sim, &[begin(1)]);
    let events = line(&mut sim, &[w(1, 3, 33)]);
    match &events[0] {
        availdb::Event::WriteAccepted { sites, .. } => assert_eq!(sites.as_slice(), &[s(4)]),
        other => panic!("expected write acceptance, got {other:?}"),
    }
    line(&mut sim, &[end(1)]);
    assert_eq!(copies(&mut sim, x(3)), vec![(s(4), 33)]);
}

#[test]
fn test_dump_lists_every_site_with_hosted_variables() {
    let mut sim = sim();
    let report = match sim.execute(Command::Dump).expect("dump rejected") {
        Output::Dump(report) => report,
        other => panic!("expected dump, got {other:?}"),
    };

    assert_eq!(report.sites.len(), 10);
    for (index, site) in report.sites.iter().enumerate() {
        assert_eq!(site.site, s(index as u32 + 1));
        assert_eq!(site.status, SiteStatus::Up);
    }
    // Site 1 hosts only the ten even variables; site 2 additionally
    // hosts x1 and x11.
    assert_eq!(report.sites[0].values.len(), 10);
    assert_eq!(report.sites[1].values.len(), 12);
    assert_eq!(report.sites[1].values[0], (x(1), 10));
}
