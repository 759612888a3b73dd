//! Wait-die deadlock avoidance
//!
//! When a lock request is denied, the requester's fate is decided by
//! comparing start timestamps with the conflicting holder: an older
//! requester (strictly smaller timestamp) is allowed to wait, a younger
//! or equal-aged one dies. Because a transaction can only ever wait for
//! strictly younger transactions, wait cycles cannot form and no
//! deadlock detector is needed.
//!
//! Write requests may be denied at several replicas at once; the
//! comparison is then made against the oldest conflicting holder
//! anywhere, which is the strictest possible opponent.

use crate::transaction::TransactionRegistry;
use avail_core::{Timestamp, TransactionId};

/// Verdict for a denied lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Requester is older; it parks and retries later.
    Wait,
    /// Requester is younger or the same age; it aborts.
    Die,
}

/// Decide a denied request: strictly older requesters wait, everyone
/// else dies. Equal ages die, so a transaction never waits on a
/// same-tick peer.
pub fn resolve(requester_start: Timestamp, holder_start: Timestamp) -> Verdict {
    if requester_start < holder_start {
        Verdict::Wait
    } else {
        Verdict::Die
    }
}

/// The oldest conflicting holder and its start timestamp.
///
/// Holders the registry does not know are skipped. Ties on the start
/// timestamp break toward the smaller id so the choice is stable.
pub fn oldest_holder(
    registry: &TransactionRegistry,
    holders: impl IntoIterator<Item = TransactionId>,
) -> Option<(TransactionId, Timestamp)> {
    holders
        .into_iter()
        .filter_map(|id| registry.start_of(id).map(|start| (id, start)))
        .min_by_key(|&(id, start)| (start, id))
}
