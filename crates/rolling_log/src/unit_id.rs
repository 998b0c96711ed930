//! Numeric identity of the calling thread, rendered as the `g=` field of every log line.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static UNIT_ID: u64 = NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed);
}

/// Returns the id of the current thread.
///
/// Ids are assigned lazily on first use and are never reused while the process runs, so two
/// threads running at the same time always observe different ids. They are not contiguous and
/// carry no meaning beyond identity.
pub fn current_unit_id() -> u64 {
    UNIT_ID.with(|id| *id)
}
