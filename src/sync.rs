//! The per-node reader/writer synchroniser.
//!
//! This is the core of the crate: a fair, queued read-write coordinator with
//! explicit priority handoff, one instance per tree [`Node`](crate::node::Node).
//! It mirrors a classic four-condition-variable fair rwlock (the pattern the
//! teacher crate's `qrwlock::RwLock` also implements, there via spinning on
//! an atomic word) but suspends on [`Condvar`] rather than spinning, because
//! the handoff counters below need to be observed consistently by a sleeping
//! waiter — there is no single atomic word that captures this state.
//!
//! # Protocol
//!
//! Under `state`'s mutex, six counters move as threads come and go:
//!
//! - `r_running` / `w_running`: readers/writer currently in the critical
//!   section.
//! - `r_waiting` / `w_waiting`: readers/writer parked waiting for a turn.
//! - `r_state` / `w_state`: handoff tokens. Strictly positive only between
//!   the moment a release wakes a cohort and the moment the last woken
//!   thread of that cohort has claimed its token; zero otherwise.
//!
//! Readers are released as a cohort (`r_state = r_waiting`, broadcast); a
//! single writer is released at a time (`w_state = 1`, signal). The
//! `r_prio_q` / `w_prio_q` condition variables hold a just-woken cohort back
//! from being overtaken by a fresh arrival while the handoff is still being
//! drained — this is what makes the handoff "priority".
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Default)]
struct SyncState {
    r_waiting: u32,
    r_running: u32,
    w_waiting: u32,
    w_running: u32,
    r_state: u32,
    w_state: u32,
}

/// A fair, priority-handoff reader/writer coordinator for a single tree node.
///
/// Unlike [`std::sync::RwLock`], `NodeSync` does not own the protected data —
/// it only tracks lock state. The data it guards ([`Node`](crate::node::Node)'s
/// children map and parent link) lives next to it and is accessed through
/// plain references once the appropriate `acquire_*` call has returned; this
/// split exists because the multi-node protocols in [`crate::protocol`] hold
/// several nodes' locks open simultaneously across a whole path traversal,
/// which does not fit a single RAII guard's lifetime.
pub(crate) struct NodeSync {
    state: Mutex<SyncState>,
    read_q: Condvar,
    write_q: Condvar,
    r_prio_q: Condvar,
    w_prio_q: Condvar,
}

impl NodeSync {
    pub(crate) fn new() -> Self {
        NodeSync {
            state: Mutex::new(SyncState::default()),
            read_q: Condvar::new(),
            write_q: Condvar::new(),
            r_prio_q: Condvar::new(),
            w_prio_q: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().expect("node synchroniser mutex poisoned")
    }

    /// Acquires a read-lock on this node, blocking the calling thread while
    /// a writer holds or is waiting for the node.
    pub(crate) fn acquire_read(&self) {
        let mut s = self.lock();
        while s.r_state > 0 {
            s = self
                .r_prio_q
                .wait(s)
                .expect("node synchroniser mutex poisoned");
        }
        if s.w_running + s.w_waiting + s.w_state > 0 {
            s.r_waiting += 1;
            while s.r_state == 0 {
                s = self
                    .read_q
                    .wait(s)
                    .expect("node synchroniser mutex poisoned");
            }
            s.r_state -= 1;
            s.r_waiting -= 1;
            if s.r_state == 0 {
                self.r_prio_q.notify_all();
            }
        }
        s.r_running += 1;
        log::trace!("read-lock acquired (r_running={})", s.r_running);
    }

    /// Releases a read-lock held by this thread.
    pub(crate) fn release_read(&self) {
        let mut s = self.lock();
        s.r_running -= 1;
        if s.r_running == 0 && s.w_running == 0 && s.r_state == 0 && s.w_state == 0 {
            if s.w_waiting > 0 {
                s.w_state = 1;
                self.write_q.notify_one();
            } else if s.r_waiting > 0 {
                s.r_state = s.r_waiting;
                self.read_q.notify_all();
            }
        }
        log::trace!("read-lock released (r_running={})", s.r_running);
    }

    /// Acquires a write-lock on this node, blocking while any reader or
    /// writer holds or is about to hold the node.
    pub(crate) fn acquire_write(&self) {
        let mut s = self.lock();
        while s.w_state > 0 {
            s = self
                .w_prio_q
                .wait(s)
                .expect("node synchroniser mutex poisoned");
        }
        if s.r_running + s.w_running + s.r_state > 0 {
            s.w_waiting += 1;
            while s.w_state == 0 {
                s = self
                    .write_q
                    .wait(s)
                    .expect("node synchroniser mutex poisoned");
            }
            s.w_state -= 1;
            s.w_waiting -= 1;
            if s.w_state == 0 {
                self.w_prio_q.notify_all();
            }
        }
        s.w_running += 1;
        log::trace!("write-lock acquired");
    }

    /// Releases the write-lock held by this thread.
    pub(crate) fn release_write(&self) {
        let mut s = self.lock();
        s.w_running -= 1;
        if s.r_running == 0 && s.w_running == 0 && s.r_state == 0 && s.w_state == 0 {
            if s.r_waiting > 0 {
                s.r_state = s.r_waiting;
                self.read_q.notify_all();
            } else if s.w_waiting > 0 {
                s.w_state = 1;
                self.write_q.notify_one();
            }
        }
        log::trace!("write-lock released");
    }

    /// Counts the calling thread as a reader of this node without running
    /// the normal acquire-read protocol.
    ///
    /// This is the single permitted violation of invariant 3 (`spec.md`
    /// §3): it is used only by [`crate::protocol::start_write`] when a
    /// thread already holds the write-lock on this very node and needs to
    /// also be counted as one of its readers, because the two target paths
    /// of a `move` coincide. Going through [`Self::acquire_read`] here would
    /// deadlock against the writer state this same thread just set.
    pub(crate) fn bump_reader_for_writer(&self) {
        let mut s = self.lock();
        s.r_running += 1;
        log::trace!(
            "writer counted as reader (r_running={}, w_running={})",
            s.r_running,
            s.w_running
        );
    }
}
