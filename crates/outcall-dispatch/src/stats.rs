//! Dispatch counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters updated by the dispatcher and its task bodies.
#[derive(Debug, Default)]
pub struct DispatchStats {
    dispatched: AtomicU64,
    rejected: AtomicU64,
    invocation_failures: AtomicU64,
    contract_violations: AtomicU64,
    propagated: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    /// Tasks accepted by an executor
    pub dispatched: u64,
    /// Dispatches refused at submission
    pub rejected: u64,
    /// Calls that returned an error
    pub invocation_failures: u64,
    /// Calls that returned without completing their handle
    pub contract_violations: u64,
    /// Results copied from a substituted handle
    pub propagated: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            invocation_failures: self.invocation_failures.load(Ordering::Relaxed),
            contract_violations: self.contract_violations.load(Ordering::Relaxed),
            propagated: self.propagated.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invocation_failure(&self) {
        self.invocation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_contract_violation(&self) {
        self.contract_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_propagated(&self) {
        self.propagated.fetch_add(1, Ordering::Relaxed);
    }
}
