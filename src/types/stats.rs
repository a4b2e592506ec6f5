//------------ Types for Statistics -----------------------------------------

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_derive::Serialize;

//------------ NeighborSummary ----------------------------------------------

/// One row of a neighbor listing. This is a copy: it does not borrow from
/// the neighbor it describes and no lock is held while it exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NeighborSummary {
    pub address: String,
    pub session_state: String,
    pub update_count: u64,
    pub prefix_count: usize,
    pub asn_count: usize,
}

impl Display for NeighborSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.address,
            self.session_state,
            self.update_count,
            self.prefix_count,
            self.asn_count
        )
    }
}

//------------ Counters -----------------------------------------------------
//
// Engine-wide counters, bumped by the ingest thread and readable at any
// time from any thread.

#[derive(Debug, Default)]
pub(crate) struct Counters {
    lines: AtomicU64,
    session_changes: AtomicU64,
    announcements: AtomicU64,
    withdrawals: AtomicU64,
    malformed_lines: AtomicU64,
    malformed_routes: AtomicU64,
    withdraw_misses: AtomicU64,
    filtered_prefixes: AtomicU64,
}

impl Counters {
    pub fn inc_lines(&self) {
        self.lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_session_changes(&self) {
        self.session_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_announcements(&self) {
        self.announcements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_withdrawals(&self) {
        self.withdrawals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_malformed_lines(&self) {
        self.malformed_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_malformed_routes(&self) {
        self.malformed_routes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_withdraw_misses(&self) {
        self.withdraw_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_filtered_prefixes(&self) {
        self.filtered_prefixes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngestStats {
        IngestStats {
            lines: self.lines.load(Ordering::Relaxed),
            session_changes: self.session_changes.load(Ordering::Relaxed),
            announcements: self.announcements.load(Ordering::Relaxed),
            withdrawals: self.withdrawals.load(Ordering::Relaxed),
            malformed_lines: self.malformed_lines.load(Ordering::Relaxed),
            malformed_routes: self.malformed_routes.load(Ordering::Relaxed),
            withdraw_misses: self.withdraw_misses.load(Ordering::Relaxed),
            filtered_prefixes: self
                .filtered_prefixes
                .load(Ordering::Relaxed),
        }
    }
}

//------------ IngestStats --------------------------------------------------

/// A point-in-time copy of the engine counters. The counters are updated
/// independently, so a copy taken during ingest may be off by one event
/// between fields.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Non-empty lines handed to the dispatcher.
    pub lines: u64,
    pub session_changes: u64,
    /// Announce events, including the malformed ones.
    pub announcements: u64,
    /// Withdraw events, including the malformed ones.
    pub withdrawals: u64,
    pub malformed_lines: u64,
    pub malformed_routes: u64,
    pub withdraw_misses: u64,
    /// Announcements dropped by the prefix length filter.
    pub filtered_prefixes: u64,
}

impl Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "lines:\t\t\t{}", self.lines)?;
        writeln!(f, "session changes:\t{}", self.session_changes)?;
        writeln!(f, "announcements:\t\t{}", self.announcements)?;
        writeln!(f, "withdrawals:\t\t{}", self.withdrawals)?;
        writeln!(f, "malformed lines:\t{}", self.malformed_lines)?;
        writeln!(f, "malformed routes:\t{}", self.malformed_routes)?;
        writeln!(f, "withdraw misses:\t{}", self.withdraw_misses)?;
        writeln!(f, "filtered prefixes:\t{}", self.filtered_prefixes)
    }
}
