// src/export/progress.rs
//! Per-pair pagination state and the run report.

use crate::types::{FolderId, ItemIdentity};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Why a (folder, sortType) pair stopped paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The server returned an empty page.
    Exhausted,
    /// The expected unique total was reached; the whole run stops.
    ExpectedReached,
    /// Too many consecutive pages without a never-seen item.
    NoNewStreak,
    /// The server-reported page count was reached.
    TotalPagesReached,
    /// The `max_pages` safety cap was reached.
    PageCap,
    /// Single-page mode fetched its one page.
    PreviewComplete,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Exhausted => "empty page",
            Self::ExpectedReached => "expected count reached",
            Self::NoNewStreak => "no new items",
            Self::TotalPagesReached => "last server page",
            Self::PageCap => "max pages",
            Self::PreviewComplete => "single page",
        };
        f.write_str(text)
    }
}

/// Paging limits shared by every pair of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub start_page: u32,
    /// `0` disables the cap.
    pub max_pages: u32,
    /// Treated as at least `1`.
    pub stop_after_no_new: u32,
}

/// Pagination state of one (folder, sortType) pair. Reset for every pair.
#[derive(Debug, Clone)]
pub struct PairProgress {
    limits: PageLimits,
    page_index: u32,
    total_pages: Option<u32>,
    no_new_streak: u32,
    seen: HashSet<ItemIdentity>,
}

impl PairProgress {
    pub fn new(limits: PageLimits) -> Self {
        Self {
            limits,
            page_index: limits.start_page,
            total_pages: None,
            no_new_streak: 0,
            seen: HashSet::new(),
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn no_new_streak(&self) -> u32 {
        self.no_new_streak
    }

    /// Latches the first positive page count the server reports.
    pub fn observe_total_pages(&mut self, reported: Option<u32>) {
        if self.total_pages.is_none() {
            self.total_pages = reported;
        }
    }

    /// Marks `identity` seen in this pair; `true` if it was new.
    pub fn mark_seen(&mut self, identity: &ItemIdentity) -> bool {
        self.seen.insert(identity.clone())
    }

    /// Updates the streak after a page that surfaced `new_any` never-seen items.
    pub fn finish_page(&mut self, new_any: usize) {
        if new_any == 0 {
            self.no_new_streak += 1;
        } else {
            self.no_new_streak = 0;
        }
    }

    /// Checks the per-pair stop conditions, in priority order.
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.no_new_streak >= self.limits.stop_after_no_new.max(1) {
            return Some(StopReason::NoNewStreak);
        }
        if self.total_pages.is_some_and(|total| self.page_index >= total) {
            return Some(StopReason::TotalPagesReached);
        }
        let pages_done = self.page_index.saturating_sub(self.limits.start_page) + 1;
        if self.limits.max_pages > 0 && pages_done >= self.limits.max_pages {
            return Some(StopReason::PageCap);
        }
        None
    }

    pub fn advance(&mut self) {
        self.page_index += 1;
    }
}

/// Per-page counters, used for progress logs.
#[derive(Debug, Clone, Default)]
pub struct PageStats {
    pub new_any: usize,
    pub new_selected: usize,
    pub accepted: usize,
    pub first: Option<ItemIdentity>,
    pub last: Option<ItemIdentity>,
    /// Rows per integer type tag, including rows without an object target.
    pub histogram: BTreeMap<i64, usize>,
}

impl PageStats {
    pub fn count_tag(&mut self, tag: i64) {
        *self.histogram.entry(tag).or_default() += 1;
    }

    pub fn note_identity(&mut self, identity: &ItemIdentity) {
        if self.first.is_none() {
            self.first = Some(identity.clone());
        }
        self.last = Some(identity.clone());
    }

    /// `102=3 103=17`
    pub fn histogram_line(&self) -> String {
        self.histogram
            .iter()
            .map(|(tag, n)| format!("{}={}", tag, n))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How one (folder, sortType) pair ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOutcome {
    pub folder_id: FolderId,
    pub sort_type: i64,
    pub pages: u32,
    pub reason: StopReason,
}

/// Summary of a finished traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    pub accepted: usize,
    pub pages_fetched: usize,
    pub pairs: Vec<PairOutcome>,
    /// Set when the expected count cut the run short.
    pub stopped_early: bool,
    pub word_lookups: usize,
}

impl TraversalReport {
    pub fn pairs_visited(&self) -> usize {
        self.pairs.len()
    }
}
