// src/export/traversal.rs
//! The folder × sortType × page walk.
//!
//! The server's pagination is unreliable: pages can repeat without the
//! index advancing, and different sort orders expose different subsets of
//! a folder. The controller therefore tracks two distinct seen sets:
//!
//! - a per-pair set, which only decides whether a page brought anything
//!   never seen before (the no-new streak);
//! - a run-wide set of identities that already produced a record, which
//!   decides emission.
//!
//! All remote calls are awaited one at a time. The only cancellation
//! point is "do not issue the next call".

use super::classifier::{ItemClassifier, Origin};
use super::progress::{
    PageLimits, PageStats, PairOutcome, PairProgress, StopReason, TraversalReport,
};
use crate::api::{FolderPage, MojiGateway, WordResolver};
use crate::constants::FN_FETCH_FOLDER_CONTENT;
use crate::error::AppError;
use crate::model::Folder;
use crate::output::{Checkpoint, Position, ResultSink};
use crate::types::{ItemIdentity, TargetTypeSet};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Everything the controller needs to know about a run.
#[derive(Debug, Clone)]
pub struct TraversalPlan {
    pub start_page: u32,
    pub page_size: u32,
    /// Visited in order for every folder. Only the first is used without `fetch_all`.
    pub sort_types: Vec<i64>,
    /// Page through every folder and sort type; otherwise fetch one page.
    pub fetch_all: bool,
    /// Single-page mode stops after this many records.
    pub limit: usize,
    pub max_pages: u32,
    pub stop_after_no_new: u32,
    /// Stop the whole run after this many records; `0` disables.
    pub expected: u64,
    pub allowed: TargetTypeSet,
}

impl TraversalPlan {
    fn limits(&self) -> PageLimits {
        PageLimits {
            start_page: self.start_page,
            max_pages: self.max_pages,
            stop_after_no_new: self.stop_after_no_new,
        }
    }

    fn expected_reached(&self, accepted: usize) -> bool {
        self.fetch_all && self.expected > 0 && accepted as u64 >= self.expected
    }
}

/// Drives the traversal and owns all run-wide state.
pub struct Traversal<'g> {
    gateway: &'g dyn MojiGateway,
    plan: TraversalPlan,
    classifier: ItemClassifier,
    words: WordResolver,
    seen_global: HashSet<ItemIdentity>,
    accepted: usize,
    stopped: bool,
    last: Option<Position>,
    report: TraversalReport,
}

impl<'g> Traversal<'g> {
    pub fn new(gateway: &'g dyn MojiGateway, plan: TraversalPlan) -> Self {
        let classifier = ItemClassifier::new(plan.allowed.clone());
        Self {
            gateway,
            plan,
            classifier,
            words: WordResolver::new(),
            seen_global: HashSet::new(),
            accepted: 0,
            stopped: false,
            last: None,
            report: TraversalReport::default(),
        }
    }

    /// Walks `folders` in order, feeding accepted records into `sink`.
    ///
    /// Page-fetch failures abort the run; whatever the sink already
    /// persisted stays on disk.
    pub async fn run(
        mut self,
        folders: &[Folder],
        sink: &mut dyn ResultSink,
    ) -> Result<TraversalReport, AppError> {
        let (folders, sort_types) = if self.plan.fetch_all {
            (folders, self.plan.sort_types.clone())
        } else {
            let first_sort = self.plan.sort_types.first().copied().unwrap_or_default();
            (&folders[..folders.len().min(1)], vec![first_sort])
        };

        'folders: for folder in folders {
            for &sort_type in &sort_types {
                if self.stopped {
                    break 'folders;
                }
                if self.plan.fetch_all && sort_types.len() > 1 {
                    log::info!(
                        "== Folder {} {:?} sortType={} ==",
                        folder.id,
                        folder.title,
                        sort_type
                    );
                }
                let outcome = self.run_pair(folder, sort_type, sink).await?;
                log::debug!(
                    "Pair {} / sortType {} finished after {} page(s): {}",
                    outcome.folder_id,
                    outcome.sort_type,
                    outcome.pages,
                    outcome.reason
                );
                self.report.pairs.push(outcome);
            }
        }

        log::info!("Done. Printed items: {}", self.accepted);
        if let Some(unique) = sink.unique_items() {
            log::info!("Unique items in document: {}", unique);
        }
        self.checkpoint(sink)?;
        sink.finish()?;

        self.report.accepted = self.accepted;
        self.report.stopped_early = self.stopped;
        self.report.word_lookups = self.words.lookups();
        Ok(self.report)
    }

    async fn run_pair(
        &mut self,
        folder: &Folder,
        sort_type: i64,
        sink: &mut dyn ResultSink,
    ) -> Result<PairOutcome, AppError> {
        let mut progress = PairProgress::new(self.plan.limits());
        let mut pages = 0;
        self.last = Some(Position::new(folder, sort_type, progress.page_index()));

        let reason = loop {
            if self.stopped {
                break StopReason::ExpectedReached;
            }

            let page = self.fetch_page(folder, sort_type, progress.page_index()).await?;
            pages += 1;
            self.report.pages_fetched += 1;
            progress.observe_total_pages(page.total_pages);

            if !self.plan.fetch_all {
                log::info!("Items in page: {}", page.items.len());
            }
            if page.items.is_empty() {
                break StopReason::Exhausted;
            }

            let stats = self
                .process_page(&page, &mut progress, folder, sort_type, sink)
                .await?;
            self.last = Some(Position::new(folder, sort_type, progress.page_index()));

            if self.stopped {
                break StopReason::ExpectedReached;
            }
            self.checkpoint(sink)?;

            if !self.plan.fetch_all {
                log_preview(&stats, self.accepted);
                break StopReason::PreviewComplete;
            }

            progress.finish_page(stats.new_any);
            log::info!(
                "[folder {} {:?}] [sortType {}] [page {}] newAny={} newSelected={} totalAccepted={} noNewStreak={} server.pageIndex={} server.totalPage={} first={} last={} types: {}",
                folder.id,
                folder.title,
                sort_type,
                progress.page_index(),
                stats.new_any,
                stats.new_selected,
                self.accepted,
                progress.no_new_streak(),
                display_opt(page.server_page_index),
                display_opt(page.total_pages),
                display_opt(stats.first.as_ref()),
                display_opt(stats.last.as_ref()),
                stats.histogram_line()
            );

            if let Some(reason) = progress.stop_reason() {
                break reason;
            }
            progress.advance();
        };

        self.checkpoint(sink)?;
        Ok(PairOutcome {
            folder_id: folder.id.clone(),
            sort_type,
            pages,
            reason,
        })
    }

    /// Classifies one page's rows, updating the seen sets and the sink.
    async fn process_page(
        &mut self,
        page: &FolderPage,
        progress: &mut PairProgress,
        folder: &Folder,
        sort_type: i64,
        sink: &mut dyn ResultSink,
    ) -> Result<PageStats, AppError> {
        let mut stats = PageStats::default();
        let origin = Origin { folder, sort_type };

        for item in &page.items {
            if let Some(tag) = item.target_type {
                stats.count_tag(tag.tag());
            }
            let Some(identity) = item.identity() else {
                continue;
            };
            stats.note_identity(&identity);

            if self.plan.fetch_all {
                if !progress.mark_seen(&identity) {
                    continue;
                }
                stats.new_any += 1;
            }
            if !self.classifier.allows(item) || self.seen_global.contains(&identity) {
                continue;
            }
            stats.new_selected += 1;

            let record = self
                .classifier
                .classify(item, origin, &mut self.words, self.gateway)
                .await;
            if let Some(record) = record {
                sink.accept(&identity, record)?;
                self.seen_global.insert(identity);
                self.accepted += 1;
                stats.accepted += 1;

                if self.plan.expected_reached(self.accepted) {
                    log::info!("Reached expected count {}; stopping", self.plan.expected);
                    self.stopped = true;
                    break;
                }
            }
            if !self.plan.fetch_all && self.accepted >= self.plan.limit {
                break;
            }
        }
        Ok(stats)
    }

    async fn fetch_page(
        &self,
        folder: &Folder,
        sort_type: i64,
        page_index: u32,
    ) -> Result<FolderPage, AppError> {
        let mut params = Map::new();
        params.insert("fid".into(), Value::String(folder.id.to_string()));
        params.insert("sortType".into(), json!(sort_type));
        params.insert("pageIndex".into(), json!(page_index));
        params.insert("count".into(), json!(self.plan.page_size));
        // Without targetTypes the server may return sentence-like items only.
        if !self.plan.allowed.is_empty() {
            params.insert("targetTypes".into(), json!(self.plan.allowed.server_hint()));
        }

        let envelope = self
            .gateway
            .call_function(FN_FETCH_FOLDER_CONTENT, params)
            .await?
            .ensure_success(FN_FETCH_FOLDER_CONTENT)?;
        Ok(FolderPage::from_envelope(&envelope))
    }

    fn checkpoint(&self, sink: &mut dyn ResultSink) -> Result<(), AppError> {
        match &self.last {
            Some(position) => sink.checkpoint(&Checkpoint {
                position: position.clone(),
                printed_total: self.accepted,
                stopped: self.stopped,
            }),
            None => Ok(()),
        }
    }
}

fn log_preview(stats: &PageStats, accepted: usize) {
    log::info!("TargetType counts (this page):");
    for (tag, count) in &stats.histogram {
        log::info!("- {}: {}", tag, count);
    }
    if accepted == 0 {
        log::warn!("No matching items found in this folder page.");
        log::warn!("Try a different folder id via --folder-id <id> or increase --page/--count.");
    }
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}
