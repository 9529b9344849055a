// src/pipeline.rs
//! Export pipeline: discover → select → traverse → final materialization.
//!
//! Each stage is a capability trait so the stages can be tested in
//! isolation against a fake gateway.

use crate::api::{
    discover_folders, fetch_item_targets, select_folders, FolderHeuristic, ItemTargets,
    MojiGateway, SentenceKeywordHeuristic,
};
use crate::config::{ExportConfig, OutputTarget, RunCommand};
use crate::error::AppError;
use crate::export::{Traversal, TraversalReport};
use crate::model::Folder;
use crate::output::{BufferedSink, ResultSink, StreamingSink};

/// Produces the folders a run traverses.
#[async_trait::async_trait]
pub trait FolderSource {
    async fn folders(&self) -> Result<Vec<Folder>, AppError>;
}

/// Walks folders and hands records to a sink.
#[async_trait::async_trait]
pub trait RecordExporter {
    async fn export(
        &self,
        folders: &[Folder],
        sink: &mut dyn ResultSink,
    ) -> Result<TraversalReport, AppError>;
}

/// What a finished run produced.
#[derive(Debug)]
pub enum RunOutcome {
    ItemTargets(ItemTargets),
    Export(ExportSummary),
}

#[derive(Debug)]
pub struct ExportSummary {
    pub folders: Vec<Folder>,
    pub report: TraversalReport,
}

/// Wires the configured stages together for one run.
pub struct ExportPipeline<'a> {
    config: &'a ExportConfig,
    gateway: &'a dyn MojiGateway,
    heuristic: Box<dyn FolderHeuristic + Send + Sync>,
}

impl<'a> ExportPipeline<'a> {
    pub fn new(config: &'a ExportConfig, gateway: &'a dyn MojiGateway) -> Self {
        Self {
            config,
            gateway,
            heuristic: Box::new(SentenceKeywordHeuristic),
        }
    }

    /// Replaces the folder heuristic used when no folder was named.
    pub fn with_heuristic(mut self, heuristic: Box<dyn FolderHeuristic + Send + Sync>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Runs the configured command, writing to the configured output.
    pub async fn run(&self) -> Result<RunOutcome, AppError> {
        match &self.config.command {
            RunCommand::ItemTargets(item_id) => {
                log::info!("Fetching folders containing item {}", item_id);
                let targets = fetch_item_targets(self.gateway, item_id).await?;
                Ok(RunOutcome::ItemTargets(targets))
            }
            RunCommand::Export => {
                let folders = self.folders().await?;
                let mut sink = self.open_sink()?;
                let report = self.export(&folders, sink.as_mut()).await?;
                Ok(RunOutcome::Export(ExportSummary { folders, report }))
            }
        }
    }

    /// Runs discovery and traversal into a caller-supplied sink.
    pub async fn run_into(
        &self,
        sink: &mut dyn ResultSink,
    ) -> Result<ExportSummary, AppError> {
        let folders = self.folders().await?;
        let report = self.export(&folders, sink).await?;
        Ok(ExportSummary { folders, report })
    }

    fn open_sink(&self) -> Result<Box<dyn ResultSink>, AppError> {
        Ok(match &self.config.output {
            OutputTarget::Stdout => Box::new(StreamingSink::stdout()),
            OutputTarget::TextFile(path) => Box::new(StreamingSink::create(path)?),
            OutputTarget::JsonFile(path) => {
                log::info!("Writing JSON document to {}", path.display());
                Box::new(BufferedSink::new(path, self.config.run_meta()))
            }
        })
    }
}

#[async_trait::async_trait]
impl FolderSource for ExportPipeline<'_> {
    async fn folders(&self) -> Result<Vec<Folder>, AppError> {
        let pfid = self.config.pfid.as_ref();
        let discovered = discover_folders(self.gateway, pfid).await?;
        select_folders(
            &self.config.selection,
            &discovered,
            pfid,
            self.heuristic.as_ref(),
        )
    }
}

#[async_trait::async_trait]
impl RecordExporter for ExportPipeline<'_> {
    async fn export(
        &self,
        folders: &[Folder],
        sink: &mut dyn ResultSink,
    ) -> Result<TraversalReport, AppError> {
        let report = Traversal::new(self.gateway, self.config.plan.clone())
            .run(folders, sink)
            .await?;
        log::info!(
            "Exported {} item(s) from {} page(s) across {} folder/sort pair(s); {} word lookup(s)",
            report.accepted,
            report.pages_fetched,
            report.pairs_visited(),
            report.word_lookups
        );
        Ok(report)
    }
}
