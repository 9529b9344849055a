// src/lib.rs
//! moji-export library: exports saved MOJi dictionary words and example
//! sentences by replaying the web client's private API calls.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `GatewayError`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `ExportConfig`
//! - **Domain model**: `Folder`, `RawItem`, `ExportRecord`, `ItemIdentity`
//! - **API client**: the `MojiGateway` seam and its reqwest implementation
//! - **Export core**: `Traversal`, `ItemClassifier`, `WordResolver`
//! - **Output**: `ResultSink` and its streaming and buffered sinks

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, GatewayError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{
    parse_sort_types, CommandLineInput, ExportConfig, ExportMode, OutputTarget, RunCommand,
};

// --- Domain Model ---
pub use crate::model::{ExportRecord, Folder, RawItem, SentenceRecord, WordFields, WordRecord};

// --- Domain Types ---
pub use crate::types::{
    FolderId, ItemId, ItemIdentity, ItemKind, SessionToken, TargetType, TargetTypeSet, WordId,
};

// --- API Client ---
pub use crate::api::{
    discover_folders, fetch_item_targets, select_folders, ApiEndpoints, AppIdentity,
    FolderHeuristic, FolderPage, FolderSelection, ItemTargets, MojiGateway, MojiHttpClient,
    RemoteCall, SentenceKeywordHeuristic, SessionContext, WordResolver,
};

// --- Export Core ---
pub use crate::export::{
    ItemClassifier, PairOutcome, StopReason, Traversal, TraversalPlan, TraversalReport,
};

// --- Output ---
pub use crate::output::{BufferedSink, Checkpoint, Position, ResultSink, RunMeta, StreamingSink};

// --- Pipeline Traits ---
pub use crate::pipeline::{ExportPipeline, ExportSummary, FolderSource, RecordExporter, RunOutcome};
