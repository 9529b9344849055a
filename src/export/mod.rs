// src/export/mod.rs
//! Export core: classification, pagination state, and the traversal.

mod classifier;
mod progress;
mod traversal;

pub use classifier::{ItemClassifier, Origin};
pub use progress::{PageLimits, PageStats, PairOutcome, PairProgress, StopReason, TraversalReport};
pub use traversal::{Traversal, TraversalPlan};
