//! # Leadflow Core
//!
//! Core domain logic for the Leadflow sales pipeline board.
//!
//! This crate owns the ordered lead columns behind the kanban board, the
//! drag session that turns pointer and keyboard drags into board moves, and
//! the stage manager that edits the pipeline itself. Rendering, routing and
//! the real network client live elsewhere; the [`service::LeadService`]
//! trait is the seam to the latter.

pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use domain::{
    board::{Board, Column},
    drag::{DragEvent, DragOutcome, DragSession},
    lead::{ActivityStatus, Lead, LeadId},
    stage::{Stage, StageId, StageSet},
};
pub use error::{LeadflowError, Result};
pub use service::LeadService;
pub use store::PipelineStore;
