pub mod board;
pub mod drag;
pub mod lead;
pub mod sorting;
pub mod stage;
pub mod stats;

pub use board::{Board, Column, LeadLocation, LeadRow};
pub use drag::{DragEvent, DragOutcome, DragSession, DragState, DragTarget};
pub use lead::{ActivityKind, ActivityStatus, Lead, LeadDraft, LeadId, LeadUpdate, ScheduledActivity};
pub use sorting::{sort_rows, LeadSortField, SortOrder};
pub use stage::{Stage, StageBounds, StageDraft, StageId, StageProgress, StageSet, VisibleStages};
pub use stats::PipelineStats;
