use crate::{
    domain::{Column, Lead, LeadDraft, LeadId, LeadUpdate, Stage, StageId},
    error::Result,
};
use async_trait::async_trait;

pub mod mock;
pub mod seed;

pub use mock::MockLeadService;

/// Remote data service behind the board
#[async_trait]
pub trait LeadService: Send + Sync {
    /// Loads every column with its leads, in board order
    async fn get_leads(&self) -> Result<Vec<Column>>;

    /// Records that a lead changed stage
    async fn move_lead(&self, lead: LeadId, from: &StageId, to: &StageId) -> Result<()>;

    /// Applies a partial update and returns the stored lead
    async fn update_lead(&self, lead: LeadId, update: LeadUpdate) -> Result<Lead>;

    /// Lays the stored columns out along a saved stage list.
    /// Leads of removed stages move to the first stage.
    async fn save_stages(&self, stages: &[Stage]) -> Result<()>;

    /// Validates and stores a new lead in the first stage.
    /// An id is assigned when the draft has none.
    async fn create_lead(&self, draft: LeadDraft) -> Result<Lead>;
}
