use crate::{
    config::PipelineConfig,
    domain::{Board, Column, Lead, LeadDraft, LeadId, LeadUpdate, Stage, StageId},
    error::{LeadflowError, Result},
    service::{seed::seed_columns, LeadService},
};
use async_trait::async_trait;
use chrono::Local;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// In-memory lead service with a fixed artificial latency
pub struct MockLeadService {
    board: Mutex<Board>,
    latency: Duration,
    failing: AtomicBool,
}

impl MockLeadService {
    /// Creates a service holding the demo pipeline
    pub fn new(latency: Duration) -> Result<Self> {
        Ok(Self::with_board(Board::new(seed_columns())?, latency))
    }

    /// Demo pipeline laid out along the configured stages, with the
    /// configured latency
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut board = Board::new(seed_columns())?;
        board.reconcile_stages(&config.stages, Local::now().date_naive());
        Ok(Self::with_board(board, config.service_latency()))
    }

    pub fn with_board(board: Board, latency: Duration) -> Self {
        Self {
            board: Mutex::new(board),
            latency,
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every following call fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> Board {
        self.board.lock().await.clone()
    }

    async fn round_trip(&self, call: &str) -> Result<()> {
        sleep(self.latency).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(LeadflowError::Service(format!("{} failed: service unavailable", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl LeadService for MockLeadService {
    async fn get_leads(&self) -> Result<Vec<Column>> {
        self.round_trip("get_leads").await?;
        Ok(self.board.lock().await.columns().to_vec())
    }

    async fn move_lead(&self, lead: LeadId, from: &StageId, to: &StageId) -> Result<()> {
        self.round_trip("move_lead").await?;
        info!("Moving lead {} from {} to {}", lead, from, to);
        self.board.lock().await.move_lead(lead, from, to, None)
    }

    async fn update_lead(&self, lead: LeadId, update: LeadUpdate) -> Result<Lead> {
        self.round_trip("update_lead").await?;
        info!("Updating lead {}: {:?}", lead, update);
        let mut board = self.board.lock().await;
        board.update_lead(lead, update).cloned()
    }

    async fn save_stages(&self, stages: &[Stage]) -> Result<()> {
        self.round_trip("save_stages").await?;
        let relocated = self
            .board
            .lock()
            .await
            .reconcile_stages(stages, Local::now().date_naive());
        info!(
            "Saved {} stages, relocated {} leads",
            stages.len(),
            relocated.len()
        );
        Ok(())
    }

    async fn create_lead(&self, mut draft: LeadDraft) -> Result<Lead> {
        self.round_trip("create_lead").await?;
        let mut board = self.board.lock().await;

        if draft.id.is_none() {
            draft.id = Some(board.next_lead_id().value());
        }
        let lead = draft.validate()?;
        let first = board
            .columns()
            .first()
            .map(|c| c.id.clone())
            .ok_or_else(|| LeadflowError::ColumnNotFound("(empty board)".to_string()))?;

        board.insert_lead(&first, lead.clone())?;
        info!("Created lead {} in {}", lead.id, first);
        Ok(lead)
    }
}
