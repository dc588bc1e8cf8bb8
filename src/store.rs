use crate::{
    config::PipelineConfig,
    domain::{
        sort_rows, ActivityKind, ActivityStatus, Board, Column, DragEvent, DragOutcome,
        DragSession, Lead, LeadDraft, LeadId, LeadRow, LeadSortField, LeadUpdate, PipelineStats,
        SortOrder, Stage, StageDraft, StageId, StageProgress, StageSet, VisibleStages,
    },
    error::{LeadflowError, Result},
    service::LeadService,
};
use chrono::{Local, NaiveDate};
use log::{debug, warn};
use std::sync::Arc;

/// What the presentation layer receives after a stage save
#[derive(Debug, Clone, PartialEq)]
pub struct StagesSaved {
    pub stages: Vec<Stage>,
    pub visible: VisibleStages,
    /// Leads moved out of removed stages
    pub relocated: Vec<LeadId>,
}

/// Everything the lead detail view shows
#[derive(Debug, Clone, PartialEq)]
pub struct LeadDetail<'a> {
    pub lead: &'a Lead,
    pub stage: &'a Column,
    pub progress: Vec<(&'a Stage, StageProgress)>,
}

/// Single owner of the board, the stage set and the drag session.
///
/// Mutations are applied locally first and then sent to the service; when
/// the service rejects one, the local change is rolled back and the message
/// is kept in [`PipelineStore::last_error`].
pub struct PipelineStore {
    config: PipelineConfig,
    board: Board,
    stages: StageSet,
    drag: DragSession,
    service: Arc<dyn LeadService>,
    last_error: Option<String>,
}

impl PipelineStore {
    /// Creates a store with empty columns for the configured stages
    pub fn new(config: PipelineConfig, service: Arc<dyn LeadService>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            board: Board::from_stages(&config.stages),
            stages: config.stage_set(),
            drag: DragSession::new(),
            service,
            last_error: None,
            config,
        })
    }

    /// Creates a store and fills it from the service
    pub async fn load(config: PipelineConfig, service: Arc<dyn LeadService>) -> Result<Self> {
        let mut store = Self::new(config, service)?;
        store.refresh().await?;
        Ok(store)
    }

    /// Reloads all leads, laid out along the committed stage list
    pub async fn refresh(&mut self) -> Result<()> {
        if self.drag.is_active() {
            self.drag.cancel(&mut self.board);
        }

        let fetched = self.service.get_leads().await;
        let columns = match fetched {
            Ok(columns) => columns,
            Err(err) => return Err(self.record(err)),
        };
        let mut board = Board::new(columns)?;
        board.reconcile_stages(self.stages.stages(), today());

        self.board = board;
        self.last_error = None;
        Ok(())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stages(&self) -> &StageSet {
        &self.stages
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn visible_columns(&self) -> Vec<&Column> {
        self.board.visible_columns(self.stages.visible())
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats::compute(
            &self.board,
            &self.config.won_stage_id,
            &self.config.lost_stage_id,
        )
    }

    /// Rows for the list view, sorted
    pub fn list_rows(&self, field: LeadSortField, order: SortOrder) -> Vec<LeadRow<'_>> {
        let mut rows = self.board.rows();
        sort_rows(&mut rows, field, order);
        rows
    }

    pub fn lead_detail(&self, id: LeadId) -> Option<LeadDetail<'_>> {
        let found = self.board.find_lead(id)?;
        let stage = self.board.column(found.column_id)?;
        Some(LeadDetail {
            lead: found.lead,
            stage,
            progress: self.stages.progress(found.column_id),
        })
    }

    /// Moves a lead and reports the move to the service.
    ///
    /// Unknown leads or columns are a silent no-op.
    pub async fn move_lead(
        &mut self,
        lead: LeadId,
        from: &StageId,
        to: &StageId,
        to_index: Option<usize>,
    ) -> Result<()> {
        let before = self.board.clone();
        if let Err(err) = self.board.move_lead(lead, from, to, to_index) {
            return self.ignore_lookup_miss(err);
        }
        if from == to {
            return Ok(());
        }

        let synced = self.service.move_lead(lead, from, to).await;
        if let Err(err) = synced {
            self.board = before;
            return Err(self.record(err));
        }
        Ok(())
    }

    /// Reorders within a column; local only
    pub fn reorder_leads(&mut self, column: &StageId, from: usize, to: usize) -> Result<()> {
        match self.board.reorder_leads(column, from, to) {
            Ok(()) => Ok(()),
            Err(err) => self.ignore_lookup_miss(err),
        }
    }

    /// Feeds a drag callback through the session.
    ///
    /// A drop into another column is reported to the service; if that
    /// fails the board returns to its state at drag start.
    pub async fn handle_drag(&mut self, event: DragEvent) -> Result<DragOutcome> {
        let outcome = self.drag.handle(&mut self.board, event);

        if let DragOutcome::Dropped {
            lead,
            from,
            to,
            before,
        } = &outcome
        {
            let synced = self.service.move_lead(*lead, from, to).await;
            if let Err(err) = synced {
                self.board = (**before).clone();
                return Err(self.record(err));
            }
        }
        Ok(outcome)
    }

    pub async fn update_lead(&mut self, id: LeadId, update: LeadUpdate) -> Result<Lead> {
        let previous = self
            .board
            .find_lead(id)
            .map(|found| found.lead.clone())
            .ok_or_else(|| LeadflowError::LeadNotFound(id.to_string()))?;

        let updated = self.board.update_lead(id, update.clone())?.clone();
        let synced = self.service.update_lead(id, update).await;
        if let Err(err) = synced {
            if let Some(lead) = self.board.lead_mut(id) {
                *lead = previous;
            }
            return Err(self.record(err));
        }
        Ok(updated)
    }

    pub async fn schedule_activity(
        &mut self,
        id: LeadId,
        kind: ActivityKind,
        due: NaiveDate,
    ) -> Result<ActivityStatus> {
        self.schedule_activity_on(id, kind, due, today()).await
    }

    /// Schedules the next activity and syncs the recomputed status
    pub async fn schedule_activity_on(
        &mut self,
        id: LeadId,
        kind: ActivityKind,
        due: NaiveDate,
        today: NaiveDate,
    ) -> Result<ActivityStatus> {
        let lead = self
            .board
            .lead_mut(id)
            .ok_or_else(|| LeadflowError::LeadNotFound(id.to_string()))?;
        let previous = lead.clone();
        lead.schedule_activity(kind, due, today);
        let status = lead.activity_status;
        debug!("scheduled {} for {} on {}", kind, id, due);

        let update = LeadUpdate {
            activity_status: Some(status),
            ..LeadUpdate::default()
        };
        let synced = self.service.update_lead(id, update).await;
        if let Err(err) = synced {
            if let Some(lead) = self.board.lead_mut(id) {
                *lead = previous;
            }
            return Err(self.record(err));
        }
        Ok(status)
    }

    /// Creates a lead remotely and appends it to the first column
    pub async fn create_lead(&mut self, draft: LeadDraft) -> Result<Lead> {
        let created = self.service.create_lead(draft).await;
        let lead = match created {
            Ok(lead) => lead,
            Err(err) if err.is_user_warning() => return Err(err),
            Err(err) => return Err(self.record(err)),
        };

        let first = self
            .board
            .columns()
            .first()
            .map(|c| c.id.clone())
            .ok_or_else(|| LeadflowError::ColumnNotFound("(empty board)".to_string()))?;
        self.board.insert_lead(&first, lead.clone())?;
        Ok(lead)
    }

    /// Opens an edit session over the committed stages
    pub fn edit_stages(&self) -> StageDraft {
        self.stages.edit()
    }

    /// Validates and commits a stage list, lays the board out along it and
    /// sends it to the service. A service failure restores both.
    pub async fn save_stages(&mut self, stages: Vec<Stage>) -> Result<StagesSaved> {
        let stages_before = self.stages.clone();
        let board_before = self.board.clone();

        self.stages.save(stages)?;
        let relocated = self.board.reconcile_stages(self.stages.stages(), today());

        let synced = self.service.save_stages(self.stages.stages()).await;
        if let Err(err) = synced {
            self.stages = stages_before;
            self.board = board_before;
            return Err(self.record(err));
        }

        Ok(StagesSaved {
            stages: self.stages.stages().to_vec(),
            visible: self.stages.visible().clone(),
            relocated,
        })
    }

    pub fn set_visible_stages(&mut self, visible: VisibleStages) {
        self.stages.set_visible(visible);
    }

    pub fn toggle_stage_visibility(&mut self, id: StageId) {
        self.stages.toggle_visible(id);
    }

    fn ignore_lookup_miss(&self, err: LeadflowError) -> Result<()> {
        if err.is_lookup_miss() {
            debug!("ignored: {}", err);
            Ok(())
        } else {
            Err(err)
        }
    }

    fn record(&mut self, err: LeadflowError) -> LeadflowError {
        warn!("{}", err);
        self.last_error = Some(err.to_string());
        err
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
