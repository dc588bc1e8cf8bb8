use crate::domain::board::Board;
use crate::domain::lead::LeadId;
use crate::domain::stage::StageId;
use crate::error::{LeadflowError, Result};
use log::debug;
use std::str::FromStr;

/// What a pointer is over: a lead card or a column's empty area
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragTarget {
    Lead(LeadId),
    Column(StageId),
}

impl FromStr for DragTarget {
    type Err = LeadflowError;

    /// `lead-<n>` names a lead; anything else names a column
    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("lead-") {
            LeadId::from_str(s).map(Self::Lead)
        } else if s.is_empty() {
            Err(LeadflowError::ColumnNotFound(String::new()))
        } else {
            Ok(Self::Column(StageId::new(s)))
        }
    }
}

/// Raw drag callbacks, carrying the identifiers the UI layer hands out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start { active: String },
    Over { over: Option<String> },
    End { over: Option<String> },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging { lead: LeadId, origin: StageId },
    /// At least one provisional move has been applied
    HoverPreview { lead: LeadId, origin: StageId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Ignored,
    Started {
        lead: LeadId,
        origin: StageId,
    },
    Previewed {
        lead: LeadId,
        to: StageId,
    },
    Reordered {
        lead: LeadId,
        column: StageId,
        from: usize,
        to: usize,
    },
    /// The drag finished in a different column than it started in
    Dropped {
        lead: LeadId,
        from: StageId,
        to: StageId,
        before: Box<Board>,
    },
    Unchanged {
        lead: LeadId,
    },
    Cancelled {
        lead: LeadId,
    },
}

/// Tracks one drag at a time and applies its moves to a [`Board`].
///
/// Hover moves are applied immediately for live feedback. A snapshot of the
/// board taken at drag start is restored on cancel.
#[derive(Debug, Clone)]
pub struct DragSession {
    state: DragState,
    snapshot: Option<Board>,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            snapshot: None,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn active_lead(&self) -> Option<LeadId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { lead, .. } | DragState::HoverPreview { lead, .. } => Some(*lead),
        }
    }

    pub fn origin(&self) -> Option<&StageId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { origin, .. } | DragState::HoverPreview { origin, .. } => {
                Some(origin)
            }
        }
    }

    /// Dispatches a raw UI event
    pub fn handle(&mut self, board: &mut Board, event: DragEvent) -> DragOutcome {
        match event {
            DragEvent::Start { active } => match LeadId::from_str(&active) {
                Ok(lead) => self.start(board, lead),
                Err(err) => {
                    debug!("drag start ignored: {}", err);
                    self.clear();
                    DragOutcome::Ignored
                }
            },
            DragEvent::Over { over } => {
                let target = parse_target(over.as_deref());
                match target {
                    Some(target) => self.over(board, &target),
                    None => DragOutcome::Ignored,
                }
            }
            DragEvent::End { over } => {
                let target = parse_target(over.as_deref());
                self.end(board, target.as_ref())
            }
            DragEvent::Cancel => self.cancel(board),
        }
    }

    pub fn start(&mut self, board: &Board, lead: LeadId) -> DragOutcome {
        if let Some(previous) = self.active_lead() {
            debug!("drag of {} superseded by {}", previous, lead);
        }

        let Some(found) = board.find_lead(lead) else {
            debug!("drag start ignored: {} not on board", lead);
            self.clear();
            return DragOutcome::Ignored;
        };

        let origin = found.column_id.clone();
        self.snapshot = Some(board.clone());
        self.state = DragState::Dragging {
            lead,
            origin: origin.clone(),
        };
        DragOutcome::Started { lead, origin }
    }

    /// Applies a provisional cross-column move while hovering
    pub fn over(&mut self, board: &mut Board, target: &DragTarget) -> DragOutcome {
        let Some(lead) = self.active_lead() else {
            return DragOutcome::Ignored;
        };
        let Some(current) = board.find_lead(lead) else {
            debug!("drag over ignored: {} vanished from board", lead);
            return DragOutcome::Ignored;
        };
        let current_column = current.column_id.clone();

        let (to, index) = match target {
            DragTarget::Lead(over) if *over == lead => return DragOutcome::Ignored,
            DragTarget::Lead(over) => match board.find_lead(*over) {
                // same column: reordering waits for drag end
                Some(found) if found.column_id != &current_column => {
                    (found.column_id.clone(), Some(found.index))
                }
                Some(_) => return DragOutcome::Ignored,
                None => {
                    debug!("drag over ignored: {} not on board", over);
                    return DragOutcome::Ignored;
                }
            },
            DragTarget::Column(column) if *column == current_column => {
                return DragOutcome::Ignored
            }
            DragTarget::Column(column) => (column.clone(), None),
        };

        if let Err(err) = board.move_lead(lead, &current_column, &to, index) {
            debug!("drag preview ignored: {}", err);
            return DragOutcome::Ignored;
        }

        if let DragState::Dragging { origin, .. } = &self.state {
            let origin = origin.clone();
            self.state = DragState::HoverPreview { lead, origin };
        }
        DragOutcome::Previewed { lead, to }
    }

    /// Commits the final position and returns to idle.
    ///
    /// Without a target the last preview position stands.
    pub fn end(&mut self, board: &mut Board, target: Option<&DragTarget>) -> DragOutcome {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let snapshot = self.snapshot.take();
        let (lead, origin) = match state {
            DragState::Idle => return DragOutcome::Ignored,
            DragState::Dragging { lead, origin } | DragState::HoverPreview { lead, origin } => {
                (lead, origin)
            }
        };

        let Some(current) = board.find_lead(lead) else {
            debug!("drag end ignored: {} vanished from board", lead);
            return DragOutcome::Ignored;
        };
        let current_column = current.column_id.clone();
        let current_index = current.index;

        let mut reordered = None;
        match target {
            Some(DragTarget::Lead(over)) if *over != lead => {
                let hovered = board
                    .find_lead(*over)
                    .map(|found| (found.column_id == &current_column, found.index));
                match hovered {
                    Some((true, to)) => {
                        if board
                            .reorder_leads(&current_column, current_index, to)
                            .is_ok()
                            && current_index != to
                        {
                            reordered = Some((current_index, to));
                        }
                    }
                    Some((false, _)) => {}
                    None => debug!("drop target {} not on board", over),
                }
            }
            Some(DragTarget::Column(column)) if *column != current_column => {
                if let Err(err) = board.move_lead(lead, &current_column, column, None) {
                    debug!("drop ignored: {}", err);
                }
            }
            _ => {}
        }

        let final_column = board
            .find_lead(lead)
            .map(|found| found.column_id.clone())
            .unwrap_or(current_column);

        if final_column != origin {
            DragOutcome::Dropped {
                lead,
                from: origin,
                to: final_column,
                before: Box::new(snapshot.unwrap_or_else(|| board.clone())),
            }
        } else if let Some((from, to)) = reordered {
            DragOutcome::Reordered {
                lead,
                column: final_column,
                from,
                to,
            }
        } else {
            DragOutcome::Unchanged { lead }
        }
    }

    /// Aborts the drag, restoring the board as it was at drag start
    pub fn cancel(&mut self, board: &mut Board) -> DragOutcome {
        let lead = self.active_lead();
        let snapshot = self.snapshot.take();
        self.state = DragState::Idle;

        match (lead, snapshot) {
            (Some(lead), Some(snapshot)) => {
                *board = snapshot;
                DragOutcome::Cancelled { lead }
            }
            _ => DragOutcome::Ignored,
        }
    }

    fn clear(&mut self) {
        self.state = DragState::Idle;
        self.snapshot = None;
    }
}

fn parse_target(raw: Option<&str>) -> Option<DragTarget> {
    let raw = raw?;
    match DragTarget::from_str(raw) {
        Ok(target) => Some(target),
        Err(err) => {
            debug!("unresolvable drag target: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::Column;
    use crate::domain::lead::Lead;

    fn lead(id: u32) -> Lead {
        Lead::new(LeadId::new(id), format!("Lead {}", id), "Leaf removal").with_days(2)
    }

    fn board() -> Board {
        Board::new(vec![
            Column::new("new", "New Leads").with_leads(vec![lead(1), lead(2), lead(3)]),
            Column::new("contacted", "Contacted").with_leads(vec![lead(4), lead(5)]),
            Column::new("won", "Won leads"),
        ])
        .unwrap()
    }

    fn ids(board: &Board, column: &str) -> Vec<u32> {
        board
            .column(&StageId::new(column))
            .unwrap()
            .leads
            .iter()
            .map(|l| l.id.value())
            .collect()
    }

    fn event_start(id: &str) -> DragEvent {
        DragEvent::Start {
            active: id.to_string(),
        }
    }

    fn event_over(id: &str) -> DragEvent {
        DragEvent::Over {
            over: Some(id.to_string()),
        }
    }

    fn event_end(id: Option<&str>) -> DragEvent {
        DragEvent::End {
            over: id.map(str::to_string),
        }
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!(
            DragTarget::from_str("lead-4").unwrap(),
            DragTarget::Lead(LeadId::new(4))
        );
        assert_eq!(
            DragTarget::from_str("quote-sent").unwrap(),
            DragTarget::Column(StageId::new("quote-sent"))
        );
        assert!(DragTarget::from_str("lead-x").is_err());
        assert!(DragTarget::from_str("").is_err());
    }

    #[test]
    fn test_start_records_origin() {
        let mut board = board();
        let mut session = DragSession::new();

        let outcome = session.handle(&mut board, event_start("lead-4"));

        assert_eq!(
            outcome,
            DragOutcome::Started {
                lead: LeadId::new(4),
                origin: StageId::new("contacted")
            }
        );
        assert_eq!(session.origin().unwrap().as_str(), "contacted");
        assert!(matches!(session.state(), DragState::Dragging { .. }));
    }

    #[test]
    fn test_start_with_unknown_lead_clears_session() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));

        assert_eq!(
            session.handle(&mut board, event_start("lead-99")),
            DragOutcome::Ignored
        );
        assert!(!session.is_active());

        assert_eq!(
            session.handle(&mut board, event_start("not-a-lead")),
            DragOutcome::Ignored
        );
        assert!(!session.is_active());
    }

    #[test]
    fn test_hover_over_lead_in_other_column_previews_move() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));

        let outcome = session.handle(&mut board, event_over("lead-5"));

        assert_eq!(
            outcome,
            DragOutcome::Previewed {
                lead: LeadId::new(1),
                to: StageId::new("contacted")
            }
        );
        assert_eq!(ids(&board, "new"), vec![2, 3]);
        assert_eq!(ids(&board, "contacted"), vec![4, 1, 5]);
        assert!(matches!(session.state(), DragState::HoverPreview { .. }));
    }

    #[test]
    fn test_hover_over_lead_in_same_column_does_nothing() {
        let mut board = board();
        let before = board.clone();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));

        assert_eq!(
            session.handle(&mut board, event_over("lead-3")),
            DragOutcome::Ignored
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_hover_over_empty_column_appends() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-2"));

        session.handle(&mut board, event_over("won"));

        assert_eq!(ids(&board, "won"), vec![2]);
        assert_eq!(ids(&board, "new"), vec![1, 3]);
    }

    #[test]
    fn test_drop_on_lead_in_same_column_reorders() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));

        let outcome = session.handle(&mut board, event_end(Some("lead-3")));

        assert_eq!(
            outcome,
            DragOutcome::Reordered {
                lead: LeadId::new(1),
                column: StageId::new("new"),
                from: 0,
                to: 2
            }
        );
        assert_eq!(ids(&board, "new"), vec![2, 3, 1]);
        assert!(!session.is_active());
    }

    #[test]
    fn test_drop_on_column_without_hover_moves_to_end() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));

        let outcome = session.handle(&mut board, event_end(Some("contacted")));

        match outcome {
            DragOutcome::Dropped { lead, from, to, before } => {
                assert_eq!(lead, LeadId::new(1));
                assert_eq!(from.as_str(), "new");
                assert_eq!(to.as_str(), "contacted");
                assert_eq!(ids(&before, "new"), vec![1, 2, 3]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(ids(&board, "contacted"), vec![4, 5, 1]);
        let moved = board.find_lead(LeadId::new(1)).unwrap().lead;
        assert_eq!(moved.days, 0);
        assert!(moved.last_activity.contains("Contacted"));
    }

    #[test]
    fn test_preview_then_reorder_in_new_column() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));
        session.handle(&mut board, event_over("lead-4"));
        assert_eq!(ids(&board, "contacted"), vec![1, 4, 5]);

        let outcome = session.handle(&mut board, event_end(Some("lead-5")));

        assert!(matches!(outcome, DragOutcome::Dropped { ref to, .. } if to.as_str() == "contacted"));
        assert_eq!(ids(&board, "contacted"), vec![4, 5, 1]);
    }

    #[test]
    fn test_drop_without_target_keeps_last_preview() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-3"));
        session.handle(&mut board, event_over("won"));

        let outcome = session.handle(&mut board, event_end(None));

        assert!(matches!(outcome, DragOutcome::Dropped { .. }));
        assert_eq!(ids(&board, "won"), vec![3]);
        assert!(!session.is_active());
    }

    #[test]
    fn test_drop_back_in_origin_is_unchanged() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-2"));

        assert_eq!(
            session.handle(&mut board, event_end(None)),
            DragOutcome::Unchanged {
                lead: LeadId::new(2)
            }
        );
    }

    #[test]
    fn test_cancel_restores_snapshot() {
        let mut board = board();
        let before = board.clone();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));
        session.handle(&mut board, event_over("won"));
        session.handle(&mut board, event_over("lead-4"));
        assert_ne!(board, before);

        let outcome = session.handle(&mut board, DragEvent::Cancel);

        assert_eq!(
            outcome,
            DragOutcome::Cancelled {
                lead: LeadId::new(1)
            }
        );
        assert_eq!(board, before);
        assert!(!session.is_active());
    }

    #[test]
    fn test_events_while_idle_are_ignored() {
        let mut board = board();
        let before = board.clone();
        let mut session = DragSession::new();

        assert_eq!(session.handle(&mut board, event_over("won")), DragOutcome::Ignored);
        assert_eq!(session.handle(&mut board, event_end(Some("won"))), DragOutcome::Ignored);
        assert_eq!(session.handle(&mut board, DragEvent::Cancel), DragOutcome::Ignored);
        assert_eq!(board, before);
    }

    #[test]
    fn test_hover_over_unknown_column_is_ignored() {
        let mut board = board();
        let before = board.clone();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-1"));

        assert_eq!(
            session.handle(&mut board, event_over("archived")),
            DragOutcome::Ignored
        );
        assert_eq!(board, before);
        assert!(matches!(session.state(), DragState::Dragging { .. }));
    }

    #[test]
    fn test_long_drag_keeps_every_lead_once() {
        let mut board = board();
        let mut session = DragSession::new();
        session.handle(&mut board, event_start("lead-5"));
        for target in ["lead-1", "won", "lead-3", "contacted", "lead-2", "lead-4"] {
            session.handle(&mut board, event_over(target));
            let mut all: Vec<u32> = board.lead_ids().iter().map(|id| id.value()).collect();
            all.sort_unstable();
            assert_eq!(all, vec![1, 2, 3, 4, 5]);
        }
        session.handle(&mut board, event_end(Some("lead-1")));
        assert_eq!(board.total_leads(), 5);
    }
}
