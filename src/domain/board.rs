use crate::domain::lead::{Lead, LeadId, LeadUpdate};
use crate::domain::stage::{Stage, StageId, VisibleStages};
use crate::error::{LeadflowError, Result};
use chrono::{Local, NaiveDate};
use log::debug;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// A stage projected with its ordered leads.
///
/// The lead count is always derived from `leads`; it is emitted as `count`
/// when serialized and ignored when deserialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Column {
    pub id: StageId,
    pub title: String,
    #[serde(default)]
    pub leads: Vec<Lead>,
}

impl Column {
    pub fn new(id: impl Into<StageId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            leads: Vec::new(),
        }
    }

    pub fn with_leads(mut self, leads: Vec<Lead>) -> Self {
        self.leads = leads;
        self
    }

    pub fn count(&self) -> usize {
        self.leads.len()
    }

    fn position_of(&self, lead: LeadId) -> Option<usize> {
        self.leads.iter().position(|l| l.id == lead)
    }
}

impl From<&Stage> for Column {
    fn from(stage: &Stage) -> Self {
        Column::new(stage.id.clone(), stage.title.clone())
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Column", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("leads", &self.leads)?;
        state.end()
    }
}

/// Result of a lead lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadLocation<'a> {
    pub lead: &'a Lead,
    pub column_id: &'a StageId,
    pub index: usize,
}

/// A flattened lead for the list view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadRow<'a> {
    pub lead: &'a Lead,
    pub stage_id: &'a StageId,
    pub stage_title: &'a str,
    /// Position of the stage on the board
    pub stage_index: usize,
}

/// Sole owner of columns and leads.
///
/// Every lead id appears in exactly one column at all times.
/// Serialized as its column list; deserializing goes through [`Board::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct Board {
    columns: Vec<Column>,
}

impl TryFrom<Vec<Column>> for Board {
    type Error = LeadflowError;

    fn try_from(columns: Vec<Column>) -> Result<Self> {
        Self::new(columns)
    }
}

impl From<Board> for Vec<Column> {
    fn from(board: Board) -> Self {
        board.columns
    }
}

impl Board {
    /// Builds a board, rejecting duplicate column or lead ids
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut column_ids = HashSet::new();
        let mut lead_ids = HashSet::new();

        for column in &columns {
            if !column_ids.insert(&column.id) {
                return Err(LeadflowError::validation(
                    "columns",
                    format!("Duplicate column id: {}", column.id),
                ));
            }
            for lead in &column.leads {
                if !lead_ids.insert(lead.id) {
                    return Err(LeadflowError::validation(
                        "leads",
                        format!("Duplicate lead id: {}", lead.id),
                    ));
                }
            }
        }

        Ok(Self { columns })
    }

    /// Empty columns for each stage
    pub fn from_stages(stages: &[Stage]) -> Self {
        Self {
            columns: stages.iter().map(Column::from).collect(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &StageId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn total_leads(&self) -> usize {
        self.columns.iter().map(Column::count).sum()
    }

    pub fn lead_ids(&self) -> Vec<LeadId> {
        self.columns
            .iter()
            .flat_map(|c| c.leads.iter().map(|l| l.id))
            .collect()
    }

    pub fn next_lead_id(&self) -> LeadId {
        let max = self.lead_ids().into_iter().map(|id| id.value()).max();
        LeadId::new(max.unwrap_or(0) + 1)
    }

    /// Scans every column for the lead
    pub fn find_lead(&self, id: LeadId) -> Option<LeadLocation<'_>> {
        self.columns.iter().find_map(|column| {
            column.position_of(id).map(|index| LeadLocation {
                lead: &column.leads[index],
                column_id: &column.id,
                index,
            })
        })
    }

    /// Moves a lead between columns, stamping it with today's date
    pub fn move_lead(
        &mut self,
        lead: LeadId,
        from: &StageId,
        to: &StageId,
        to_index: Option<usize>,
    ) -> Result<()> {
        self.move_lead_on(lead, from, to, to_index, Local::now().date_naive())
    }

    /// Moves a lead from `from` into `to` at `to_index` (end when `None`).
    ///
    /// The moved lead's days-in-stage resets to 0 and its last activity
    /// names the destination stage. Inside a single column the lead is only
    /// repositioned. Unknown columns or a lead missing from `from` leave
    /// the board unchanged.
    pub fn move_lead_on(
        &mut self,
        lead: LeadId,
        from: &StageId,
        to: &StageId,
        to_index: Option<usize>,
        on: NaiveDate,
    ) -> Result<()> {
        let src = self.column_index(from)?;
        let dst = self.column_index(to)?;
        let pos = self.columns[src]
            .position_of(lead)
            .ok_or_else(|| LeadflowError::LeadNotFound(lead.to_string()))?;

        if src == dst {
            let len = self.columns[src].count();
            let target = to_index.unwrap_or(len - 1).min(len - 1);
            return self.reorder_leads(from, pos, target);
        }

        let mut moved = self.columns[src].leads.remove(pos);
        let destination = &mut self.columns[dst];
        moved.mark_moved(&destination.title, on);

        let index = to_index
            .unwrap_or(destination.leads.len())
            .min(destination.leads.len());
        destination.leads.insert(index, moved);

        debug!("moved {} from {} to {}[{}]", lead, from, to, index);
        Ok(())
    }

    /// Moves a lead within one column without touching its data
    pub fn reorder_leads(&mut self, column: &StageId, from: usize, to: usize) -> Result<()> {
        let idx = self.column_index(column)?;
        let leads = &mut self.columns[idx].leads;

        if from >= leads.len() {
            return Err(LeadflowError::IndexOutOfBounds {
                column: column.to_string(),
                index: from,
                len: leads.len(),
            });
        }
        if from == to {
            return Ok(());
        }

        let lead = leads.remove(from);
        let to = to.min(leads.len());
        leads.insert(to, lead);
        Ok(())
    }

    /// Appends a lead to a column
    pub fn insert_lead(&mut self, column: &StageId, lead: Lead) -> Result<()> {
        if self.find_lead(lead.id).is_some() {
            return Err(LeadflowError::validation(
                "id",
                format!("Duplicate lead id: {}", lead.id),
            ));
        }
        let idx = self.column_index(column)?;
        self.columns[idx].leads.push(lead);
        Ok(())
    }

    pub fn update_lead(&mut self, id: LeadId, update: LeadUpdate) -> Result<&Lead> {
        let lead = self
            .columns
            .iter_mut()
            .flat_map(|c| c.leads.iter_mut())
            .find(|l| l.id == id)
            .ok_or_else(|| LeadflowError::LeadNotFound(id.to_string()))?;
        lead.apply(update);
        Ok(&*lead)
    }

    pub fn lead_mut(&mut self, id: LeadId) -> Option<&mut Lead> {
        self.columns
            .iter_mut()
            .flat_map(|c| c.leads.iter_mut())
            .find(|l| l.id == id)
    }

    /// Rebuilds the columns to follow a new stage list.
    ///
    /// Surviving stages keep their leads (and take the new title), new
    /// stages get empty columns. Leads of removed stages are appended to the
    /// first column so none are lost; their ids are returned.
    pub fn reconcile_stages(&mut self, stages: &[Stage], on: NaiveDate) -> Vec<LeadId> {
        let mut old = std::mem::take(&mut self.columns);

        self.columns = stages
            .iter()
            .map(|stage| match old.iter().position(|c| c.id == stage.id) {
                Some(pos) => {
                    let mut column = old.remove(pos);
                    column.title = stage.title.clone();
                    column
                }
                None => Column::from(stage),
            })
            .collect();

        let orphans: Vec<Lead> = old.into_iter().flat_map(|c| c.leads).collect();
        let mut relocated = Vec::with_capacity(orphans.len());
        if let Some(first) = self.columns.first_mut() {
            for mut lead in orphans {
                lead.mark_moved(&first.title, on);
                relocated.push(lead.id);
                first.leads.push(lead);
            }
        }

        if !relocated.is_empty() {
            debug!("relocated {} leads from removed stages", relocated.len());
        }
        relocated
    }

    /// Columns named by the visible set, in board order
    pub fn visible_columns(&self, visible: &VisibleStages) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| visible.contains(&c.id))
            .collect()
    }

    /// All leads flattened with their stage
    pub fn rows(&self) -> Vec<LeadRow<'_>> {
        self.columns
            .iter()
            .enumerate()
            .flat_map(|(stage_index, column)| {
                column.leads.iter().map(move |lead| LeadRow {
                    lead,
                    stage_id: &column.id,
                    stage_title: &column.title,
                    stage_index,
                })
            })
            .collect()
    }

    fn column_index(&self, id: &StageId) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| LeadflowError::ColumnNotFound(id.to_string()))
    }
}
