use crate::error::{LeadflowError, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};
use uuid::Uuid;

/// Identifier of a pipeline stage (and of the column projecting it)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh identifier for a stage added by the user
    pub fn generate() -> Self {
        Self(format!("stage-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named pipeline phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub title: String,
}

impl Stage {
    pub fn new(id: impl Into<StageId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Builds a stage from raw input, trimming both fields
    pub fn validated(id: &str, title: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(LeadflowError::validation("id", "Stage ID is required"));
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(LeadflowError::validation("title", "Stage title is required"));
        }
        Ok(Self::new(id, title))
    }
}

impl From<String> for StageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Capacity limits for the stage list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for StageBounds {
    fn default() -> Self {
        Self { min: 2, max: 8 }
    }
}

/// Ordered subset of stage ids whose columns are rendered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibleStages(Vec<StageId>);

impl VisibleStages {
    pub fn new(ids: Vec<StageId>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[StageId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &StageId) -> bool {
        self.0.contains(id)
    }

    /// Hides a visible stage, or appends a hidden one
    pub fn toggle(&mut self, id: StageId) {
        if let Some(pos) = self.0.iter().position(|v| v == &id) {
            self.0.remove(pos);
        } else {
            self.0.push(id);
        }
    }

    /// Drops ids that no longer name a stage
    pub fn prune(&mut self, stages: &[Stage]) {
        self.0.retain(|id| stages.iter().any(|s| &s.id == id));
    }
}

/// Committed stage list plus the visible stage set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSet {
    stages: Vec<Stage>,
    visible: VisibleStages,
    bounds: StageBounds,
    new_stage_title: String,
}

impl StageSet {
    pub fn new(
        stages: Vec<Stage>,
        visible: VisibleStages,
        bounds: StageBounds,
        new_stage_title: impl Into<String>,
    ) -> Self {
        let mut set = Self {
            stages,
            visible,
            bounds,
            new_stage_title: new_stage_title.into(),
        };
        set.visible.prune(&set.stages);
        set
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn visible(&self) -> &VisibleStages {
        &self.visible
    }

    pub fn bounds(&self) -> StageBounds {
        self.bounds
    }

    pub fn get(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.id == id)
    }

    /// Opens an editable copy of the stage list
    pub fn edit(&self) -> StageDraft {
        StageDraft {
            stages: self.stages.clone(),
            bounds: self.bounds,
            new_stage_title: self.new_stage_title.clone(),
            dragged: None,
        }
    }

    /// Validates and commits a new stage list, pruning the visible set.
    ///
    /// Titles must be non-empty after trimming and pairwise distinct
    /// (trimmed, case-sensitive), ids non-empty and unique. On the first
    /// violation nothing changes.
    pub fn save(&mut self, stages: Vec<Stage>) -> Result<()> {
        validate_titles(&stages)?;
        validate_ids(&stages)?;
        if stages.len() > self.bounds.max {
            return Err(LeadflowError::TooManyStages(self.bounds.max));
        }
        if stages.len() < self.bounds.min {
            return Err(LeadflowError::TooFewStages(self.bounds.min));
        }

        self.stages = stages;
        self.visible.prune(&self.stages);
        Ok(())
    }

    /// Replaces the visible set; unknown ids are dropped
    pub fn set_visible(&mut self, visible: VisibleStages) {
        self.visible = visible;
        self.visible.prune(&self.stages);
    }

    pub fn toggle_visible(&mut self, id: StageId) {
        if self.get(&id).is_some() || self.visible.contains(&id) {
            self.visible.toggle(id);
        }
    }

    /// Visible stages in stage-list order
    pub fn visible_stages(&self) -> Vec<&Stage> {
        self.stages
            .iter()
            .filter(|s| self.visible.contains(&s.id))
            .collect()
    }

    /// Classifies each visible stage relative to `current`
    pub fn progress(&self, current: &StageId) -> Vec<(&Stage, StageProgress)> {
        let visible = self.visible_stages();
        let current_pos = visible.iter().position(|s| &s.id == current);

        visible
            .into_iter()
            .enumerate()
            .map(|(i, stage)| {
                let progress = match current_pos {
                    Some(pos) if i == pos => StageProgress::Active,
                    Some(pos) if i < pos => StageProgress::Completed,
                    _ => StageProgress::Upcoming,
                };
                (stage, progress)
            })
            .collect()
    }
}

fn validate_titles(stages: &[Stage]) -> Result<()> {
    if stages.iter().any(|s| s.title.trim().is_empty()) {
        return Err(LeadflowError::EmptyStageTitle);
    }

    let mut seen = HashSet::new();
    for stage in stages {
        let title = stage.title.trim();
        if !seen.insert(title) {
            return Err(LeadflowError::DuplicateStageTitle(title.to_string()));
        }
    }
    Ok(())
}

fn validate_ids(stages: &[Stage]) -> Result<()> {
    let mut seen = HashSet::new();
    for stage in stages {
        if stage.id.as_str().trim().is_empty() {
            return Err(LeadflowError::validation("stages", "Every stage needs an id."));
        }
        if !seen.insert(&stage.id) {
            return Err(LeadflowError::validation(
                "stages",
                format!("Duplicate stage id: {}", stage.id),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageProgress {
    Completed,
    Active,
    Upcoming,
}

/// Edit session over a copy of the stage list.
///
/// Capacity is enforced on add/remove; titles are only checked when the
/// draft is handed to [`StageSet::save`].
#[derive(Debug, Clone)]
pub struct StageDraft {
    stages: Vec<Stage>,
    bounds: StageBounds,
    new_stage_title: String,
    dragged: Option<usize>,
}

impl StageDraft {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Appends a stage with a generated id and the default title
    pub fn add_stage(&mut self) -> Result<&Stage> {
        if self.stages.len() >= self.bounds.max {
            return Err(LeadflowError::TooManyStages(self.bounds.max));
        }
        self.stages
            .push(Stage::new(StageId::generate(), self.new_stage_title.clone()));
        Ok(&self.stages[self.stages.len() - 1])
    }

    pub fn remove_stage(&mut self, index: usize) -> Result<Stage> {
        if self.stages.len() <= self.bounds.min {
            return Err(LeadflowError::TooFewStages(self.bounds.min));
        }
        if index >= self.stages.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.stages.remove(index))
    }

    pub fn rename_stage(&mut self, index: usize, title: impl Into<String>) -> Result<()> {
        let len = self.stages.len();
        let stage = self.stages.get_mut(index).ok_or(LeadflowError::IndexOutOfBounds {
            column: "stages".to_string(),
            index,
            len,
        })?;
        stage.title = title.into();
        Ok(())
    }

    pub fn reorder_stages(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.stages.len() {
            return Err(self.out_of_bounds(from));
        }
        let stage = self.stages.remove(from);
        let to = to.min(self.stages.len());
        self.stages.insert(to, stage);
        Ok(())
    }

    pub fn drag_start(&mut self, index: usize) {
        self.dragged = (index < self.stages.len()).then_some(index);
    }

    /// Moves the dragged stage onto the hovered slot
    pub fn drag_over(&mut self, index: usize) {
        let Some(from) = self.dragged else { return };
        if from == index || index >= self.stages.len() {
            return;
        }
        if self.reorder_stages(from, index).is_ok() {
            self.dragged = Some(index);
        }
    }

    pub fn drag_end(&mut self) {
        self.dragged = None;
    }

    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }

    fn out_of_bounds(&self, index: usize) -> LeadflowError {
        LeadflowError::IndexOutOfBounds {
            column: "stages".to_string(),
            index,
            len: self.stages.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_set(titles: &[(&str, &str)]) -> StageSet {
        let stages = titles.iter().map(|(id, t)| Stage::new(*id, *t)).collect();
        let visible = VisibleStages::new(titles.iter().map(|(id, _)| StageId::new(*id)).collect());
        StageSet::new(stages, visible, StageBounds::default(), "New Stage")
    }

    fn pipeline() -> StageSet {
        stage_set(&[
            ("new", "New Leads"),
            ("contacted", "Contacted"),
            ("quote-sent", "Quote sent"),
        ])
    }

    #[test]
    fn test_add_stage_generates_unique_ids() {
        let set = pipeline();
        let mut draft = set.edit();

        let first = draft.add_stage().unwrap().clone();
        let second = draft.add_stage().unwrap().clone();

        assert_eq!(draft.len(), 5);
        assert_eq!(first.title, "New Stage");
        assert!(first.id.as_str().starts_with("stage-"));
        assert_ne!(first.id, second.id);
        // committed list untouched until save
        assert_eq!(set.stages().len(), 3);
    }

    #[test]
    fn test_add_stage_rejected_at_maximum() {
        let mut draft = pipeline().edit();
        while draft.len() < 8 {
            draft.add_stage().unwrap();
        }

        let err = draft.add_stage().unwrap_err();
        assert!(matches!(err, LeadflowError::TooManyStages(8)));
        assert_eq!(draft.len(), 8);
    }

    #[test]
    fn test_remove_stage_rejected_at_minimum() {
        let mut draft = stage_set(&[("new", "New Leads"), ("won", "Won leads")]).edit();

        let err = draft.remove_stage(0).unwrap_err();
        assert!(matches!(err, LeadflowError::TooFewStages(2)));
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn test_remove_and_rename_stage() {
        let mut draft = pipeline().edit();

        let removed = draft.remove_stage(1).unwrap();
        assert_eq!(removed.id.as_str(), "contacted");

        draft.rename_stage(0, "Fresh").unwrap();
        assert_eq!(draft.stages()[0].title, "Fresh");
        assert!(draft.rename_stage(9, "Nope").is_err());
    }

    #[test]
    fn test_rename_not_validated_until_save() {
        let mut set = pipeline();
        let mut draft = set.edit();
        draft.rename_stage(0, "").unwrap();

        let err = set.save(draft.into_stages()).unwrap_err();
        assert!(matches!(err, LeadflowError::EmptyStageTitle));
        assert_eq!(set.stages()[0].title, "New Leads");
    }

    #[test]
    fn test_save_rejects_duplicate_titles() {
        let mut set = pipeline();
        let before = set.stages().to_vec();
        let mut draft = set.edit();
        draft.rename_stage(0, " Contacted ").unwrap();

        let err = set.save(draft.into_stages()).unwrap_err();
        assert!(matches!(err, LeadflowError::DuplicateStageTitle(ref t) if t == "Contacted"));
        assert_eq!(set.stages(), before.as_slice());
    }

    #[test]
    fn test_save_rejects_duplicate_or_empty_ids() {
        let mut set = pipeline();
        let before = set.stages().to_vec();

        let err = set
            .save(vec![
                Stage::new("new", "A"),
                Stage::new("new", "B"),
                Stage::new("won", "W"),
            ])
            .unwrap_err();
        assert!(matches!(err, LeadflowError::Validation { field: "stages", .. }));
        assert!(err.is_user_warning());

        let err = set
            .save(vec![Stage::new(" ", "A"), Stage::new("won", "W")])
            .unwrap_err();
        assert!(matches!(err, LeadflowError::Validation { field: "stages", .. }));
        assert_eq!(set.stages(), before.as_slice());
    }

    #[test]
    fn test_save_titles_are_case_sensitive() {
        let mut set = pipeline();
        let mut draft = set.edit();
        draft.rename_stage(0, "contacted").unwrap();

        assert!(set.save(draft.into_stages()).is_ok());
    }

    #[test]
    fn test_save_prunes_visible_set() {
        let mut set = pipeline();
        let mut draft = set.edit();
        draft.remove_stage(1).unwrap();

        set.save(draft.into_stages()).unwrap();

        let visible: Vec<&str> = set.visible().ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(visible, vec!["new", "quote-sent"]);
    }

    #[test]
    fn test_reorder_stages() {
        let mut draft = pipeline().edit();
        draft.reorder_stages(0, 2).unwrap();

        let ids: Vec<&str> = draft.stages().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["contacted", "quote-sent", "new"]);
        assert!(draft.reorder_stages(5, 0).is_err());
    }

    #[test]
    fn test_drag_reorder_follows_hover() {
        let mut draft = pipeline().edit();

        draft.drag_start(0);
        draft.drag_over(1);
        draft.drag_over(2);
        draft.drag_end();

        let ids: Vec<&str> = draft.stages().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["contacted", "quote-sent", "new"]);
        assert_eq!(draft.dragged(), None);
    }

    #[test]
    fn test_visible_toggle() {
        let mut set = pipeline();

        set.toggle_visible(StageId::new("contacted"));
        assert_eq!(set.visible().len(), 2);

        set.toggle_visible(StageId::new("contacted"));
        assert_eq!(set.visible().ids().last().unwrap().as_str(), "contacted");

        set.toggle_visible(StageId::new("missing"));
        assert_eq!(set.visible().len(), 3);
    }

    #[test]
    fn test_stage_progress() {
        let set = pipeline();
        let progress: Vec<StageProgress> = set
            .progress(&StageId::new("contacted"))
            .into_iter()
            .map(|(_, p)| p)
            .collect();

        assert_eq!(
            progress,
            vec![
                StageProgress::Completed,
                StageProgress::Active,
                StageProgress::Upcoming
            ]
        );
    }

    #[test]
    fn test_stage_progress_for_hidden_stage() {
        let mut set = pipeline();
        set.set_visible(VisibleStages::new(vec![StageId::new("new")]));

        let progress = set.progress(&StageId::new("quote-sent"));
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].1, StageProgress::Upcoming);
    }

    #[test]
    fn test_validated_stage() {
        let stage = Stage::validated(" won ", " Won leads ").unwrap();
        assert_eq!(stage.id.as_str(), "won");
        assert_eq!(stage.title, "Won leads");

        assert!(Stage::validated("", "Won").is_err());
        assert!(Stage::validated("won", "  ").is_err());
    }
}
