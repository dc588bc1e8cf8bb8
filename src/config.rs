use crate::domain::stage::{Stage, StageBounds, StageId, StageSet, VisibleStages};
use crate::error::{LeadflowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub min_stages: usize,
    pub max_stages: usize,
    /// Title given to stages added from the stage manager
    pub new_stage_title: String,
    pub stages: Vec<Stage>,
    pub visible_stage_ids: Vec<StageId>,
    pub won_stage_id: StageId,
    pub lost_stage_id: StageId,
    /// Artificial delay of the mock lead service
    pub service_latency_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let stages = vec![
            Stage::new("new", "New Leads"),
            Stage::new("contacted", "Contacted"),
            Stage::new("quote-sent", "Quote sent"),
            Stage::new("quote-signed", "Quote signed"),
            Stage::new("job-scheduled", "Job scheduled"),
            Stage::new("won", "Won leads"),
            Stage::new("lost", "Leads lost"),
        ];
        let visible_stage_ids = stages.iter().take(5).map(|s| s.id.clone()).collect();

        Self {
            min_stages: 2,
            max_stages: 8,
            new_stage_title: "New Stage".to_string(),
            stages,
            visible_stage_ids,
            won_stage_id: StageId::new("won"),
            lost_stage_id: StageId::new("lost"),
            service_latency_ms: 100,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_stages == 0 {
            return Err(LeadflowError::ConfigError(
                "min_stages must be at least 1".to_string(),
            ));
        }
        if self.min_stages > self.max_stages {
            return Err(LeadflowError::ConfigError(format!(
                "min_stages ({}) exceeds max_stages ({})",
                self.min_stages, self.max_stages
            )));
        }
        if self.stages.len() < self.min_stages || self.stages.len() > self.max_stages {
            return Err(LeadflowError::ConfigError(format!(
                "{} stages configured, expected between {} and {}",
                self.stages.len(),
                self.min_stages,
                self.max_stages
            )));
        }

        let mut ids = HashSet::new();
        let mut titles = HashSet::new();
        for stage in &self.stages {
            if stage.id.as_str().trim().is_empty() || stage.title.trim().is_empty() {
                return Err(LeadflowError::ConfigError(
                    "stages need an id and a title".to_string(),
                ));
            }
            if !ids.insert(&stage.id) {
                return Err(LeadflowError::ConfigError(format!(
                    "duplicate stage id: {}",
                    stage.id
                )));
            }
            if !titles.insert(stage.title.trim()) {
                return Err(LeadflowError::ConfigError(format!(
                    "duplicate stage title: {}",
                    stage.title.trim()
                )));
            }
        }

        if let Some(unknown) = self.visible_stage_ids.iter().find(|id| !ids.contains(id)) {
            return Err(LeadflowError::ConfigError(format!(
                "visible stage {} is not a configured stage",
                unknown
            )));
        }
        Ok(())
    }

    pub fn bounds(&self) -> StageBounds {
        StageBounds {
            min: self.min_stages,
            max: self.max_stages,
        }
    }

    pub fn service_latency(&self) -> Duration {
        Duration::from_millis(self.service_latency_ms)
    }

    pub fn stage_set(&self) -> StageSet {
        StageSet::new(
            self.stages.clone(),
            VisibleStages::new(self.visible_stage_ids.clone()),
            self.bounds(),
            self.new_stage_title.clone(),
        )
    }
}
