use crate::error::{LeadflowError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique identifier for a lead (rendered as `lead-1`, `lead-42`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(u32);

impl LeadId {
    const PREFIX: &'static str = "lead-";

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for LeadId {
    type Err = LeadflowError;

    fn from_str(s: &str) -> Result<Self> {
        s.strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(Self)
            .ok_or_else(|| LeadflowError::InvalidLeadId(s.to_string()))
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

/// Where a lead's next scheduled activity falls relative to today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    None,
    Today,
    Overdue,
    Future,
}

impl ActivityStatus {
    /// Classifies a due date against the current calendar date
    pub fn from_due_date(due: NaiveDate, today: NaiveDate) -> Self {
        match due.cmp(&today) {
            std::cmp::Ordering::Equal => Self::Today,
            std::cmp::Ordering::Less => Self::Overdue,
            std::cmp::Ordering::Greater => Self::Future,
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Today => write!(f, "today"),
            Self::Overdue => write!(f, "overdue"),
            Self::Future => write!(f, "future"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    Call,
    Email,
    FollowUp,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "Call"),
            Self::Email => write!(f, "Email"),
            Self::FollowUp => write!(f, "Follow-up"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActivity {
    pub kind: ActivityKind,
    pub due: NaiveDate,
}

/// A prospective customer moving through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub service: String,
    /// Free text, e.g. `n/a` or `$1,400.20`
    pub price: String,
    pub assigned_to: Option<String>,
    pub last_activity: String,
    /// Days spent in the current stage
    pub days: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub activity_status: ActivityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_activity: Option<ScheduledActivity>,
}

impl Lead {
    /// Creates a lead with default bookkeeping fields
    pub fn new(id: LeadId, name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            service: service.into(),
            price: "n/a".to_string(),
            assigned_to: None,
            last_activity: "No activity recorded".to_string(),
            days: 0,
            tags: Vec::new(),
            highlight: false,
            activity_status: ActivityStatus::None,
            next_activity: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assigned_to = Some(assignee.into());
        self
    }

    pub fn with_last_activity(mut self, text: impl Into<String>) -> Self {
        self.last_activity = text.into();
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_activity_status(mut self, status: ActivityStatus) -> Self {
        self.activity_status = status;
        self
    }

    pub fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }

    /// Numeric value of the free-text price; `n/a` and unparsable text are 0
    pub fn price_value(&self) -> f64 {
        let digits: String = self
            .price
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        digits.parse().unwrap_or(0.0)
    }

    /// Resets the stage bookkeeping after the lead lands in a new stage
    pub fn mark_moved(&mut self, stage_title: &str, on: NaiveDate) {
        self.days = 0;
        self.last_activity = format!("Moved to {} on {}", stage_title, on.format("%-m/%-d/%Y"));
    }

    /// Records the next activity and recomputes the activity status
    pub fn schedule_activity(&mut self, kind: ActivityKind, due: NaiveDate, today: NaiveDate) {
        self.activity_status = ActivityStatus::from_due_date(due, today);
        self.next_activity = Some(ScheduledActivity { kind, due });
    }

    /// Applies a partial update, leaving unset fields untouched
    pub fn apply(&mut self, update: LeadUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(service) = update.service {
            self.service = service;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(assigned_to) = update.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(last_activity) = update.last_activity {
            self.last_activity = last_activity;
        }
        if let Some(days) = update.days {
            self.days = days;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(highlight) = update.highlight {
            self.highlight = highlight;
        }
        if let Some(status) = update.activity_status {
            self.activity_status = status;
        }
    }
}

/// Partial field set for `updateLead`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub service: Option<String>,
    pub price: Option<String>,
    /// `Some(None)` clears the assignee
    pub assigned_to: Option<Option<String>>,
    pub last_activity: Option<String>,
    pub days: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub highlight: Option<bool>,
    pub activity_status: Option<ActivityStatus>,
}

impl LeadUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Unvalidated lead input, e.g. from the new-lead form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadDraft {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub service: Option<String>,
    pub price: Option<String>,
    pub assigned_to: Option<String>,
    pub last_activity: Option<String>,
    pub days: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub highlight: Option<bool>,
    pub activity_status: Option<ActivityStatus>,
}

impl LeadDraft {
    pub fn new(name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            service: Some(service.into()),
            ..Self::default()
        }
    }

    /// Validates required fields and fills in defaults
    pub fn validate(self) -> Result<Lead> {
        let id = match self.id {
            Some(id) if id > 0 => LeadId::new(id),
            _ => {
                return Err(LeadflowError::validation(
                    "id",
                    "Lead ID is required and must be a number",
                ))
            }
        };

        let name = required_trimmed(self.name, "name", "Lead name is required")?;
        let service = required_trimmed(self.service, "service", "Service is required")?;

        let mut lead = Lead::new(id, name, service);
        if let Some(price) = self.price.filter(|p| !p.trim().is_empty()) {
            lead.price = price;
        }
        lead.assigned_to = self.assigned_to;
        if let Some(text) = self.last_activity {
            lead.last_activity = text;
        }
        lead.days = self.days.unwrap_or(0);
        lead.tags = self.tags.unwrap_or_default();
        lead.highlight = self.highlight.unwrap_or(false);
        lead.activity_status = self.activity_status.unwrap_or_default();
        Ok(lead)
    }
}

fn required_trimmed(value: Option<String>, field: &'static str, message: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(LeadflowError::validation(field, message)),
    }
}
