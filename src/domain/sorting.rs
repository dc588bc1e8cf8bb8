use crate::domain::board::LeadRow;
use std::cmp::Ordering;
use std::str::FromStr;

/// Columns of the list view that can be sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadSortField {
    Name,
    Service,
    Price,
    Stage,
    AssignedTo,
    Days,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Flips the direction, as a second click on the same header does
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

impl FromStr for LeadSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(LeadSortField::Name),
            "service" => Ok(LeadSortField::Service),
            "price" => Ok(LeadSortField::Price),
            "stage" => Ok(LeadSortField::Stage),
            "assignee" | "assigned-to" => Ok(LeadSortField::AssignedTo),
            "days" => Ok(LeadSortField::Days),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: name, service, price, stage, assignee, days",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts list-view rows in place.
///
/// Text fields compare case-insensitively, stages compare by board
/// position, prices by their numeric value (`n/a` counts as 0).
///
/// # Examples
/// ```
/// use leadflow_core::domain::board::{Board, Column};
/// use leadflow_core::domain::lead::{Lead, LeadId};
/// use leadflow_core::domain::sorting::{sort_rows, LeadSortField, SortOrder};
///
/// let board = Board::new(vec![Column::new("new", "New Leads").with_leads(vec![
///     Lead::new(LeadId::new(1), "Zed", "Leaf removal"),
///     Lead::new(LeadId::new(2), "Amy", "Leaf removal"),
/// ])])
/// .unwrap();
///
/// let mut rows = board.rows();
/// sort_rows(&mut rows, LeadSortField::Name, SortOrder::Ascending);
/// assert_eq!(rows[0].lead.name, "Amy");
/// ```
pub fn sort_rows(rows: &mut [LeadRow<'_>], field: LeadSortField, order: SortOrder) {
    rows.sort_by(|a, b| {
        let cmp = match field {
            LeadSortField::Name => compare_text(&a.lead.name, &b.lead.name),
            LeadSortField::Service => compare_text(&a.lead.service, &b.lead.service),
            LeadSortField::Price => compare_price(a.lead.price_value(), b.lead.price_value()),
            LeadSortField::Stage => a.stage_index.cmp(&b.stage_index),
            LeadSortField::AssignedTo => {
                compare_assignee(a.lead.assigned_to.as_deref(), b.lead.assigned_to.as_deref())
            }
            LeadSortField::Days => a.lead.days.cmp(&b.lead.days),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_price(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Unassigned leads sort after assigned ones
fn compare_assignee(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_text(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
