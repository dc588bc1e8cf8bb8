use crate::domain::board::Board;
use crate::domain::stage::StageId;
use serde::{Deserialize, Serialize};

/// Headline numbers shown above the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_leads: usize,
    /// Leads that are neither won nor lost
    pub open_leads: usize,
    /// Won leads as a fraction of all leads, 0.0 on an empty board
    pub conversion_rate: f64,
    pub won_revenue: f64,
}

impl PipelineStats {
    pub fn compute(board: &Board, won: &StageId, lost: &StageId) -> Self {
        let count_in = |id: &StageId| board.column(id).map(|c| c.count()).unwrap_or(0);

        let total_leads = board.total_leads();
        let won_count = count_in(won);
        let closed = won_count + count_in(lost);

        let conversion_rate = if total_leads == 0 {
            0.0
        } else {
            won_count as f64 / total_leads as f64
        };

        let won_revenue = board
            .column(won)
            .map(|c| c.leads.iter().map(|l| l.price_value()).sum::<f64>())
            .unwrap_or(0.0);

        Self {
            total_leads,
            open_leads: total_leads.saturating_sub(closed),
            conversion_rate,
            won_revenue,
        }
    }

    pub fn conversion_percent(&self) -> u32 {
        (self.conversion_rate * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::Column;
    use crate::domain::lead::{Lead, LeadId};

    fn lead(id: u32, price: &str) -> Lead {
        Lead::new(LeadId::new(id), format!("Lead {}", id), "Landscape design").with_price(price)
    }

    #[test]
    fn test_compute_stats() {
        let board = Board::new(vec![
            Column::new("new", "New Leads").with_leads(vec![lead(1, "n/a"), lead(2, "$100")]),
            Column::new("won", "Won leads")
                .with_leads(vec![lead(3, "$8,500.00"), lead(4, "$1,740.23")]),
            Column::new("lost", "Leads lost").with_leads(vec![lead(5, "$2,300.00")]),
        ])
        .unwrap();

        let stats = PipelineStats::compute(&board, &StageId::new("won"), &StageId::new("lost"));

        assert_eq!(stats.total_leads, 5);
        assert_eq!(stats.open_leads, 2);
        assert_eq!(stats.conversion_percent(), 40);
        assert!((stats.won_revenue - 10240.23).abs() < 1e-6);
    }

    #[test]
    fn test_stats_on_empty_board() {
        let board = Board::default();
        let stats = PipelineStats::compute(&board, &StageId::new("won"), &StageId::new("lost"));

        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.open_leads, 0);
        assert_eq!(stats.conversion_rate, 0.0);
        assert_eq!(stats.won_revenue, 0.0);
    }
}
