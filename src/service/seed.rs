use crate::domain::{ActivityStatus, Column, Lead, LeadId};

fn lead(id: u32, name: &str, service: &str, price: &str) -> Lead {
    Lead::new(LeadId::new(id), name, service).with_price(price)
}

/// Demo pipeline the mock service starts from
pub fn seed_columns() -> Vec<Column> {
    vec![
        Column::new("new", "New Leads").with_leads(vec![
            lead(1, "Tony Stark", "Garden clean up and leaf removal", "n/a")
                .with_last_activity("Contacted through website today")
                .with_tags(vec!["Existing client".to_string()]),
            lead(2, "Peter Parker", "Garden clean up and leaf removal", "n/a")
                .with_last_activity("Lead manually created today")
                .with_activity_status(ActivityStatus::Future),
            lead(3, "Bruce Banner", "Pool Deck Redesign", "$1,400.20")
                .with_last_activity("Requested through AI Receptionist today"),
        ]),
        Column::new("contacted", "Contacted").with_leads(vec![
            lead(4, "Pepper Potts", "Stone pathway", "n/a")
                .with_days(4)
                .with_assignee("Alex")
                .with_last_activity("Call logged 4 days ago")
                .with_activity_status(ActivityStatus::Today),
            lead(5, "Diana Prince", "Landscape design", "n/a")
                .with_days(2)
                .with_assignee("Alex")
                .with_last_activity("Email sent 2 days ago")
                .with_activity_status(ActivityStatus::Overdue),
        ]),
        Column::new("quote-sent", "Quote sent").with_leads(vec![
            lead(6, "Stephen Strange", "Fence installation", "$1029.30")
                .with_days(6)
                .with_assignee("Natasha")
                .with_last_activity("Quote sent 6 days ago")
                .with_activity_status(ActivityStatus::Future)
                .highlighted(),
            lead(7, "Clark Kent", "Landscape design", "$4639.20")
                .with_days(1)
                .with_assignee("Alex")
                .with_last_activity("Quote sent 1 day ago"),
        ]),
        Column::new("quote-signed", "Quote signed").with_leads(vec![
            lead(8, "Natasha Romanoff", "Leaf removal", "$3,100.00")
                .with_assignee("Natasha")
                .with_last_activity("Quote signed 1 day ago")
                .with_activity_status(ActivityStatus::Today),
            lead(9, "Wanda Maximoff", "Leaf removal", "$550.50")
                .with_assignee("Alex")
                .with_last_activity("Quote signed today"),
            lead(10, "Matt Murdock", "Balcony design", "$2,489.71")
                .with_assignee("Natasha")
                .with_last_activity("Quote signed today")
                .with_activity_status(ActivityStatus::Overdue),
        ]),
        Column::new("job-scheduled", "Job scheduled").with_leads(vec![
            lead(11, "Shuri Udaku", "Lights installation", "$2,121.11")
                .with_days(4)
                .with_assignee("Alex")
                .with_last_activity("Job scheduled yesterday")
                .with_activity_status(ActivityStatus::Future),
            lead(12, "Steve Rogers", "Landscape design", "$3,820.10")
                .with_assignee("Natasha")
                .with_last_activity("On-site assessment scheduled today")
                .with_activity_status(ActivityStatus::Today),
        ]),
        Column::new("won", "Won leads").with_leads(vec![lead(
            13,
            "T'Challa",
            "Complete garden redesign",
            "$8,500.00",
        )
        .with_assignee("Natasha")
        .with_last_activity("Project completed and paid")]),
        Column::new("lost", "Leads lost").with_leads(vec![lead(
            14,
            "Loki Laufeyson",
            "Fence installation",
            "$2,300.00",
        )
        .with_assignee("Alex")
        .with_last_activity("Customer went with competitor")]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::domain::Board;

    #[test]
    fn test_seed_is_a_valid_board() {
        let board = Board::new(seed_columns()).unwrap();

        assert_eq!(board.columns().len(), 7);
        assert_eq!(board.total_leads(), 14);
        assert_eq!(board.next_lead_id(), LeadId::new(15));
    }

    #[test]
    fn test_seed_matches_default_stages() {
        let config = PipelineConfig::default();
        let columns = seed_columns();

        for (stage, column) in config.stages.iter().zip(&columns) {
            assert_eq!(stage.id, column.id);
            assert_eq!(stage.title, column.title);
        }
    }
}
