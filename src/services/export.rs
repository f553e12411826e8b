//! Dashboard CSV export
//!
//! Serializes a stats payload into the two-section CSV consumed by the
//! operators' existing spreadsheet tooling. The byte layout is fixed:
//! `Metric,Value` rows, a blank line, a `Top Tours` header, then
//! `Name,Bookings,Revenue` rows. Built by plain string assembly so no
//! CSV library can re-quote or re-order fields.

use crate::models::{DashboardReport, RankedTour, StatLine};

/// Render the two-section stats CSV
pub fn stats_csv(stats: &[StatLine], top_tours: &[RankedTour]) -> String {
    let mut out = String::from("Metric,Value\n");
    for stat in stats {
        out.push_str(&stat.title);
        out.push(',');
        out.push_str(&stat.value);
        out.push('\n');
    }

    out.push('\n');
    out.push_str("Top Tours\n");
    out.push_str("Name,Bookings,Revenue\n");
    for tour in top_tours {
        out.push_str(&format!("{},{},{}\n", tour.name, tour.bookings, tour.revenue));
    }

    out
}

/// Flatten a dashboard report into the `Metric,Value` rows of the export
pub fn report_stat_lines(report: &DashboardReport) -> Vec<StatLine> {
    vec![
        StatLine::new("Total Revenue", format!("${}", report.revenue.current)),
        StatLine::new("Revenue Change", report.revenue.delta_label.clone()),
        StatLine::new("Total Bookings", format!("{}", report.bookings.current as i64)),
        StatLine::new("Bookings Change", report.bookings.delta_label.clone()),
        StatLine::new(
            "New Customers",
            format!("{}", report.new_customers.current as i64),
        ),
        StatLine::new("Total Customers", format!("{}", report.totals.customers)),
        StatLine::new("Total Tours", format!("{}", report.totals.tours)),
        StatLine::new("Total Inquiries", format!("{}", report.totals.inquiries)),
        StatLine::new("Subscribers", format!("{}", report.totals.subscribers)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportWindow, SiteTotals, StatDelta};

    #[test]
    fn test_exact_export_layout() {
        let stats = vec![StatLine::new("Total Revenue", "$100")];
        let top_tours = vec![RankedTour {
            tour_id: 1,
            name: "Gorilla Trek".to_string(),
            bookings: 3,
            revenue: 900.0,
            price: 300.0,
            rating: None,
        }];

        assert_eq!(
            stats_csv(&stats, &top_tours),
            "Metric,Value\nTotal Revenue,$100\n\nTop Tours\nName,Bookings,Revenue\nGorilla Trek,3,900\n"
        );
    }

    #[test]
    fn test_empty_sections_keep_headers() {
        assert_eq!(
            stats_csv(&[], &[]),
            "Metric,Value\n\nTop Tours\nName,Bookings,Revenue\n"
        );
    }

    #[test]
    fn test_report_flattening() {
        let report = DashboardReport {
            window: ReportWindow::trailing_days(30),
            revenue: StatDelta::new(900.0, 600.0),
            bookings: StatDelta::new(3.0, 2.0),
            new_customers: StatDelta::new(1.0, 0.0),
            top_tours: Vec::new(),
            recent_activity: Vec::new(),
            monthly: Vec::new(),
            totals: SiteTotals {
                customers: 12,
                tours: 4,
                inquiries: 7,
                subscribers: 31,
            },
        };

        let lines = report_stat_lines(&report);
        assert_eq!(lines[0], StatLine::new("Total Revenue", "$900"));
        assert_eq!(lines[1], StatLine::new("Revenue Change", "+50.0%"));
        assert_eq!(lines[2], StatLine::new("Total Bookings", "3"));

        let csv = stats_csv(&lines, &[]);
        assert!(csv.starts_with("Metric,Value\nTotal Revenue,$900\n"));
        assert!(csv.ends_with("Top Tours\nName,Bookings,Revenue\n"));
    }
}
