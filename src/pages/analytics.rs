use crate::binning::{diameter_histogram, monthly_approaches};
use crate::charts;
use crate::client::{NeoQuery, NeoSource};
use crate::format;
use crate::logging::{add_records, log_batch, ProfileScope};
use crate::model::NeoRecord;
use crate::render::{Renderer, StatCard, Table, Widget};
use crate::stats::{compare_by_hazard, headline_stats, Stats, StatsComparison};

use super::{fetch_section, PageOutcome};

const PAGE: &str = "analytics";

pub struct AnalyticsPage<'a> {
    neos: &'a (dyn NeoSource + Send + Sync),
    renderer: &'a dyn Renderer,
    batch: u32,
}

impl<'a> AnalyticsPage<'a> {
    pub fn new(neos: &'a (dyn NeoSource + Send + Sync), renderer: &'a dyn Renderer, batch: u32) -> Self {
        Self {
            neos,
            renderer,
            batch,
        }
    }

    /// One larger batch feeds every widget on the page.
    pub async fn load(&self) -> PageOutcome {
        let _scope = ProfileScope::with_context("analytics.load", &[("batch", self.batch.into())]);
        let Some(records) = fetch_section(
            self.renderer,
            PAGE,
            "analytics",
            "Failed to load analytics",
            self.neos.list(NeoQuery::first(self.batch)),
        )
        .await
        else {
            return PageOutcome::failed("analytics");
        };
        add_records(records.len());
        log_batch(
            PAGE,
            "analytics",
            records.len(),
            records.iter().filter(|r| r.hazardous).count(),
        );

        self.render_headline(&records);
        for ds in analytics_charts(&records) {
            self.renderer.render(Widget::Chart(ds));
        }
        self.renderer
            .render(Widget::Table(comparison_table(&compare_by_hazard(&records))));
        PageOutcome::ok()
    }

    fn render_headline(&self, records: &[NeoRecord]) {
        let h = headline_stats(records);
        self.renderer.render(Widget::StatCards {
            section: "advancedStats".to_string(),
            cards: vec![
                StatCard::new("avgDiameter", "Avg diameter (m)", format::number(h.avg_diameter)),
                StatCard::new("avgVelocity", "Avg velocity (km/h)", format::number(h.avg_velocity)),
                StatCard::new("closestDistance", "Closest distance (km, est.)", format::number(h.closest_distance)),
                StatCard::new("riskScore", "Risk score", format::percent(h.risk_score)),
            ],
        });
    }
}

pub fn analytics_charts(records: &[NeoRecord]) -> Vec<charts::Dataset> {
    vec![
        charts::diameter_histogram_chart(&diameter_histogram(records)),
        charts::velocity_scatter(records),
        charts::distance_scatter(records),
        charts::monthly_approaches_chart(&monthly_approaches(records)),
        charts::hazard_correlation(),
    ]
}

/// Rows are metrics; columns are all / dangerous / safe.
pub fn comparison_table(cmp: &StatsComparison) -> Table {
    type Metric = fn(&Stats) -> String;
    let metrics: [(&str, Metric); 7] = [
        ("Count", |s| s.count.to_string()),
        ("Avg diameter (m)", |s| format::number(s.avg_diameter)),
        ("Max diameter (m)", |s| format::number(s.max_diameter)),
        ("Avg velocity (km/h)", |s| format::number(s.avg_velocity)),
        ("Max velocity (km/h)", |s| format::number(s.max_velocity)),
        ("Min distance (km)", |s| format::number(s.min_distance)),
        ("Avg distance (km)", |s| format::number(s.avg_distance)),
    ];
    Table {
        id: "statsTable".to_string(),
        headers: vec![
            "Metric".to_string(),
            "All".to_string(),
            "Dangerous".to_string(),
            "Safe".to_string(),
        ],
        rows: metrics
            .iter()
            .map(|(label, f)| {
                vec![
                    label.to_string(),
                    f(&cmp.all),
                    f(&cmp.dangerous),
                    f(&cmp.safe),
                ]
            })
            .collect(),
        empty_message: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::NO_DATA;

    #[test]
    fn test_empty_comparison_is_sentinel() {
        let t = comparison_table(&compare_by_hazard(&[]));
        assert_eq!(t.rows.len(), 7);
        assert_eq!(t.rows[0], vec!["Count", "0", "0", "0"]);
        for row in &t.rows[1..] {
            assert!(row[1..].iter().all(|c| c == NO_DATA), "row {:?}", row);
        }
    }

    #[test]
    fn test_chart_ids() {
        let ids: Vec<&str> = analytics_charts(&[]).iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec![
                "diameterHistogram",
                "velocityScatter",
                "distanceScatter",
                "monthlyApproaches",
                "correlationMatrix"
            ]
        );
    }
}
