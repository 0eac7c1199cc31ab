use crate::charts;
use crate::client::{NeoQuery, NeoSource};
use crate::config::Config;
use crate::format;
use crate::logging::{add_records, log_batch, ProfileScope};
use crate::model::NeoRecord;
use crate::render::{NoticeLevel, Renderer, StatCard, Table, Widget};
use crate::stats::{hazard_split, risk_score};

use super::{fetch_section, hazard_badge, PageOutcome};

const PAGE: &str = "dashboard";
const RECENT_NAME_CHARS: usize = 25;

#[derive(Debug, Clone, Copy)]
pub struct DashboardSettings {
    pub batch: u32,
    pub recent: u32,
    pub top_n: usize,
}

impl From<&Config> for DashboardSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            batch: cfg.dashboard_batch,
            recent: cfg.recent_batch,
            top_n: cfg.top_n,
        }
    }
}

pub struct DashboardPage<'a> {
    neos: &'a (dyn NeoSource + Send + Sync),
    renderer: &'a dyn Renderer,
    settings: DashboardSettings,
}

impl<'a> DashboardPage<'a> {
    pub fn new(
        neos: &'a (dyn NeoSource + Send + Sync),
        renderer: &'a dyn Renderer,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            neos,
            renderer,
            settings,
        }
    }

    /// Stats, charts and the recent table load concurrently; each section
    /// handles its own failure.
    pub async fn load(&self) -> PageOutcome {
        let _scope = ProfileScope::new("dashboard.load");
        let (stats, charts, recent) =
            tokio::join!(self.load_stats(), self.load_charts(), self.load_recent());
        stats.merge(charts).merge(recent)
    }

    pub async fn refresh(&self) -> PageOutcome {
        self.renderer.notify(NoticeLevel::Info, "Refreshing data...");
        let outcome = self.load().await;
        self.renderer.notify(NoticeLevel::Success, "Data refreshed");
        outcome
    }

    async fn fetch(&self, section: &'static str, size: u32) -> Option<Vec<NeoRecord>> {
        let records = fetch_section(
            self.renderer,
            PAGE,
            section,
            "Failed to load data",
            self.neos.list(NeoQuery::first(size)),
        )
        .await?;
        add_records(records.len());
        log_batch(
            PAGE,
            section,
            records.len(),
            records.iter().filter(|r| r.hazardous).count(),
        );
        Some(records)
    }

    pub async fn load_stats(&self) -> PageOutcome {
        let Some(records) = self.fetch("stats", self.settings.batch).await else {
            return PageOutcome::failed("stats");
        };
        let split = hazard_split(&records);
        self.renderer.render(Widget::StatCards {
            section: "stats".to_string(),
            cards: vec![
                StatCard::new("totalNeos", "Total NEOs", format::number(Some(split.total as f64))),
                StatCard::new("dangerousNeos", "Dangerous", format::number(Some(split.dangerous as f64))),
                StatCard::new("safeNeos", "Safe", format::number(Some(split.safe as f64))),
                StatCard::new("riskScore", "Risk score", format::percent(risk_score(split.dangerous, split.total))),
            ],
        });
        PageOutcome::ok()
    }

    pub async fn load_charts(&self) -> PageOutcome {
        let Some(records) = self.fetch("charts", self.settings.batch).await else {
            return PageOutcome::failed("charts");
        };
        let n = self.settings.top_n;
        for ds in [
            charts::hazard_doughnut(&hazard_split(&records)),
            charts::top_velocity(&records, n),
            charts::top_diameter(&records, n),
            charts::distance_trend(&records, n),
        ] {
            self.renderer.render(Widget::Chart(ds));
        }
        PageOutcome::ok()
    }

    pub async fn load_recent(&self) -> PageOutcome {
        let Some(records) = self.fetch("neosTable", self.settings.recent).await else {
            return PageOutcome::failed("neosTable");
        };
        self.renderer.render(Widget::Table(recent_table(&records)));
        PageOutcome::ok()
    }
}

pub fn recent_table(records: &[NeoRecord]) -> Table {
    Table {
        id: "neosTable".to_string(),
        headers: [
            "Name",
            "Diameter (m)",
            "Velocity (km/h)",
            "Distance (km)",
            "Hazard",
            "Approach",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect(),
        rows: records
            .iter()
            .map(|r| {
                vec![
                    format::truncate(&r.name, RECENT_NAME_CHARS),
                    format::number(Some(r.diameter())),
                    format::number(Some(r.velocity_kmh())),
                    format::number(Some(r.mock_distance_km())),
                    hazard_badge(r.hazardous),
                    format::date(r.first_approach_date.as_deref()),
                ]
            })
            .collect(),
        empty_message: "No NEOs found".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_table_row() {
        let records = vec![NeoRecord {
            name: "433 Eros".to_string(),
            max_diameter_m: Some(1.5),
            velocity_km_s: Some(2.0),
            hazardous: true,
            first_approach_date: Some("2025-01-31".to_string()),
            ..Default::default()
        }];
        let t = recent_table(&records);
        assert_eq!(
            t.rows[0],
            vec!["433 Eros", "1.5", "7,200", "150,000", "DANGEROUS", "31/01/2025"]
        );
    }

    #[test]
    fn test_recent_table_empty() {
        let t = recent_table(&[]);
        assert!(t.rows.is_empty());
        assert_eq!(t.headers.len(), 6);
    }
}
