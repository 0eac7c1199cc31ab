use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use neodash::client::file::FileNeoSource;
use neodash::client::{MlSource, NeoQuery, NeoSource};
use neodash::model::{NeoRecord, PredictionFeatures, PredictionResult, TrainingResult};
use neodash::pages::dashboard::DashboardSettings;
use neodash::pages::{AnalyticsPage, DashboardPage, MlPage, NeoListPage};
use neodash::render::{MemoryRenderer, NoticeLevel, Widget};
use neodash::view::ViewState;
use serde_json::json;

fn neo(id: i64, name: &str, diameter: f64, velocity: f64, hazardous: bool) -> NeoRecord {
    NeoRecord {
        id,
        name: name.to_string(),
        min_diameter_m: Some(diameter / 2.0),
        max_diameter_m: Some(diameter),
        velocity_km_s: Some(velocity),
        hazardous,
        first_approach_date: Some(format!("2024-{:02}-15", (id % 12) + 1)),
        ..Default::default()
    }
}

fn sample(n: i64) -> Vec<NeoRecord> {
    (0..n)
        .map(|i| neo(i, &format!("NEO {}", i), 20.0 + i as f64 * 10.0, 5.0 + i as f64, i % 10 < 3))
        .collect()
}

/// Serves `records`, failing every list request of the given size.
struct FlakySource {
    records: Vec<NeoRecord>,
    fail_size: Option<u32>,
    calls: AtomicUsize,
}

impl FlakySource {
    fn new(records: Vec<NeoRecord>, fail_size: Option<u32>) -> Self {
        Self {
            records,
            fail_size,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NeoSource for FlakySource {
    async fn list(&self, query: NeoQuery) -> Result<Vec<NeoRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_size == Some(query.size) {
            bail!("HTTP error! status: 503");
        }
        Ok(self.records.iter().take(query.size as usize).cloned().collect())
    }

    async fn get(&self, _id: i64) -> Result<NeoRecord> {
        bail!("HTTP error! status: 404")
    }
}

#[derive(Default)]
struct FakeMl {
    calls: AtomicUsize,
    prediction: Option<serde_json::Value>,
    trained: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

#[async_trait]
impl MlSource for FakeMl {
    async fn train(&self, start: NaiveDate, end: NaiveDate) -> Result<TrainingResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut t) = self.trained.lock() {
            t.push((start, end));
        }
        Ok(TrainingResult {
            accuracy: 0.9,
            precision: 0.8,
            recall: 0.7,
            f1_score: 0.75,
            train_size: 80,
            test_size: 20,
            model_path: None,
        })
    }

    async fn train_all(&self) -> Result<TrainingResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        bail!("HTTP error! status: 500")
    }

    async fn reload(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn predict(&self, _features: PredictionFeatures) -> Result<PredictionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.prediction {
            Some(v) => Ok(PredictionResult::from_value(v)),
            None => bail!("HTTP error! status: 500"),
        }
    }
}

fn settings() -> DashboardSettings {
    DashboardSettings {
        batch: 100,
        recent: 10,
        top_n: 10,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn dashboard_renders_every_section() {
    let source = FlakySource::new(sample(10), None);
    let renderer = MemoryRenderer::new();
    let outcome = DashboardPage::new(&source, &renderer, settings()).load().await;

    assert!(outcome.is_ok());
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(renderer.card_value("totalNeos").as_deref(), Some("10"));
    assert_eq!(renderer.card_value("dangerousNeos").as_deref(), Some("3"));
    assert_eq!(renderer.card_value("safeNeos").as_deref(), Some("7"));
    assert_eq!(renderer.card_value("riskScore").as_deref(), Some("30.0%"));
    for id in ["dangerChart", "velocityChart", "diameterChart", "distanceChart"] {
        assert!(renderer.chart(id).is_some(), "missing chart {}", id);
    }
    let tables = renderer.tables();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].rows.len(), 10);
}

#[tokio::test]
async fn dashboard_section_failure_is_isolated() {
    let source = FlakySource::new(sample(10), Some(10));
    let renderer = MemoryRenderer::new();
    let outcome = DashboardPage::new(&source, &renderer, settings()).load().await;

    assert_eq!(outcome.failed, vec!["neosTable"]);
    assert_eq!(renderer.section_errors(), vec!["neosTable".to_string()]);
    assert!(renderer.tables().is_empty());
    assert_eq!(renderer.card_value("totalNeos").as_deref(), Some("10"));
    assert_eq!(renderer.charts().len(), 4);
    let errors = renderer.notices(NoticeLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("503"), "{}", errors[0]);
}

#[tokio::test]
async fn dashboard_refresh_brackets_reload() {
    let source = FlakySource::new(sample(4), None);
    let renderer = MemoryRenderer::new();
    DashboardPage::new(&source, &renderer, settings()).refresh().await;

    assert_eq!(renderer.notices(NoticeLevel::Info), vec!["Refreshing data...".to_string()]);
    assert_eq!(renderer.notices(NoticeLevel::Success), vec!["Data refreshed".to_string()]);
}

#[tokio::test]
async fn empty_batch_renders_sentinels() {
    let source = FlakySource::new(Vec::new(), None);
    let renderer = MemoryRenderer::new();
    DashboardPage::new(&source, &renderer, settings()).load().await;
    assert_eq!(renderer.card_value("riskScore").as_deref(), Some("-"));

    let renderer = MemoryRenderer::new();
    let outcome = AnalyticsPage::new(&source, &renderer, 200).load().await;
    assert!(outcome.is_ok());
    assert_eq!(renderer.card_value("avgDiameter").as_deref(), Some("-"));
    assert_eq!(renderer.card_value("closestDistance").as_deref(), Some("-"));
}

#[tokio::test]
async fn analytics_renders_charts_and_comparison() {
    let source = FlakySource::new(sample(20), None);
    let renderer = MemoryRenderer::new();
    let outcome = AnalyticsPage::new(&source, &renderer, 200).load().await;

    assert!(outcome.is_ok());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.charts().len(), 5);
    let hist = renderer.chart("diameterHistogram").unwrap();
    let total: f64 = match &hist.series[0].data {
        neodash::charts::SeriesData::Values(v) => v.iter().sum(),
        _ => panic!("histogram should carry plain values"),
    };
    assert!(total <= 20.0);
    let table = &renderer.tables()[0];
    assert_eq!(table.id, "statsTable");
    assert_eq!(table.rows[0], vec!["Count", "20", "6", "14"]);
}

#[tokio::test]
async fn analytics_failure_renders_section_error() {
    let source = FlakySource::new(sample(5), Some(200));
    let renderer = MemoryRenderer::new();
    let outcome = AnalyticsPage::new(&source, &renderer, 200).load().await;

    assert!(!outcome.is_ok());
    assert_eq!(renderer.section_errors(), vec!["analytics".to_string()]);
    assert!(renderer.charts().is_empty());
}

#[tokio::test]
async fn neo_list_paginates() {
    let source = FileNeoSource::from_records(sample(45));
    let renderer = MemoryRenderer::new();
    let mut page = NeoListPage::new(&source, &renderer, ViewState::new(20));

    assert!(page.load().await.is_ok());
    assert_eq!(page.batch().len(), 20);
    assert!(page.view().has_next());
    assert!(!page.view().has_previous());
    assert!(page.previous_page().await.is_none());

    assert!(page.next_page().await.is_some());
    assert!(page.next_page().await.is_some());
    assert_eq!(page.view().current_page, 2);
    assert_eq!(page.batch().len(), 5);
    assert!(!page.view().has_next());
    assert!(page.next_page().await.is_none());

    assert!(page.previous_page().await.is_some());
    assert_eq!(page.view().current_page, 1);
    assert_eq!(page.batch()[0].id, 20);

    let last = renderer
        .widgets()
        .into_iter()
        .filter_map(|w| match w {
            Widget::Pagination(p) => Some(p),
            _ => None,
        })
        .last()
        .unwrap();
    assert_eq!(last.page, 2);
    assert!(last.prev_enabled && last.next_enabled);
}

#[tokio::test]
async fn neo_list_filters() {
    let records = vec![
        neo(1, "433 Eros", 16_840.0, 5.6, false),
        neo(2, "99942 Apophis", 370.0, 7.4, true),
        neo(3, "(2019 OK)", 100.0, 24.5, true),
    ];
    let source = FileNeoSource::from_records(records);
    let renderer = MemoryRenderer::new();
    let mut page = NeoListPage::new(&source, &renderer, ViewState::new(20));

    page.apply_filters(Some(true), Some("  apoph ".to_string()), 20).await;
    assert_eq!(page.view().name_filter.as_deref(), Some("apoph"));
    assert_eq!(page.batch().len(), 2);
    let cards: Vec<String> = renderer.panels().into_iter().map(|p| p.id).collect();
    assert_eq!(cards, vec!["neo-2".to_string()]);

    page.apply_filters(None, Some("ceres".to_string()), 20).await;
    assert!(renderer.widgets().iter().any(|w| matches!(
        w,
        Widget::Empty { message, .. } if message == "No NEOs match the name filter"
    )));

    page.clear_filters().await;
    assert_eq!(page.view().danger_filter, None);
    assert_eq!(page.view().name_filter, None);
    assert_eq!(page.batch().len(), 3);
}

#[tokio::test]
async fn neo_details_failure_notifies() {
    let source = FlakySource::new(sample(3), None);
    let renderer = MemoryRenderer::new();
    let page = NeoListPage::new(&source, &renderer, ViewState::default());

    let outcome = page.show_details(42).await;
    assert_eq!(outcome.failed, vec!["neoModal"]);
    assert!(renderer
        .notices(NoticeLevel::Error)
        .contains(&"Failed to load NEO details".to_string()));
}

#[tokio::test]
async fn training_validates_dates_before_requesting() {
    let ml = FakeMl::default();
    let renderer = MemoryRenderer::new();
    let mut page = MlPage::new(&ml, &renderer);

    assert!(!page.train(None, Some(date(2024, 1, 1))).await.is_ok());
    assert!(!page.train(Some(date(2024, 2, 1)), Some(date(2024, 1, 1))).await.is_ok());
    assert_eq!(ml.calls.load(Ordering::SeqCst), 0);
    assert_eq!(renderer.notices(NoticeLevel::Error).len(), 2);
}

#[tokio::test]
async fn training_history_grows_per_run() {
    let ml = FakeMl::default();
    let renderer = MemoryRenderer::new();
    let mut page = MlPage::new(&ml, &renderer);

    page.train(Some(date(2024, 1, 1)), Some(date(2024, 1, 31))).await;
    page.train(Some(date(2024, 2, 1)), Some(date(2024, 2, 29))).await;
    assert_eq!(page.history().len(), 2);
    assert_eq!(ml.trained.lock().unwrap().len(), 2);
    assert_eq!(renderer.card_value("mlAccuracy").as_deref(), Some("90%"));

    let history = renderer.charts().into_iter().filter(|c| c.id == "trainingHistoryChart").last().unwrap();
    assert_eq!(history.labels, vec!["Run 1", "Run 2"]);

    let failed = page.train_all().await;
    assert_eq!(failed.failed, vec!["trainingResult"]);
    assert_eq!(page.history().len(), 2);
    assert!(renderer.section_errors().contains(&"trainingResult".to_string()));
}

#[tokio::test]
async fn prediction_paths() {
    let renderer = MemoryRenderer::new();
    let ml = FakeMl {
        prediction: Some(json!({"ehPerigoso": true, "scoreRisco": 72.5})),
        ..Default::default()
    };
    let page = MlPage::new(&ml, &renderer);

    let bad = PredictionFeatures {
        min_diameter_m: -1.0,
        max_diameter_m: 10.0,
        velocity_km_s: 5.0,
        absolute_magnitude: None,
    };
    assert!(!page.predict(bad).await.is_ok());
    assert_eq!(ml.calls.load(Ordering::SeqCst), 0);

    let good = PredictionFeatures {
        min_diameter_m: 120.0,
        ..bad
    };
    assert!(page.predict(good).await.is_ok());
    let panel = renderer.panels().pop().unwrap();
    assert_eq!(panel.badge.as_deref(), Some("DANGEROUS"));
    assert_eq!(panel.items[1].1, "72.5%");

    let failing = FakeMl::default();
    let renderer = MemoryRenderer::new();
    let outcome = MlPage::new(&failing, &renderer).predict(good).await;
    assert_eq!(outcome.failed, vec!["predictionResult"]);
    let hint = renderer.widgets().into_iter().find_map(|w| match w {
        Widget::SectionError { message, .. } => Some(message),
        _ => None,
    });
    assert!(hint.unwrap().contains("trained and loaded"));
}

#[tokio::test]
async fn reload_reports_success() {
    let ml = FakeMl::default();
    let renderer = MemoryRenderer::new();
    assert!(MlPage::new(&ml, &renderer).reload().await.is_ok());
    assert_eq!(
        renderer.notices(NoticeLevel::Success),
        vec!["Model reloaded successfully".to_string()]
    );
}
