//! Chart-ready datasets built from records, stats and bins.
//!
//! A [`Dataset`] is widget-agnostic: labels plus one or more named series.
//! Nothing here mutates the records it reads.

use serde::Serialize;

use crate::binning::{Bin, MonthCount};
use crate::format;
use crate::model::{NeoRecord, TrainingResult};
use crate::stats::HazardSplit;

/// Chart labels are record names cut to this many characters.
pub const LABEL_CHARS: usize = 15;

/// Dashboard distance trend: `max diameter * 1000 * (index + 1)`.
const TREND_DISTANCE_FACTOR: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Doughnut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Values(Vec<f64>),
    Points(Vec<Point>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(v) => v.len(),
            SeriesData::Points(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: SeriesData,
}

impl Series {
    fn values(label: &str, values: Vec<f64>) -> Self {
        Self {
            label: label.to_string(),
            data: SeriesData::Values(values),
        }
    }

    fn points(label: &str, points: Vec<Point>) -> Self {
        Self {
            label: label.to_string(),
            data: SeriesData::Points(points),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Widget id, stable across runs.
    pub id: &'static str,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl Dataset {
    fn new(id: &'static str, kind: ChartKind, title: &str) -> Self {
        Self {
            id,
            kind,
            title: title.to_string(),
            labels: Vec::new(),
            series: Vec::new(),
        }
    }
}

pub fn hazard_doughnut(split: &HazardSplit) -> Dataset {
    let mut ds = Dataset::new("dangerChart", ChartKind::Doughnut, "Hazard distribution");
    ds.labels = vec!["Dangerous".to_string(), "Safe".to_string()];
    ds.series = vec![Series::values(
        "NEOs",
        vec![split.dangerous as f64, split.safe as f64],
    )];
    ds
}

/// First `n` records in fetch order, not the `n` fastest.
pub fn top_velocity(records: &[NeoRecord], n: usize) -> Dataset {
    top_n_bar(
        "velocityChart",
        "Velocity (km/h)",
        records,
        n,
        NeoRecord::velocity_kmh,
    )
}

/// First `n` records in fetch order, not the `n` largest.
pub fn top_diameter(records: &[NeoRecord], n: usize) -> Dataset {
    top_n_bar("diameterChart", "Diameter (m)", records, n, NeoRecord::diameter)
}

fn top_n_bar(
    id: &'static str,
    title: &str,
    records: &[NeoRecord],
    n: usize,
    value: fn(&NeoRecord) -> f64,
) -> Dataset {
    let head = &records[..n.min(records.len())];
    let mut ds = Dataset::new(id, ChartKind::Bar, title);
    ds.labels = head.iter().map(|r| format::truncate(&r.name, LABEL_CHARS)).collect();
    ds.series = vec![Series::values(title, head.iter().map(value).collect())];
    ds
}

/// Mock distance per position; the NEO service has no miss distance.
pub fn distance_trend(records: &[NeoRecord], n: usize) -> Dataset {
    let head = &records[..n.min(records.len())];
    let mut ds = Dataset::new("distanceChart", ChartKind::Line, "Distance (km)");
    ds.labels = head.iter().map(|r| format::truncate(&r.name, LABEL_CHARS)).collect();
    ds.series = vec![Series::values(
        "Distance (km)",
        head.iter()
            .enumerate()
            .map(|(i, r)| r.diameter() * TREND_DISTANCE_FACTOR * (i + 1) as f64)
            .collect(),
    )];
    ds
}

fn hazard_scatter(
    id: &'static str,
    title: &str,
    records: &[NeoRecord],
    point: impl Fn(&NeoRecord) -> Point,
) -> Dataset {
    let dangerous = records.iter().filter(|r| r.hazardous).map(&point).collect();
    let safe = records.iter().filter(|r| !r.hazardous).map(&point).collect();
    let mut ds = Dataset::new(id, ChartKind::Scatter, title);
    ds.series = vec![
        Series::points("Dangerous", dangerous),
        Series::points("Safe", safe),
    ];
    ds
}

/// x = velocity (km/h), y = max diameter (m).
pub fn velocity_scatter(records: &[NeoRecord]) -> Dataset {
    hazard_scatter(
        "velocityScatter",
        "Velocity (km/h) vs diameter (m)",
        records,
        |r| Point {
            x: r.velocity_kmh(),
            y: r.diameter(),
        },
    )
}

/// x = mock distance (km), y = max diameter (m).
pub fn distance_scatter(records: &[NeoRecord]) -> Dataset {
    hazard_scatter(
        "distanceScatter",
        "Distance (km) vs diameter (m)",
        records,
        |r| Point {
            x: r.mock_distance_km(),
            y: r.diameter(),
        },
    )
}

pub fn diameter_histogram_chart(bins: &[Bin]) -> Dataset {
    let mut ds = Dataset::new("diameterHistogram", ChartKind::Bar, "NEOs by diameter");
    ds.labels = bins.iter().map(|b| b.label.clone()).collect();
    ds.series = vec![Series::values(
        "NEOs",
        bins.iter().map(|b| b.count as f64).collect(),
    )];
    ds
}

pub fn monthly_approaches_chart(months: &[MonthCount]) -> Dataset {
    let mut ds = Dataset::new("monthlyApproaches", ChartKind::Line, "Approaches per month");
    ds.labels = months.iter().map(MonthCount::label).collect();
    ds.series = vec![Series::values(
        "Approaches",
        months.iter().map(|m| m.count as f64).collect(),
    )];
    ds
}

/// Fixed illustrative coefficients. Not computed from the records.
pub fn hazard_correlation() -> Dataset {
    let mut ds = Dataset::new(
        "correlationMatrix",
        ChartKind::Bar,
        "Correlation with hazard (illustrative)",
    );
    ds.labels = vec![
        "Diameter-Hazard".to_string(),
        "Velocity-Hazard".to_string(),
        "Distance-Hazard".to_string(),
    ];
    ds.series = vec![Series::values("Correlation", vec![0.67, 0.52, -0.38])];
    ds
}

/// One point per training run of the current session.
pub fn training_history(runs: &[TrainingResult]) -> Dataset {
    let mut ds = Dataset::new("trainingHistoryChart", ChartKind::Line, "Training history");
    ds.labels = (1..=runs.len()).map(|i| format!("Run {}", i)).collect();
    ds.series = vec![
        Series::values("Accuracy", runs.iter().map(|r| r.accuracy).collect()),
        Series::values("Precision", runs.iter().map(|r| r.precision).collect()),
        Series::values("Recall", runs.iter().map(|r| r.recall).collect()),
        Series::values("F1-Score", runs.iter().map(|r| r.f1_score).collect()),
    ];
    ds
}
