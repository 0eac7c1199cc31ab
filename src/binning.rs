//! Diameter histogram and monthly approach counts.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::NeoRecord;

/// Diameter histogram boundaries in meters.
pub const DIAMETER_BOUNDARIES: [f64; 8] = [0.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub label: String,
    pub low: f64,
    pub high: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
}

impl MonthCount {
    /// `MM/YYYY`
    pub fn label(&self) -> String {
        match self.month.split_once('-') {
            Some((year, month)) => format!("{}/{}", month, year),
            None => self.month.clone(),
        }
    }
}

/// Counts values into `[b[i], b[i+1])` buckets. Values outside
/// `[b[0], b[last])` (and NaN) are dropped.
pub fn bin_by_boundaries<I>(values: I, boundaries: &[f64]) -> Vec<Bin>
where
    I: IntoIterator<Item = f64>,
{
    let mut bins: Vec<Bin> = boundaries
        .windows(2)
        .map(|w| Bin {
            label: format!("{}-{}m", w[0], w[1]),
            low: w[0],
            high: w[1],
            count: 0,
        })
        .collect();

    for v in values {
        if let Some(bin) = bins.iter_mut().find(|b| b.low <= v && v < b.high) {
            bin.count += 1;
        }
    }
    bins
}

pub fn diameter_histogram(records: &[NeoRecord]) -> Vec<Bin> {
    bin_by_boundaries(records.iter().map(|n| n.diameter()), &DIAMETER_BOUNDARIES)
}

/// Approach counts per `YYYY-MM`, ascending. Undated records are skipped.
pub fn monthly_approaches(records: &[NeoRecord]) -> Vec<MonthCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for month in records.iter().filter_map(|n| n.approach_month()) {
        *counts.entry(month).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(month, count)| MonthCount {
            month: month.to_string(),
            count,
        })
        .collect()
}
