//! Summary statistics over a batch of NEO records.
//!
//! Every figure that can be undefined (mean or extreme of an empty series) is
//! an `Option<f64>`; `None` renders as the "no data" sentinel.

use serde::Serialize;

use crate::model::NeoRecord;

/// Analytics headline: mock closest distance is `avg diameter * 50000`.
pub const HEADLINE_DISTANCE_FACTOR: f64 = 50_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub avg_diameter: Option<f64>,
    pub max_diameter: Option<f64>,
    pub avg_velocity: Option<f64>,
    pub max_velocity: Option<f64>,
    pub min_distance: Option<f64>,
    pub avg_distance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsComparison {
    pub all: Stats,
    pub dangerous: Stats,
    pub safe: Stats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HazardSplit {
    pub total: usize,
    pub dangerous: usize,
    pub safe: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadlineStats {
    pub avg_diameter: Option<f64>,
    pub avg_velocity: Option<f64>,
    pub closest_distance: Option<f64>,
    pub risk_score: Option<f64>,
}

pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

pub fn max<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}

pub fn min<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m <= v => Some(m),
        _ => Some(v),
    })
}

pub fn compute_stats<'a, I>(records: I) -> Stats
where
    I: IntoIterator<Item = &'a NeoRecord>,
{
    let records: Vec<&NeoRecord> = records.into_iter().collect();
    let diameters: Vec<f64> = records.iter().map(|n| n.diameter()).collect();
    let velocities: Vec<f64> = records.iter().map(|n| n.velocity_kmh()).collect();
    let distances: Vec<f64> = records.iter().map(|n| n.mock_distance_km()).collect();

    Stats {
        count: records.len(),
        avg_diameter: mean(diameters.iter().copied()),
        max_diameter: max(diameters.iter().copied()),
        avg_velocity: mean(velocities.iter().copied()),
        max_velocity: max(velocities.iter().copied()),
        min_distance: min(distances.iter().copied().filter(|d| *d > 0.0)),
        avg_distance: mean(distances.iter().copied()),
    }
}

/// All / dangerous / safe columns, each computed independently.
pub fn compare_by_hazard(records: &[NeoRecord]) -> StatsComparison {
    StatsComparison {
        all: compute_stats(records),
        dangerous: compute_stats(records.iter().filter(|n| n.hazardous)),
        safe: compute_stats(records.iter().filter(|n| !n.hazardous)),
    }
}

pub fn hazard_split(records: &[NeoRecord]) -> HazardSplit {
    let dangerous = records.iter().filter(|n| n.hazardous).count();
    HazardSplit {
        total: records.len(),
        dangerous,
        safe: records.len() - dangerous,
    }
}

/// Percentage of dangerous records, one decimal. `None` when `total == 0`.
pub fn risk_score(dangerous: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let pct = dangerous as f64 / total as f64 * 100.0;
    Some((pct * 10.0).round() / 10.0)
}

pub fn headline_stats(records: &[NeoRecord]) -> HeadlineStats {
    let split = hazard_split(records);
    let avg_diameter = mean(records.iter().map(|n| n.diameter()));
    HeadlineStats {
        avg_diameter,
        avg_velocity: mean(records.iter().map(|n| n.velocity_kmh())),
        closest_distance: avg_diameter.map(|d| d * HEADLINE_DISTANCE_FACTOR),
        risk_score: risk_score(split.dangerous, split.total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neo(diameter: f64, velocity: f64, hazardous: bool) -> NeoRecord {
        NeoRecord {
            max_diameter_m: Some(diameter),
            velocity_km_s: Some(velocity),
            hazardous,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_is_all_sentinel() {
        let empty: Vec<NeoRecord> = Vec::new();
        let s = compute_stats(&empty);
        assert_eq!(s.count, 0);
        assert_eq!(s.avg_diameter, None);
        assert_eq!(s.max_diameter, None);
        assert_eq!(s.avg_velocity, None);
        assert_eq!(s.max_velocity, None);
        assert_eq!(s.min_distance, None);
        assert_eq!(s.avg_distance, None);
    }

    #[test]
    fn test_basic_stats() {
        let records = vec![neo(100.0, 10.0, true), neo(300.0, 20.0, false)];
        let s = compute_stats(&records);
        assert_eq!(s.count, 2);
        assert_eq!(s.avg_diameter, Some(200.0));
        assert_eq!(s.max_diameter, Some(300.0));
        assert_eq!(s.avg_velocity, Some(54_000.0));
        assert_eq!(s.max_velocity, Some(72_000.0));
        assert_eq!(s.min_distance, Some(10_000_000.0));
        assert_eq!(s.avg_distance, Some(20_000_000.0));
    }

    #[test]
    fn test_min_distance_skips_zero() {
        let records = vec![neo(0.0, 1.0, false), neo(2.0, 1.0, false)];
        let s = compute_stats(&records);
        assert_eq!(s.min_distance, Some(200_000.0));
        // zeros still count toward the mean
        assert_eq!(s.avg_distance, Some(100_000.0));
    }

    #[test]
    fn test_min_distance_all_zero_is_sentinel() {
        let records = vec![NeoRecord::default(), NeoRecord::default()];
        let s = compute_stats(&records);
        assert_eq!(s.min_distance, None);
        assert_eq!(s.avg_distance, Some(0.0));
        assert_eq!(s.max_diameter, Some(0.0));
    }

    #[test]
    fn test_zero_velocity() {
        let records = vec![neo(10.0, 0.0, false), NeoRecord::default()];
        let s = compute_stats(&records);
        assert_eq!(s.avg_velocity, Some(0.0));
        assert_eq!(s.max_velocity, Some(0.0));
    }

    #[test]
    fn test_partition_counts_add_up() {
        let records = vec![
            neo(10.0, 1.0, true),
            neo(20.0, 2.0, false),
            neo(30.0, 3.0, true),
            neo(40.0, 4.0, false),
            neo(50.0, 5.0, false),
        ];
        let cmp = compare_by_hazard(&records);
        assert_eq!(cmp.all.count, cmp.dangerous.count + cmp.safe.count);
        assert_eq!(cmp.dangerous.count, 2);
        assert_eq!(cmp.dangerous.max_diameter, Some(30.0));
        assert_eq!(cmp.safe.avg_diameter, Some(110.0 / 3.0));
    }

    #[test]
    fn test_risk_score() {
        assert_eq!(risk_score(3, 10), Some(30.0));
        assert_eq!(risk_score(1, 3), Some(33.3));
        assert_eq!(risk_score(2, 3), Some(66.7));
        assert_eq!(risk_score(0, 0), None);
    }

    #[test]
    fn test_headline_stats() {
        let records = vec![neo(100.0, 1.0, true), neo(300.0, 3.0, false)];
        let h = headline_stats(&records);
        assert_eq!(h.avg_diameter, Some(200.0));
        assert_eq!(h.avg_velocity, Some(7_200.0));
        assert_eq!(h.closest_distance, Some(10_000_000.0));
        assert_eq!(h.risk_score, Some(50.0));
        assert_eq!(headline_stats(&[]), HeadlineStats::default());
    }

    #[test]
    fn test_hazard_split() {
        let records = vec![neo(1.0, 1.0, true), neo(1.0, 1.0, false), neo(1.0, 1.0, false)];
        let split = hazard_split(&records);
        assert_eq!(split, HazardSplit { total: 3, dangerous: 1, safe: 2 });
    }
}
