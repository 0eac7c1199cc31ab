use std::fmt::Write as _;
use std::io::Write;

use super::{log_widget, NoticeLevel, Panel, Renderer, Table, Widget};
use crate::charts::{ChartKind, Dataset, SeriesData};
use crate::format;

const BAR_WIDTH: usize = 30;
const SCATTER_PREVIEW: usize = 5;

/// Plain-text terminal output.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, widget: Widget) {
        log_widget(&widget);
        let text = to_text(&widget);
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", text);
    }
}

pub fn to_text(widget: &Widget) -> String {
    match widget {
        Widget::Notice { level, message } => {
            let tag = match level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Error => "error",
            };
            format!("[{}] {}", tag, message)
        }
        Widget::Loading { section, message } => format!("[{}] {}", section, message),
        Widget::SectionError { section, message } => format!("[{}] error: {}", section, message),
        Widget::Empty { section, message } => format!("[{}] {}", section, message),
        Widget::StatCards { section, cards } => {
            let mut s = format!("== {} ==\n", section);
            let width = cards.iter().map(|c| c.label.chars().count()).max().unwrap_or(0);
            for c in cards {
                let _ = writeln!(s, "  {:<width$}  {}", c.label, c.value, width = width);
            }
            s
        }
        Widget::Chart(ds) => chart_text(ds),
        Widget::Table(t) => table_text(t),
        Widget::Panel(p) => panel_text(p),
        Widget::Pagination(p) => format!(
            "page {}  [{}prev] [{}next]",
            p.page,
            if p.prev_enabled { "" } else { "x " },
            if p.next_enabled { "" } else { "x " },
        ),
    }
}

fn chart_text(ds: &Dataset) -> String {
    let mut s = format!("== {} ==\n", ds.title);
    match ds.kind {
        ChartKind::Scatter => {
            for series in &ds.series {
                let SeriesData::Points(points) = &series.data else {
                    continue;
                };
                let _ = writeln!(s, "  {} ({} points)", series.label, points.len());
                for p in points.iter().take(SCATTER_PREVIEW) {
                    let _ = writeln!(
                        s,
                        "    x={}  y={}",
                        format::number(Some(p.x)),
                        format::number(Some(p.y))
                    );
                }
            }
        }
        ChartKind::Doughnut => {
            if let Some(SeriesData::Values(values)) = ds.series.first().map(|x| &x.data) {
                let total: f64 = values.iter().sum();
                for (label, v) in ds.labels.iter().zip(values) {
                    let pct = if total > 0.0 { Some(v / total * 100.0) } else { None };
                    let _ = writeln!(
                        s,
                        "  {:<12} {:>8}  {}",
                        label,
                        format::number(Some(*v)),
                        format::percent(pct)
                    );
                }
            }
        }
        ChartKind::Bar | ChartKind::Line => {
            for series in &ds.series {
                let SeriesData::Values(values) = &series.data else {
                    continue;
                };
                if ds.series.len() > 1 {
                    let _ = writeln!(s, "  -- {}", series.label);
                }
                let peak = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                let width = ds.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                for (label, v) in ds.labels.iter().zip(values) {
                    let len = if peak > 0.0 {
                        (v.abs() / peak * BAR_WIDTH as f64).round() as usize
                    } else {
                        0
                    };
                    let _ = writeln!(
                        s,
                        "  {:<width$}  {:<bar$}  {}",
                        label,
                        "#".repeat(len),
                        format::number(Some(*v)),
                        width = width,
                        bar = BAR_WIDTH
                    );
                }
            }
        }
    }
    if ds.labels.is_empty() && ds.series.iter().all(|x| x.data.is_empty()) {
        s.push_str("  (no data)\n");
    }
    s
}

fn table_text(t: &Table) -> String {
    if t.rows.is_empty() {
        return format!("{}\n  {}\n", t.headers.join(" | "), t.empty_message);
    }
    let cols = t.headers.len();
    let mut widths: Vec<usize> = t.headers.iter().map(|h| h.chars().count()).collect();
    for row in &t.rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    let mut s = line(&t.headers);
    s.push('\n');
    s.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    s.push('\n');
    for row in &t.rows {
        s.push_str(&line(row));
        s.push('\n');
    }
    s
}

fn panel_text(p: &Panel) -> String {
    let mut s = match &p.badge {
        Some(badge) => format!("-- {} [{}]\n", p.title, badge),
        None => format!("-- {}\n", p.title),
    };
    let width = p.items.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (k, v) in &p.items {
        let _ = writeln!(s, "   {:<width$}  {}", k, v, width = width);
    }
    if let Some(footer) = &p.footer {
        let _ = writeln!(s, "   {}", footer);
    }
    s
}
