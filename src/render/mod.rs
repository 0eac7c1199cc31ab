//! Rendering collaborator.
//!
//! Controllers describe what to show as [`Widget`]s; a [`Renderer`] decides
//! how. Each widget is written by exactly one controller section.

use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

use crate::charts::Dataset;
use crate::logging::{log, obj, v_str, Domain, Level};

mod text;

pub use text::TextRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl StatCard {
    pub fn new(id: &str, label: &str, value: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub id: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Shown instead of rows when `rows` is empty.
    pub empty_message: String,
}

/// Key/value block: NEO card, detail view, training or prediction result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub id: String,
    pub title: String,
    pub badge: Option<String>,
    pub items: Vec<(String, String)>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based for display.
    pub page: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Notice { level: NoticeLevel, message: String },
    Loading { section: String, message: String },
    SectionError { section: String, message: String },
    Empty { section: String, message: String },
    StatCards { section: String, cards: Vec<StatCard> },
    Chart(Dataset),
    Table(Table),
    Panel(Panel),
    Pagination(Pagination),
}

impl Widget {
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Notice { .. } => "notice",
            Widget::Loading { .. } => "loading",
            Widget::SectionError { .. } => "section_error",
            Widget::Empty { .. } => "empty",
            Widget::StatCards { .. } => "stat_cards",
            Widget::Chart(_) => "chart",
            Widget::Table(_) => "table",
            Widget::Panel(_) => "panel",
            Widget::Pagination(_) => "pagination",
        }
    }
}

pub trait Renderer: Send + Sync {
    fn render(&self, widget: Widget);

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.render(Widget::Notice {
            level,
            message: message.to_string(),
        });
    }

    fn section_error(&self, section: &str, message: &str) {
        self.render(Widget::SectionError {
            section: section.to_string(),
            message: message.to_string(),
        });
    }
}

fn log_widget(widget: &Widget) {
    log(
        Level::Trace,
        Domain::Render,
        "widget",
        obj(&[("kind", v_str(widget.kind()))]),
    );
}

/// One JSON object per widget on stdout.
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, widget: Widget) {
        log_widget(&widget);
        match serde_json::to_string(&widget) {
            Ok(line) => {
                let mut out = std::io::stdout().lock();
                let _ = writeln!(out, "{}", line);
            }
            Err(err) => eprintln!("[render] failed to encode widget: {}", err),
        }
    }
}

/// Keeps widgets in memory, in render order.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    widgets: Mutex<Vec<Widget>>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widgets(&self) -> Vec<Widget> {
        self.widgets.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn charts(&self) -> Vec<Dataset> {
        self.widgets()
            .into_iter()
            .filter_map(|w| match w {
                Widget::Chart(ds) => Some(ds),
                _ => None,
            })
            .collect()
    }

    pub fn chart(&self, id: &str) -> Option<Dataset> {
        self.charts().into_iter().find(|c| c.id == id)
    }

    pub fn tables(&self) -> Vec<Table> {
        self.widgets()
            .into_iter()
            .filter_map(|w| match w {
                Widget::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn panels(&self) -> Vec<Panel> {
        self.widgets()
            .into_iter()
            .filter_map(|w| match w {
                Widget::Panel(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn stat_cards(&self) -> Vec<StatCard> {
        self.widgets()
            .into_iter()
            .filter_map(|w| match w {
                Widget::StatCards { cards, .. } => Some(cards),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn card_value(&self, id: &str) -> Option<String> {
        self.stat_cards()
            .into_iter()
            .rev()
            .find(|c| c.id == id)
            .map(|c| c.value)
    }

    pub fn section_errors(&self) -> Vec<String> {
        self.widgets()
            .into_iter()
            .filter_map(|w| match w {
                Widget::SectionError { section, .. } => Some(section),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self, level: NoticeLevel) -> Vec<String> {
        self.widgets()
            .into_iter()
            .filter_map(|w| match w {
                Widget::Notice { level: l, message } if l == level => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for MemoryRenderer {
    fn render(&self, widget: Widget) {
        log_widget(&widget);
        if let Ok(mut w) = self.widgets.lock() {
            w.push(widget);
        }
    }
}
