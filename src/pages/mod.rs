//! Page controllers: fetch → aggregate/bin → datasets → render.
//!
//! A failed fetch is rendered as an error notice plus an inline error for the
//! section that issued it. Nothing is retried and no other section is
//! affected.

use anyhow::Result;
use std::future::Future;

use crate::logging::log_section_error;
use crate::render::{NoticeLevel, Renderer, Widget};

pub mod analytics;
pub mod dashboard;
pub mod ml;
pub mod neos;

pub use analytics::AnalyticsPage;
pub use dashboard::DashboardPage;
pub use ml::MlPage;
pub use neos::NeoListPage;

/// Sections that ended in an inline error during one controller run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    pub failed: Vec<&'static str>,
}

impl PageOutcome {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failed(section: &'static str) -> Self {
        Self {
            failed: vec![section],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(mut self, other: PageOutcome) -> Self {
        self.failed.extend(other.failed);
        self
    }
}

/// Awaits one fetch. On failure, renders the API notice and the inline
/// section error and returns `None`.
pub(crate) async fn fetch_section<T, F>(
    renderer: &dyn Renderer,
    page: &str,
    section: &str,
    inline_message: &str,
    fut: F,
) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(err) => {
            let err = format!("{:#}", err);
            log_section_error(page, section, &err);
            renderer.notify(
                NoticeLevel::Error,
                &format!("Failed to reach the API: {}", err),
            );
            renderer.section_error(section, inline_message);
            None
        }
    }
}

pub(crate) fn loading(renderer: &dyn Renderer, section: &str, message: &str) {
    renderer.render(Widget::Loading {
        section: section.to_string(),
        message: message.to_string(),
    });
}

pub(crate) fn hazard_badge(hazardous: bool) -> String {
    if hazardous {
        "DANGEROUS".to_string()
    } else {
        "safe".to_string()
    }
}
