use std::time::Duration;

/// Output mode for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputMode::Text),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub neo_core_url: String,
    pub ml_service_url: String,
    /// `None` leaves requests unbounded.
    pub http_timeout: Option<Duration>,
    pub dashboard_batch: u32,
    pub recent_batch: u32,
    pub analytics_batch: u32,
    pub top_n: usize,
    pub page_size: u32,
    pub output: OutputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            neo_core_url: "http://localhost:8080".to_string(),
            ml_service_url: "http://localhost:8081".to_string(),
            http_timeout: None,
            dashboard_batch: 100,
            recent_batch: 10,
            analytics_batch: 200,
            top_n: 10,
            page_size: 20,
            output: OutputMode::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            neo_core_url: std::env::var("NEO_CORE_URL").unwrap_or(d.neo_core_url),
            ml_service_url: std::env::var("ML_SERVICE_URL").unwrap_or(d.ml_service_url),
            http_timeout: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            dashboard_batch: std::env::var("DASHBOARD_BATCH").ok().and_then(|v| v.parse().ok()).unwrap_or(d.dashboard_batch),
            recent_batch: std::env::var("RECENT_BATCH").ok().and_then(|v| v.parse().ok()).unwrap_or(d.recent_batch),
            analytics_batch: std::env::var("ANALYTICS_BATCH").ok().and_then(|v| v.parse().ok()).unwrap_or(d.analytics_batch),
            top_n: std::env::var("TOP_N").ok().and_then(|v| v.parse().ok()).unwrap_or(d.top_n),
            page_size: std::env::var("PAGE_SIZE").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(d.page_size),
            output: std::env::var("OUTPUT").ok().and_then(|v| OutputMode::parse(&v)).unwrap_or(d.output),
        }
    }
}
