//! Structured JSON-lines logging.
//!
//! Every record carries `ts`, `run_id`, `seq`, `lvl`, `component`, `event`,
//! `msg` and a `data` object. Records go to stderr so stdout stays reserved
//! for rendered output. When `LOG_DIR` is set they are also appended to
//! `$LOG_DIR/<run_id>/events.jsonl` (info and above) and `trace.jsonl`.
//!
//! Filtering: `LOG_LEVEL` (default `info`), `LOG_DOMAINS` (comma list or `all`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Levels and domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(Level::Info)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Fetch,     // Requests to the NEO and ML services
    Aggregate, // Stats, bins, datasets
    Render,    // Widgets handed to the renderer
    Ml,        // Training and prediction
    View,      // Pagination and filters
    System,    // Startup, config, shutdown
    Profile,   // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Fetch => "fetch",
            Domain::Aggregate => "aggregate",
            Domain::Render => "render",
            Domain::Ml => "ml",
            Domain::View => "view",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let Ok(base) = std::env::var("LOG_DIR") else {
            return RunContext {
                run_id,
                events: None,
                trace: None,
            };
        };

        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }
        let open = |name: &str| match File::create(run_dir.join(name)) {
            Ok(f) => Some(Mutex::new(BufWriter::new(f))),
            Err(err) => {
                eprintln!("[log] failed to create {}: {}", name, err);
                None
            }
        };
        RunContext {
            events: open("events.jsonl"),
            trace: open("trace.jsonl"),
            run_id,
        }
    })
}

pub fn run_id() -> &'static str {
    &ensure_run_context().run_id
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "api_key", "token", "password"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

/// Lifts correlation keys out of `data` to the top level of the record.
fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["page", "section", "url", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(writer) = writer {
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

// =============================================================================
// Core
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    count(level, domain);
    emit_record(level, domain.as_str(), event, fields);
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let (mut top, data) = split_fields(sanitize_fields(fields));

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));

    let line = Value::Object(entry).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    eprintln!("{}", line);
}

// =============================================================================
// Domain helpers
// =============================================================================

pub fn log_fetch(method: &str, url: &str, status: u16, elapsed_ms: f64) {
    log(
        Level::Debug,
        Domain::Fetch,
        "fetch.ok",
        obj(&[
            ("url", v_str(url)),
            ("method", v_str(method)),
            ("status", json!(status)),
            ("elapsed_ms", v_num(elapsed_ms)),
        ]),
    );
}

pub fn log_fetch_error(method: &str, url: &str, err: &str) {
    log(
        Level::Error,
        Domain::Fetch,
        "fetch.error",
        obj(&[
            ("url", v_str(url)),
            ("method", v_str(method)),
            ("msg", v_str(err)),
        ]),
    );
}

pub fn log_section_error(page: &str, section: &str, err: &str) {
    log(
        Level::Warn,
        Domain::Render,
        "section.error",
        obj(&[
            ("page", v_str(page)),
            ("section", v_str(section)),
            ("msg", v_str(err)),
        ]),
    );
}

pub fn log_batch(page: &str, section: &str, records: usize, dangerous: usize) {
    log(
        Level::Info,
        Domain::Aggregate,
        "batch",
        obj(&[
            ("page", v_str(page)),
            ("section", v_str(section)),
            ("records", json!(records)),
            ("dangerous", json!(dangerous)),
        ]),
    );
}

// =============================================================================
// Helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling scope
// =============================================================================

/// Emits `elapsed_ms` at trace level on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self::with_context(label, &[])
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Session counters
// =============================================================================

static COUNTERS: OnceLock<Mutex<SessionCounters>> = OnceLock::new();

#[derive(Debug, Default, Clone, Copy)]
struct SessionCounters {
    fetch_errors: u64,
    section_errors: u64,
    records: u64,
}

fn counters() -> &'static Mutex<SessionCounters> {
    COUNTERS.get_or_init(|| Mutex::new(SessionCounters::default()))
}

fn count(level: Level, domain: Domain) {
    if level < Level::Warn {
        return;
    }
    if let Ok(mut c) = counters().lock() {
        match domain {
            Domain::Fetch => c.fetch_errors += 1,
            Domain::Render => c.section_errors += 1,
            _ => {}
        }
    }
}

pub fn add_records(n: usize) {
    if let Ok(mut c) = counters().lock() {
        c.records += n as u64;
    }
}

/// Emitted once at shutdown.
pub fn log_session_summary(command: &str, elapsed_ms: f64) {
    let c = counters().lock().map(|c| *c).unwrap_or_default();
    log(
        Level::Info,
        Domain::System,
        "session.summary",
        obj(&[
            ("command", v_str(command)),
            ("elapsed_ms", v_num(elapsed_ms)),
            ("records", json!(c.records)),
            ("fetch_errors", json!(c.fetch_errors)),
            ("section_errors", json!(c.section_errors)),
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("WARN"), Some(Level::Warn));
        assert_eq!(Level::parse(" debug "), Some(Level::Debug));
        assert_eq!(Level::parse("loud"), None);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_sanitize_redacts() {
        let m = sanitize_fields(obj(&[("token", v_str("abc")), ("page", v_str("neos"))]));
        assert_eq!(m.get("token").unwrap(), "[REDACTED]");
        assert_eq!(m.get("page").unwrap(), "neos");
    }

    #[test]
    fn test_split_fields_lifts_correlation_keys() {
        let (top, data) = split_fields(obj(&[
            ("page", v_str("analytics")),
            ("msg", v_str("boom")),
            ("records", json!(3)),
        ]));
        assert!(top.contains_key("page"));
        assert!(top.contains_key("msg"));
        assert!(data.contains_key("records"));
        assert!(!data.contains_key("page"));
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
