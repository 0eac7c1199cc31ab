//! Boundary to the NEO and ML services.
//!
//! Controllers only see the [`NeoSource`] and [`MlSource`] traits. The HTTP
//! implementations talk to the real services; [`file::FileNeoSource`] serves a
//! JSON snapshot for offline runs.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Config;
use crate::model::{NeoRecord, PredictionFeatures, PredictionResult, TrainingResult};

pub mod file;
pub mod http;

/// One page of the NEO listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeoQuery {
    pub page: u32,
    pub size: u32,
    pub dangerous: Option<bool>,
}

impl NeoQuery {
    pub fn first(size: u32) -> Self {
        Self {
            page: 0,
            size,
            dangerous: None,
        }
    }
}

#[async_trait]
pub trait NeoSource {
    async fn list(&self, query: NeoQuery) -> Result<Vec<NeoRecord>>;
    async fn get(&self, id: i64) -> Result<NeoRecord>;
}

#[async_trait]
pub trait MlSource {
    async fn train(&self, start: NaiveDate, end: NaiveDate) -> Result<TrainingResult>;
    async fn train_all(&self) -> Result<TrainingResult>;
    async fn reload(&self) -> Result<()>;
    async fn predict(&self, features: PredictionFeatures) -> Result<PredictionResult>;
}

/// NEO backend selection: live service or a local snapshot file.
#[derive(Debug, Clone)]
pub enum NeoSourceKind {
    Http,
    File(std::path::PathBuf),
}

impl NeoSourceKind {
    pub fn build(self, cfg: &Config) -> Result<Box<dyn NeoSource + Send + Sync>> {
        match self {
            NeoSourceKind::Http => Ok(Box::new(http::HttpNeoClient::new(cfg)?)),
            NeoSourceKind::File(path) => Ok(Box::new(file::FileNeoSource::open(&path)?)),
        }
    }
}
