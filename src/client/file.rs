use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::Path;

use crate::client::{NeoQuery, NeoSource};
use crate::model::NeoRecord;

/// Serves a JSON array of NEO records as if it were the NEO service:
/// danger filter first, then `pagina`/`tamanho` slicing.
#[derive(Debug, Clone)]
pub struct FileNeoSource {
    records: Vec<NeoRecord>,
}

impl FileNeoSource {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let records: Vec<NeoRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<NeoRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn page(&self, query: NeoQuery) -> Vec<NeoRecord> {
        let start = query.page as usize * query.size as usize;
        self.records
            .iter()
            .filter(|r| query.dangerous.map_or(true, |d| r.hazardous == d))
            .skip(start)
            .take(query.size as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NeoSource for FileNeoSource {
    async fn list(&self, query: NeoQuery) -> Result<Vec<NeoRecord>> {
        Ok(self.page(query))
    }

    async fn get(&self, id: i64) -> Result<NeoRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("HTTP error! status: 404"))
    }
}
