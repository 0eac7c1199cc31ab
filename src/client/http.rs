use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use url::Url;

use crate::client::{MlSource, NeoQuery, NeoSource};
use crate::config::Config;
use crate::logging::{log_fetch, log_fetch_error};
use crate::model::{NeoRecord, PredictionFeatures, PredictionResult, TrainingResult};

fn build_client(cfg: &Config) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = cfg.http_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("building http client")
}

/// Parses `base` so that `join` appends rather than replaces the last segment.
fn parse_base(base: &str) -> Result<Url> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).with_context(|| format!("invalid service url: {}", base))
}

/// Sends the request and decodes a JSON body. Non-2xx is an error; there is
/// no retry.
async fn send_json<T: DeserializeOwned>(method: &str, url: &Url, req: RequestBuilder) -> Result<T> {
    let started = Instant::now();
    let resp = match req.send().await {
        Ok(resp) => resp,
        Err(err) => {
            log_fetch_error(method, url.as_str(), &err.to_string());
            return Err(anyhow!("request to {} failed: {}", url, err));
        }
    };
    let status = resp.status();
    if !status.is_success() {
        let msg = format!("HTTP error! status: {}", status.as_u16());
        log_fetch_error(method, url.as_str(), &msg);
        bail!(msg);
    }
    log_fetch(method, url.as_str(), status.as_u16(), started.elapsed().as_secs_f64() * 1000.0);
    resp.json::<T>()
        .await
        .with_context(|| format!("decoding response from {}", url))
}

pub struct HttpNeoClient {
    client: Client,
    base: Url,
}

impl HttpNeoClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(cfg)?,
            base: parse_base(&cfg.neo_core_url)?,
        })
    }

    /// `/api/neos?pagina=&tamanho=[&perigoso=]`
    pub fn list_url(&self, query: NeoQuery) -> Result<Url> {
        let mut url = self.base.join("api/neos")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("pagina", &query.page.to_string());
            pairs.append_pair("tamanho", &query.size.to_string());
            if let Some(dangerous) = query.dangerous {
                pairs.append_pair("perigoso", if dangerous { "true" } else { "false" });
            }
        }
        Ok(url)
    }

    pub fn detail_url(&self, id: i64) -> Result<Url> {
        Ok(self.base.join(&format!("api/neos/{}", id))?)
    }
}

#[async_trait]
impl NeoSource for HttpNeoClient {
    async fn list(&self, query: NeoQuery) -> Result<Vec<NeoRecord>> {
        let url = self.list_url(query)?;
        send_json("GET", &url, self.client.get(url.clone())).await
    }

    async fn get(&self, id: i64) -> Result<NeoRecord> {
        let url = self.detail_url(id)?;
        send_json("GET", &url, self.client.get(url.clone())).await
    }
}

#[derive(Serialize)]
struct TrainRequest {
    inicio: String,
    fim: String,
}

pub struct HttpMlClient {
    client: Client,
    base: Url,
}

impl HttpMlClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(cfg)?,
            base: parse_base(&cfg.ml_service_url)?,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }
}

#[async_trait]
impl MlSource for HttpMlClient {
    async fn train(&self, start: NaiveDate, end: NaiveDate) -> Result<TrainingResult> {
        let url = self.endpoint("ml/train")?;
        let body = TrainRequest {
            inicio: start.format("%Y-%m-%d").to_string(),
            fim: end.format("%Y-%m-%d").to_string(),
        };
        send_json("POST", &url, self.client.post(url.clone()).json(&body)).await
    }

    async fn train_all(&self) -> Result<TrainingResult> {
        let url = self.endpoint("ml/train/all")?;
        send_json("POST", &url, self.client.post(url.clone())).await
    }

    async fn reload(&self) -> Result<()> {
        let url = self.endpoint("ml/reload")?;
        let started = Instant::now();
        let resp = self.client.post(url.clone()).send().await.map_err(|err| {
            log_fetch_error("POST", url.as_str(), &err.to_string());
            anyhow!("request to {} failed: {}", url, err)
        })?;
        let status = resp.status();
        if !status.is_success() {
            let msg = format!("HTTP error! status: {}", status.as_u16());
            log_fetch_error("POST", url.as_str(), &msg);
            bail!(msg);
        }
        // Body is a bare "ok"; not JSON.
        log_fetch("POST", url.as_str(), status.as_u16(), started.elapsed().as_secs_f64() * 1000.0);
        Ok(())
    }

    async fn predict(&self, features: PredictionFeatures) -> Result<PredictionResult> {
        let url = self.endpoint("ml/predict")?;
        let raw: serde_json::Value =
            send_json("POST", &url, self.client.post(url.clone()).json(&features)).await?;
        Ok(PredictionResult::from_value(&raw))
    }
}
