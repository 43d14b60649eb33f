use crate::models::{EvaluationDetail, EvaluationSummary, Health, ResultsList, evaluation_id};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Failures while loading evaluation data
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Result file not found: {0}")]
    NotFound(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid JSON in {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Where evaluation files come from
#[async_trait]
pub trait ResultsSource: Send + Sync {
    /// All evaluations, newest first
    async fn list(&self) -> Result<Vec<EvaluationSummary>, SourceError>;

    /// One evaluation by filename, with or without the `.json` suffix
    async fn detail(&self, filename: &str) -> Result<EvaluationDetail, SourceError>;

    async fn health(&self) -> Result<Health, SourceError>;
}

fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|source| SourceError::Decode {
        context: context.to_string(),
        source,
    })
}

/// Client for the results HTTP API
pub struct ApiSource {
    client: Client,
    base_url: Url,
}

impl ApiSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url).map_err(|e| SourceError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL with `segments` appended, each one percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url` and decode the body; a 404 becomes `not_found` when given
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        not_found: Option<&str>,
    ) -> Result<T, SourceError> {
        debug!("GET {url}");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            if let Some(name) = not_found {
                return Err(SourceError::NotFound(name.to_string()));
            }
        }
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        decode(&body, url.as_str())
    }
}

#[async_trait]
impl ResultsSource for ApiSource {
    async fn list(&self) -> Result<Vec<EvaluationSummary>, SourceError> {
        let list: ResultsList = self.get_json(self.endpoint(&["results"]), None).await?;
        Ok(list.results)
    }

    async fn detail(&self, filename: &str) -> Result<EvaluationDetail, SourceError> {
        let id = evaluation_id(filename);
        let file = format!("{id}.json");
        self.get_json(self.endpoint(&["results", &file]), Some(id)).await
    }

    async fn health(&self) -> Result<Health, SourceError> {
        self.get_json(self.endpoint(&["health"]), None).await
    }
}

/// Result files read straight from a local directory
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read(path: &Path) -> Result<String, SourceError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Listing entry for one file
    async fn summarize_file(&self, path: &Path) -> Result<EvaluationSummary, SourceError> {
        let body = Self::read(path).await?;
        let detail: EvaluationDetail = decode(&body, &path.display().to_string())?;
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        // files carry no timestamp of their own; the first result stands in
        let created_at = detail
            .results
            .first()
            .map(|r| r.created_at.clone())
            .unwrap_or_default();

        Ok(EvaluationSummary {
            filename,
            path: path.display().to_string(),
            summary: detail.summary,
            created_at,
            file_size: metadata.len(),
        })
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

fn is_json_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

#[async_trait]
impl ResultsSource for DirectorySource {
    async fn list(&self) -> Result<Vec<EvaluationSummary>, SourceError> {
        if !is_dir(&self.dir).await {
            debug!("Results directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let io_error = |source| SourceError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_error)?;
        let mut summaries = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if !is_json_file(&path) {
                continue;
            }
            match self.summarize_file(&path).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }

        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(summaries)
    }

    async fn detail(&self, filename: &str) -> Result<EvaluationDetail, SourceError> {
        let id = evaluation_id(filename);
        if id.is_empty() || id.contains(['/', '\\']) || id == ".." {
            return Err(SourceError::NotFound(id.to_string()));
        }

        let path = self.dir.join(format!("{id}.json"));
        if !is_file(&path).await {
            return Err(SourceError::NotFound(id.to_string()));
        }

        let body = Self::read(&path).await?;
        decode(&body, &path.display().to_string())
    }

    async fn health(&self) -> Result<Health, SourceError> {
        if !is_dir(&self.dir).await {
            return Err(SourceError::NotFound(self.dir.display().to_string()));
        }
        Ok(Health {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
        })
    }
}
