//! Where topology and cable documents come from.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug)]
pub enum SourceError {
    Transport {
        location: String,
        source: reqwest::Error,
    },
    Status {
        location: String,
        status: u16,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Transport { location, source } => {
                write!(f, "request to {location} failed: {source}")
            }
            SourceError::Status { location, status } => {
                write!(f, "{location} answered HTTP {status}")
            }
            SourceError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Transport { source, .. } => Some(source),
            SourceError::Status { .. } => None,
            SourceError::Io { source, .. } => Some(source),
        }
    }
}

/// A fetchable document payload.
pub trait TopologySource: Send + Sync {
    /// Human-readable location for logs.
    fn describe(&self) -> String;

    fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>>;
}

/// `GET` over HTTP(S). Any non-2xx status is an error.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

impl TopologySource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| SourceError::Transport {
                    location: self.url.clone(),
                    source: e,
                })?;

            if !resp.status().is_success() {
                return Err(SourceError::Status {
                    location: self.url.clone(),
                    status: resp.status().as_u16(),
                });
            }

            resp.text().await.map_err(|e| SourceError::Transport {
                location: self.url.clone(),
                source: e,
            })
        })
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TopologySource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>> {
        Box::pin(async move {
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| SourceError::Io {
                    path: self.path.clone(),
                    source: e,
                })
        })
    }
}

/// In-memory payload; used for tests and for embedding documents.
pub struct StaticSource {
    name: String,
    payload: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

impl TopologySource for StaticSource {
    fn describe(&self) -> String {
        format!("static:{}", self.name)
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>> {
        Box::pin(async move { Ok(self.payload.clone()) })
    }
}

/// HTTP for `http://` and `https://` locations, a file path otherwise.
pub fn source_for(location: &str) -> Box<dyn TopologySource> {
    let trimmed = location.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Box::new(HttpSource::new(trimmed))
    } else {
        Box::new(FileSource::new(trimmed))
    }
}
