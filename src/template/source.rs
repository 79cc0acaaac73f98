// ABOUTME: Template sources the engine fetches raw markup from
// ABOUTME: Supports a local directory tree and an HTTP(S) origin

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::error::{Result, TemplateError};

/// Fetches raw template text by a relative `dir/name.html` path.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String>;

    /// Where `path` resolves to, for log messages
    fn describe(&self, path: &str) -> String;
}

/// Reads templates from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(TemplateError::NotFound(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl TemplateSource for FileSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full_path = self.resolve(path)?;
        debug!("Reading template file {}", full_path.display());

        match fs::read_to_string(&full_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound(full_path.display().to_string()))
            }
            Err(e) => Err(TemplateError::IoError(e)),
        }
    }

    fn describe(&self, path: &str) -> String {
        self.root.join(path).display().to_string()
    }
}

/// Fetches templates over HTTP(S) relative to an origin URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    origin: String,
}

impl HttpSource {
    pub fn new(origin: &str) -> Result<Self> {
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(TemplateError::InvalidBase(origin.to_string()));
        }

        let origin = if origin.ends_with('/') {
            origin.to_string()
        } else {
            format!("{}/", origin)
        };

        Ok(Self {
            client: Client::new(),
            origin,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.origin, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl TemplateSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        debug!("Fetching template {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TemplateError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    fn describe(&self, path: &str) -> String {
        self.url_for(path)
    }
}

/// Pick a source from a configured location: URLs fetch over HTTP,
/// anything else is a directory.
pub fn source_for(location: &str) -> Result<Box<dyn TemplateSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location)?))
    } else if location.contains("://") {
        Err(TemplateError::InvalidBase(location.to_string()))
    } else {
        let root = if location.is_empty() { "." } else { location };
        Ok(Box::new(FileSource::new(root)))
    }
}
