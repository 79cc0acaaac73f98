// ABOUTME: Template engine that loads, caches and renders step templates
// ABOUTME: Also resolves data-component placeholders in full pages

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::context::TemplateContext;
use super::directives;
use super::dom::{self, Document};
use super::error::{Result, TemplateError};
use super::source::TemplateSource;

pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_COMPONENT_DIR: &str = "shared/components";

pub const ATTR_COMPONENT: &str = "data-component";
pub const ATTR_COMPONENT_DIR: &str = "data-component-dir";

pub struct TemplateEngine {
    source: Arc<dyn TemplateSource>,
    base_path: String,
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl TemplateEngine {
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        Self {
            source,
            base_path: String::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.set_base_path(base_path);
        self
    }

    /// Prefix prepended to every template fetch. Already cached templates
    /// are kept.
    pub fn set_base_path(&mut self, base_path: impl Into<String>) {
        self.base_path = base_path.into();
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Fetch `{base}{directory}/{name}.html`, caching the raw markup by
    /// `directory/name` for the engine's lifetime
    pub async fn load_template(&self, name: &str, directory: &str) -> Result<Arc<str>> {
        let key = format!("{}/{}", directory, name);
        let path = format!("{}{}/{}.html", self.base_path, directory, name);
        self.load_cached(key, &path, name, directory).await
    }

    /// Components live in a separate key space since they skip the base path
    async fn load_component(&self, name: &str, directory: &str) -> Result<Arc<str>> {
        let key = format!("component:{}/{}", directory, name);
        let path = format!("{}/{}.html", directory, name);
        self.load_cached(key, &path, name, directory).await
    }

    async fn load_cached(
        &self,
        key: String,
        path: &str,
        name: &str,
        directory: &str,
    ) -> Result<Arc<str>> {
        if let Some(cached) = self.cache.read().await.get(&key) {
            debug!("Template cache hit for {}", key);
            return Ok(Arc::clone(cached));
        }

        let markup: Arc<str> = match self.source.fetch(path).await {
            Ok(markup) => Arc::from(markup),
            Err(e) => {
                error!(
                    "Failed to load template {} from {}: {}",
                    name,
                    self.source.describe(path),
                    e
                );
                return Err(TemplateError::LoadError {
                    name: name.to_string(),
                    directory: directory.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let mut cache = self.cache.write().await;
        let entry = cache.entry(key).or_insert(markup);
        Ok(Arc::clone(entry))
    }

    /// Apply the directive passes to `template` against `data`
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        let document = Document::parse(template);
        directives::apply(document.body(), data);
        document.body_html()
    }

    pub async fn load_and_render(
        &self,
        name: &str,
        directory: &str,
        context: &TemplateContext,
    ) -> Result<String> {
        let data = context.to_json()?;
        let template = self.load_template(name, directory).await?;
        self.render(&template, &data)
    }

    /// Replace the contents of every `data-component` element in `page` with
    /// the raw markup of its component. Components are fetched without the
    /// base path and cached like templates. One that fails to load is left
    /// untouched.
    pub async fn load_components(&self, page: &str) -> Result<String> {
        let requests = component_requests(page);
        if requests.is_empty() {
            return Document::parse(page).to_html();
        }

        let mut loaded: Vec<Option<Arc<str>>> = Vec::with_capacity(requests.len());
        for (name, directory) in &requests {
            match self.load_component(name, directory).await {
                Ok(markup) => {
                    debug!("Loaded component {} from {}", name, directory);
                    loaded.push(Some(markup));
                }
                Err(e) => {
                    warn!("Leaving component {} unresolved: {}", name, e);
                    loaded.push(None);
                }
            }
        }

        let document = Document::parse(page);
        let placeholders = dom::elements_with_attr(document.root(), ATTR_COMPONENT);
        if placeholders.len() != loaded.len() {
            warn!(
                "Component placeholder count changed between passes ({} vs {})",
                loaded.len(),
                placeholders.len()
            );
        }

        for (element, markup) in placeholders.iter().zip(loaded) {
            let Some(markup) = markup else {
                continue;
            };
            let component = Document::parse(&markup);
            dom::clear_children(element);
            dom::move_children(component.body(), element);
            dom::remove_attr(element, ATTR_COMPONENT);
            dom::remove_attr(element, ATTR_COMPONENT_DIR);
        }

        document.to_html()
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}

/// `(name, directory)` for every component placeholder, in document order
fn component_requests(page: &str) -> Vec<(String, String)> {
    let document = Document::parse(page);
    dom::elements_with_attr(document.root(), ATTR_COMPONENT)
        .iter()
        .map(|element| {
            let name = dom::get_attr(element, ATTR_COMPONENT).unwrap_or_default();
            let directory = dom::get_attr(element, ATTR_COMPONENT_DIR)
                .filter(|dir| !dir.is_empty())
                .unwrap_or_else(|| DEFAULT_COMPONENT_DIR.to_string());
            (name, directory)
        })
        .collect()
}
